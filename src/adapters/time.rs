//! Time adapters.
//!
//! Provides monotonic time for the batteries and the panel.
//!
//! - [`MonotonicClock`] wraps `std::time::Instant` for real runs.
//! - [`ManualClock`] only moves when told to, for simulations and tests
//!   that need exact elapsed times.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::app::ports::Clock;

/// Wall-clock time source.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since this clock was created.
    pub fn uptime(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock advanced explicitly by the caller.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Move time forward by fractional seconds.  Negative or NaN values are
    /// ignored; time never goes backwards.
    pub fn advance_secs(&self, secs: f64) {
        if let Ok(by) = Duration::try_from_secs_f64(secs) {
            self.advance(by);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.advance(Duration::from_secs(12));
        assert_eq!(clock.now() - t0, Duration::from_secs(12));
        clock.advance_secs(-3.0);
        assert_eq!(clock.now() - t0, Duration::from_secs(12));
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
