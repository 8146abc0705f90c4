//! Mutable record threaded through every FSM handler.
//!
//! `BatteryContext` is the single struct that state handlers read from and
//! write to: the charge level, the latest input samples, the validated
//! timing, and the clock readings for the current poll.

use core::time::Duration;
use std::time::Instant;

use crate::config::Rates;

/// Charge level of a full battery, in percent.
pub const FULL_CHARGE: f64 = 100.0;
/// Charge level of an empty battery, in percent.
pub const EMPTY: f64 = 0.0;

// ---------------------------------------------------------------------------
// Inputs (written by the setters, sampled by handlers)
// ---------------------------------------------------------------------------

/// The two boolean input signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    /// Sticky override: forces `Charged` at 100% while set.
    pub charged_override: bool,
    /// Load connected; the battery should disconnect and drain.
    pub is_draining: bool,
}

// ---------------------------------------------------------------------------
// BatteryContext
// ---------------------------------------------------------------------------

/// The shared record passed to every state handler function.
#[derive(Debug, Clone)]
pub struct BatteryContext {
    /// Charge level in percent.  Always within `[EMPTY, FULL_CHARGE]`.
    pub level: f64,
    pub inputs: Inputs,
    pub rates: Rates,

    // -- Timing --
    /// Clock reading for the operation in progress.
    pub now: Instant,
    /// Minutes between the previous poll and `now`.
    pub elapsed_minutes: f64,
    /// When the previous poll ran.
    pub last_update_at: Instant,
    /// Set on entering `Disconnecting`, cleared on leaving it.
    pub disconnecting_started_at: Option<Instant>,
}

impl BatteryContext {
    /// A full battery created at `now`.
    pub fn new(rates: Rates, now: Instant) -> Self {
        Self {
            level: FULL_CHARGE,
            inputs: Inputs::default(),
            rates,
            now,
            elapsed_minutes: 0.0,
            last_update_at: now,
            disconnecting_started_at: None,
        }
    }

    /// Time spent in `Disconnecting` as of `now`.
    pub fn disconnecting_elapsed(&self) -> Duration {
        self.disconnecting_started_at
            .map_or(Duration::ZERO, |t| self.now.saturating_duration_since(t))
    }

    /// Dwell still to go as of `at`, never negative.
    pub fn disconnecting_remaining(&self, at: Instant) -> Duration {
        let elapsed = self
            .disconnecting_started_at
            .map_or(Duration::ZERO, |t| at.saturating_duration_since(t));
        self.rates.disconnecting_duration.saturating_sub(elapsed)
    }
}
