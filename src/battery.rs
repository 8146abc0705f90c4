//! The battery: state machine, shared record and its poll thread.
//!
//! ```text
//!   set_charged_override ─┐
//!   set_is_draining ──────┤ write lock
//!   poll (thread) ────────┤──────────▶ RwLock<Machine { Fsm, BatteryContext }>
//!   info ─────────────────┘ read lock
//! ```
//!
//! Every battery owns one [`PeriodicTask`] that calls [`Battery::poll`] at a
//! fixed interval.  The level is integrated from real elapsed time, so the
//! poll rate does not change how fast the battery drains or charges.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::adapters::time::MonotonicClock;
use crate::app::ports::Clock;
use crate::config::BatteryConfig;
use crate::fsm::context::{BatteryContext, FULL_CHARGE};
use crate::fsm::{Fsm, SystemState, Transition, states};
use crate::scheduler::PeriodicTask;

/// How often the background thread polls when not told otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable copy of a battery's state, taken under the read lock.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryInfo {
    pub state: SystemState,
    /// Charge level in percent, within `[0, 100]`.
    pub level: f64,
    pub charged_override: bool,
    pub is_draining: bool,
    pub drain_rate: Duration,
    pub charge_rate: Duration,
    pub disconnecting_duration: Duration,
    pub last_update_at: Instant,
    /// Dwell left before draining starts.  `Some` only in `Disconnecting`.
    pub disconnecting_remaining: Option<Duration>,
}

// ---------------------------------------------------------------------------
// Shared record
// ---------------------------------------------------------------------------

struct Machine {
    fsm: Fsm,
    ctx: BatteryContext,
}

/// Everything the poll thread and the public handle have in common.
struct Shared {
    name: String,
    clock: Arc<dyn Clock>,
    machine: RwLock<Machine>,
}

impl Shared {
    fn poll(&self) -> Option<Transition> {
        let now = self.clock.now();
        let mut guard = self.machine.write();
        let Machine { fsm, ctx } = &mut *guard;

        ctx.elapsed_minutes = now.saturating_duration_since(ctx.last_update_at).as_secs_f64() / 60.0;
        ctx.now = now;
        let transition = fsm.tick(ctx);
        ctx.last_update_at = now;

        let level = ctx.level;
        drop(guard);

        if let Some(t) = transition {
            info!("{}: {} -> {} at {:.1}%", self.name, t.from, t.to, level);
        }
        transition
    }
}

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------

/// A simulated battery.  Starts `Charged` at 100% and begins polling itself
/// as soon as it is created.
pub struct Battery {
    shared: Arc<Shared>,
    task: Mutex<PeriodicTask>,
}

impl Battery {
    /// Create a battery on the system clock, polled every
    /// [`DEFAULT_POLL_INTERVAL`].
    pub fn new(name: impl Into<String>, config: &BatteryConfig) -> Self {
        Self::with_clock(
            name,
            config,
            Arc::new(MonotonicClock::new()),
            DEFAULT_POLL_INTERVAL,
        )
    }

    /// Create a battery on the given clock and poll interval.
    ///
    /// Invalid timing in `config` is clamped (see [`BatteryConfig::rates`]).
    /// A zero `poll_interval` falls back to [`DEFAULT_POLL_INTERVAL`].
    pub fn with_clock(
        name: impl Into<String>,
        config: &BatteryConfig,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        let name = name.into();
        let rates = config.rates();
        let poll_interval = if poll_interval.is_zero() {
            warn!("{}: zero poll interval, using {:?}", name, DEFAULT_POLL_INTERVAL);
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };

        let ctx = BatteryContext::new(rates, clock.now());
        let fsm = Fsm::new(states::build_state_table(), SystemState::Charged);

        let shared = Arc::new(Shared {
            name,
            clock,
            machine: RwLock::new(Machine { fsm, ctx }),
        });

        let poller = Arc::clone(&shared);
        let task = PeriodicTask::spawn(
            format!("{}-poll", shared.name),
            poll_interval,
            move || {
                poller.poll();
            },
        );

        info!(
            "{}: created (drain {:?}, charge {:?}, dwell {:?}, poll {:?})",
            shared.name,
            rates.drain_rate,
            rates.charge_rate,
            rates.disconnecting_duration,
            poll_interval
        );

        Self {
            shared,
            task: Mutex::new(task),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Set the sticky charged override.
    ///
    /// Setting it forces `Charged` at 100% immediately, without waiting for
    /// the next poll.  Clearing it leaves the state as is; the machine takes
    /// over again on the next poll.
    pub fn set_charged_override(&self, active: bool) {
        let now = self.shared.clock.now();
        let mut guard = self.shared.machine.write();
        let Machine { fsm, ctx } = &mut *guard;

        ctx.inputs.charged_override = active;
        if !active {
            return;
        }

        ctx.now = now;
        ctx.level = FULL_CHARGE;
        let transition = fsm.force_transition(SystemState::Charged, ctx);
        drop(guard);

        if let Some(t) = transition {
            info!("{}: override {} -> {}", self.shared.name, t.from, t.to);
        }
    }

    /// Record the drain input.  Takes effect on the next poll.
    pub fn set_is_draining(&self, draining: bool) {
        let mut guard = self.shared.machine.write();
        if guard.ctx.inputs.is_draining != draining {
            debug!("{}: is_draining = {}", self.shared.name, draining);
        }
        guard.ctx.inputs.is_draining = draining;
    }

    /// Take a consistent snapshot.  Only ever takes the read lock.
    pub fn info(&self) -> BatteryInfo {
        let now = self.shared.clock.now();
        let guard = self.shared.machine.read();
        let state = guard.fsm.current_state();
        let ctx = &guard.ctx;

        BatteryInfo {
            state,
            level: ctx.level,
            charged_override: ctx.inputs.charged_override,
            is_draining: ctx.inputs.is_draining,
            drain_rate: ctx.rates.drain_rate,
            charge_rate: ctx.rates.charge_rate,
            disconnecting_duration: ctx.rates.disconnecting_duration,
            last_update_at: ctx.last_update_at,
            disconnecting_remaining: (state == SystemState::Disconnecting)
                .then(|| ctx.disconnecting_remaining(now)),
        }
    }

    /// Run one poll now, on the caller's thread.
    ///
    /// This is what the background thread does on every tick.
    pub fn poll(&self) -> Option<Transition> {
        self.shared.poll()
    }

    /// Stop the background poll thread and wait for it to exit.
    ///
    /// No poll runs after this returns.  Calling it again does nothing.
    /// Setters and [`info`](Self::info) keep working on the frozen record.
    pub fn stop(&self) {
        let mut task = self.task.lock();
        if task.is_running() {
            task.stop();
            info!("{}: stopped", self.shared.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_running()
    }
}

impl core::fmt::Debug for Battery {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Battery")
            .field("name", &self.shared.name)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
