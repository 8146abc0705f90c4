//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────────┬───────────┬──────────┬───────────────────┐│
//! │  │ SystemState   │ on_enter  │ on_exit  │ on_update         ││
//! │  ├───────────────┼───────────┼──────────┼───────────────────┤│
//! │  │ Charged       │ fn(ctx)   │ -        │ fn(ctx)->Option<> ││
//! │  │ Disconnecting │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  │ Draining      │ -         │ -        │ fn(ctx)->Option<> ││
//! │  │ Dead          │ fn(ctx)   │ -        │ fn(ctx)->Option<> ││
//! │  │ Charging      │ -         │ -        │ fn(ctx)->Option<> ││
//! │  └───────────────┴───────────┴──────────┴───────────────────┘│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each poll the engine first applies the charged override, which wins in
//! every state.  Otherwise it calls `on_update` for the **current** state
//! exactly once.  If that returns `Some(next)`, the engine runs `on_exit`
//! for the current state, then `on_enter` for the next.  All functions
//! receive `&mut BatteryContext`.

pub mod context;
pub mod states;

use core::fmt;

use context::{BatteryContext, FULL_CHARGE};
use log::debug;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The five battery states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SystemState {
    Charged = 0,
    Disconnecting = 1,
    Draining = 2,
    Dead = 3,
    Charging = 4,
}

impl SystemState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Charged,
        Self::Disconnecting,
        Self::Draining,
        Self::Dead,
        Self::Charging,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Charged => "Charged",
            Self::Disconnecting => "Disconnecting",
            Self::Draining => "Draining",
            Self::Dead => "Dead",
            Self::Charging => "Charging",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A state change performed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SystemState,
    pub to: SystemState,
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut BatteryContext);

/// Signature for the per-poll update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut BatteryContext) -> Option<SystemState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: SystemState,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and the current state.  The caller owns the
/// [`BatteryContext`] and threads it through every call.
pub struct Fsm {
    /// Fixed-size table indexed by `SystemState as usize`.
    table: [StateDescriptor; SystemState::COUNT],
    current: SystemState,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; SystemState::COUNT], initial: SystemState) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id.index() == i),
            "state table out of order"
        );
        Self {
            table,
            current: initial,
        }
    }

    /// Run one poll against `ctx`.
    ///
    /// The caller sets `ctx.now` and `ctx.elapsed_minutes` beforehand and
    /// records `ctx.last_update_at` afterwards.
    pub fn tick(&mut self, ctx: &mut BatteryContext) -> Option<Transition> {
        if ctx.inputs.charged_override {
            ctx.level = FULL_CHARGE;
            return self.force_transition(SystemState::Charged, ctx);
        }

        let next = (self.table[self.current.index()].on_update)(ctx);
        next.and_then(|next| self.force_transition(next, ctx))
    }

    /// Transition immediately, skipping `on_update`.  No-op when already
    /// in `next`.
    pub fn force_transition(
        &mut self,
        next: SystemState,
        ctx: &mut BatteryContext,
    ) -> Option<Transition> {
        if next == self.current {
            return None;
        }
        Some(self.transition(next, ctx))
    }

    /// The current state's identity.
    pub fn current_state(&self) -> SystemState {
        self.current
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: SystemState, ctx: &mut BatteryContext) -> Transition {
        let from = self.current;
        debug!("FSM transition: {} -> {}", from, next);

        if let Some(exit) = self.table[from.index()].on_exit {
            exit(ctx);
        }

        self.current = next;

        if let Some(enter) = self.table[next.index()].on_enter {
            enter(ctx);
        }

        Transition { from, to: next }
    }
}


#[cfg(test)]
mod proptests {
    use std::time::{Duration, Instant};

    use super::context::{BatteryContext, EMPTY, FULL_CHARGE};
    use super::*;
    use crate::config::BatteryConfig;
    use proptest::prelude::*;

    fn arb_step() -> impl Strategy<Value = (u64, bool, bool)> {
        (
            0u64..90_000, // ms since previous poll
            any::<bool>(), // charged_override
            any::<bool>(), // is_draining
        )
    }

    proptest! {
        #[test]
        fn level_stays_in_bounds(
            steps in proptest::collection::vec(arb_step(), 1..200),
            dwell in 0.0f64..5.0,
        ) {
            let config = BatteryConfig {
                drain_rate_secs: 60.0,
                charge_rate_secs: 45.0,
                disconnecting_secs: dwell,
            };
            let mut ctx = BatteryContext::new(config.rates(), Instant::now());
            let mut fsm = Fsm::new(states::build_state_table(), SystemState::Charged);

            for (ms, over, drain) in steps {
                ctx.inputs.charged_override = over;
                ctx.inputs.is_draining = drain;
                let now = ctx.now + Duration::from_millis(ms);
                ctx.elapsed_minutes = now.saturating_duration_since(ctx.last_update_at).as_secs_f64() / 60.0;
                ctx.now = now;
                fsm.tick(&mut ctx);
                ctx.last_update_at = now;

                prop_assert!((EMPTY..=FULL_CHARGE).contains(&ctx.level),
                    "level escaped bounds: {}", ctx.level);
                if over {
                    prop_assert_eq!(fsm.current_state(), SystemState::Charged);
                    prop_assert!((ctx.level - FULL_CHARGE).abs() < f64::EPSILON);
                }
                if fsm.current_state() == SystemState::Dead {
                    prop_assert!(ctx.level.abs() < f64::EPSILON);
                }
            }
        }
    }
}
