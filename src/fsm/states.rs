//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  CHARGED ──[draining]──▶ DISCONNECTING ──[dwell elapsed]──▶ DRAINING
//!     ▲                         ▲                             │     │
//!     │                         │                      [released] [level 0]
//!     │                     [draining]                        │     ▼
//!     │                         │                             │    DEAD
//!     └──────[level 100]───── CHARGING ◀──────────────────────┘     │
//!                               ▲                                   │
//!                               └──────────[released]───────────────┘
//!
//!  Any state ──[charged override]──▶ CHARGED (level forced to 100)
//! ```
//!
//! The override is applied by the engine before dispatch, so the handlers
//! below never see it.

use super::context::{BatteryContext, EMPTY, FULL_CHARGE};
use super::{StateDescriptor, SystemState};
use log::debug;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per battery.
pub fn build_state_table() -> [StateDescriptor; SystemState::COUNT] {
    [
        // Index 0: Charged
        StateDescriptor {
            id: SystemState::Charged,
            on_enter: Some(charged_enter),
            on_exit: None,
            on_update: charged_update,
        },
        // Index 1: Disconnecting
        StateDescriptor {
            id: SystemState::Disconnecting,
            on_enter: Some(disconnecting_enter),
            on_exit: Some(disconnecting_exit),
            on_update: disconnecting_update,
        },
        // Index 2: Draining
        StateDescriptor {
            id: SystemState::Draining,
            on_enter: None,
            on_exit: None,
            on_update: draining_update,
        },
        // Index 3: Dead
        StateDescriptor {
            id: SystemState::Dead,
            on_enter: Some(dead_enter),
            on_exit: None,
            on_update: dead_update,
        },
        // Index 4: Charging
        StateDescriptor {
            id: SystemState::Charging,
            on_enter: None,
            on_exit: None,
            on_update: charging_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  CHARGED state: full, waiting for a load
// ═══════════════════════════════════════════════════════════════════════════

fn charged_enter(ctx: &mut BatteryContext) {
    ctx.level = FULL_CHARGE;
}

fn charged_update(ctx: &mut BatteryContext) -> Option<SystemState> {
    ctx.level = FULL_CHARGE;
    ctx.inputs.is_draining.then_some(SystemState::Disconnecting)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISCONNECTING state: fixed dwell before the drain starts
// ═══════════════════════════════════════════════════════════════════════════

fn disconnecting_enter(ctx: &mut BatteryContext) {
    ctx.disconnecting_started_at = Some(ctx.now);
    debug!(
        "DISCONNECTING: holding {:?} before drain",
        ctx.rates.disconnecting_duration
    );
}

fn disconnecting_exit(ctx: &mut BatteryContext) {
    ctx.disconnecting_started_at = None;
}

fn disconnecting_update(ctx: &mut BatteryContext) -> Option<SystemState> {
    // The dwell runs to completion even if the load is released meanwhile.
    (ctx.disconnecting_elapsed() >= ctx.rates.disconnecting_duration)
        .then_some(SystemState::Draining)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DRAINING state: level falls linearly with elapsed time
// ═══════════════════════════════════════════════════════════════════════════

fn draining_update(ctx: &mut BatteryContext) -> Option<SystemState> {
    let level = ctx.level - ctx.rates.drain_percent_per_minute() * ctx.elapsed_minutes;

    if level <= EMPTY {
        ctx.level = EMPTY;
        return Some(SystemState::Dead);
    }

    ctx.level = level;
    (!ctx.inputs.is_draining).then_some(SystemState::Charging)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DEAD state: empty until the load goes away
// ═══════════════════════════════════════════════════════════════════════════

fn dead_enter(ctx: &mut BatteryContext) {
    ctx.level = EMPTY;
    debug!("DEAD: battery exhausted");
}

fn dead_update(ctx: &mut BatteryContext) -> Option<SystemState> {
    ctx.level = EMPTY;
    (!ctx.inputs.is_draining).then_some(SystemState::Charging)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CHARGING state: level rises linearly with elapsed time
// ═══════════════════════════════════════════════════════════════════════════

fn charging_update(ctx: &mut BatteryContext) -> Option<SystemState> {
    let level = ctx.level + ctx.rates.charge_percent_per_minute() * ctx.elapsed_minutes;

    if level >= FULL_CHARGE {
        ctx.level = FULL_CHARGE;
        return Some(SystemState::Charged);
    }

    ctx.level = level;
    ctx.inputs.is_draining.then_some(SystemState::Disconnecting)
}
