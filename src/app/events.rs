//! Outbound application events.
//!
//! The [`Panel`](super::service::Panel) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::battery::BatteryInfo;
use crate::fsm::SystemState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The panel has started (carries the battery count).
    Started { batteries: usize },

    /// A battery changed state between two panel updates.
    StateChanged {
        battery: usize,
        from: SystemState,
        to: SystemState,
    },

    /// The reset input was pressed or released.
    OverrideChanged { active: bool },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The panel stopped and blanked the strip.
    Stopped,
}

/// A point-in-time view of every battery, suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub batteries: Vec<BatteryInfo>,
}
