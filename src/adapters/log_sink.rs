//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  The host binary routes that to stderr through
//! `env_logger`.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                for (i, b) in t.batteries.iter().enumerate() {
                    let dwell = b
                        .disconnecting_remaining
                        .map(|d| format!(" | dwell={:.1}s", d.as_secs_f64()))
                        .unwrap_or_default();
                    info!(
                        "TELEM | battery-{} | state={} | level={:5.1}% | draining={} override={}{}",
                        i, b.state, b.level, b.is_draining, b.charged_override, dwell,
                    );
                }
            }
            AppEvent::StateChanged { battery, from, to } => {
                info!("STATE | battery-{} | {} -> {}", battery, from, to);
            }
            AppEvent::OverrideChanged { active } => {
                info!("RESET | override {}", if *active { "held" } else { "released" });
            }
            AppEvent::Started { batteries } => {
                info!("START | batteries={}", batteries);
            }
            AppEvent::Stopped => {
                info!("STOP  | panel blanked");
            }
        }
    }
}

/// Sink that keeps every event, for tests and headless callers.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
