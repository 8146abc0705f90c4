//! Mock hardware rig for integration tests.
//!
//! Builds batteries and panels on a [`ManualClock`] with poll threads that
//! never fire during a test, so every poll is driven explicitly.

use std::sync::Arc;
use std::time::Duration;

use battery_panel::adapters::led_strip::MemoryLedStrip;
use battery_panel::adapters::log_sink::RecordingSink;
use battery_panel::adapters::time::ManualClock;
use battery_panel::app::events::AppEvent;
use battery_panel::app::service::{Panel, PanelParts};
use battery_panel::battery::Battery;
use battery_panel::config::BatteryConfig;
use battery_panel::drivers::button::MockButton;

/// Background polls are pushed this far out.
pub const IDLE_POLL: Duration = Duration::from_secs(3600);

/// 1 minute to drain, 1 minute to charge, no dwell.
pub fn one_minute() -> BatteryConfig {
    BatteryConfig {
        drain_rate_secs: 60.0,
        charge_rate_secs: 60.0,
        disconnecting_secs: 0.0,
    }
}

pub fn manual_battery(config: &BatteryConfig) -> (Battery, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let battery = Battery::with_clock("test", config, clock.clone(), IDLE_POLL);
    (battery, clock)
}

/// Advance `clock` by `secs`, then poll.
pub fn step(battery: &Battery, clock: &ManualClock, secs: f64) {
    clock.advance_secs(secs);
    battery.poll();
}

// ── Panel rig ─────────────────────────────────────────────────

pub struct Rig {
    pub panel: Panel<MemoryLedStrip, MockButton>,
    pub clock: Arc<ManualClock>,
    pub reset: MockButton,
    pub connects: Vec<MockButton>,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(count: usize, leds: usize, spacing: usize, config: &BatteryConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let reset = MockButton::new();
        let connects: Vec<MockButton> = (0..count).map(|_| MockButton::new()).collect();
        let batteries = (0..count)
            .map(|i| Battery::with_clock(format!("battery-{}", i), config, clock.clone(), IDLE_POLL))
            .collect();

        let panel = Panel::new(
            PanelParts {
                batteries,
                reset: reset.clone(),
                connects: connects.clone(),
                strip: MemoryLedStrip::new(leds).expect("strip fits"),
            },
            spacing,
            clock.clone(),
            99,
        )
        .expect("valid panel");

        Self {
            panel,
            clock,
            reset,
            connects,
            sink: RecordingSink::default(),
        }
    }

    /// Advance time, poll every battery, then run one panel update.
    pub fn tick(&mut self, secs: f64) {
        self.clock.advance_secs(secs);
        for battery in self.panel.batteries() {
            battery.poll();
        }
        self.panel.update(&mut self.sink);
    }

    /// Push inputs into the batteries without advancing time.
    pub fn sample_inputs(&mut self) {
        self.panel.update(&mut self.sink);
    }

    pub fn state_changes(&self) -> Vec<&AppEvent> {
        self.sink
            .events
            .iter()
            .filter(|e| matches!(e, AppEvent::StateChanged { .. }))
            .collect()
    }
}
