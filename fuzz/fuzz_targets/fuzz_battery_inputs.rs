//! Fuzz target: battery setters and polls
//!
//! Each input byte is one operation against a battery on a manual clock:
//! toggle the override, toggle the load, advance time, or poll.
//!
//! Invariants checked:
//! - No panics under any operation sequence
//! - Level stays within [0, 100]
//! - A poll with the override set always lands in `Charged` at 100
//!
//! cargo fuzz run fuzz_battery_inputs

#![no_main]

use std::sync::Arc;
use std::time::Duration;

use battery_panel::SystemState;
use battery_panel::adapters::time::ManualClock;
use battery_panel::battery::Battery;
use battery_panel::config::BatteryConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&seed, ops)) = data.split_first() else {
        return;
    };

    let config = BatteryConfig {
        drain_rate_secs: f64::from(seed % 16) - 2.0,
        charge_rate_secs: f64::from(seed / 16) - 2.0,
        disconnecting_secs: f64::from(seed % 5),
    };
    let clock = Arc::new(ManualClock::new());
    let battery = Battery::with_clock("fuzz", &config, clock.clone(), Duration::from_secs(3600));

    for &op in ops {
        match op & 0b11 {
            0 => battery.set_charged_override(op & 0b100 != 0),
            1 => battery.set_is_draining(op & 0b100 != 0),
            2 => clock.advance(Duration::from_millis(u64::from(op >> 2) * 250)),
            _ => {
                battery.poll();
                let info = battery.info();
                if info.charged_override {
                    assert_eq!(info.state, SystemState::Charged);
                }
            }
        }
        let level = battery.info().level;
        assert!((0.0..=100.0).contains(&level), "level {level}");
    }
    battery.stop();
});
