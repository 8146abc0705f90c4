//! Integration tests for the battery state machine through its public API.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use battery_panel::SystemState;
use battery_panel::battery::Battery;
use battery_panel::config::BatteryConfig;

use crate::mock_hw::{manual_battery, one_minute, step};

// ── Full drain: Charged → Disconnecting → Draining → Dead ─────

#[test]
fn drains_to_dead_in_one_minute() {
    let (battery, clock) = manual_battery(&one_minute());
    battery.set_is_draining(true);

    step(&battery, &clock, 0.1);
    assert_eq!(battery.info().state, SystemState::Disconnecting);
    // A zero dwell still costs one poll.
    step(&battery, &clock, 0.0);
    assert_eq!(battery.info().state, SystemState::Draining);

    step(&battery, &clock, 30.0);
    let info = battery.info();
    assert!((info.level - 50.0).abs() < 1e-6, "level {}", info.level);

    step(&battery, &clock, 30.0);
    let info = battery.info();
    assert_eq!(info.state, SystemState::Dead);
    assert!(info.level.abs() < f64::EPSILON);
}

// ── Dead → Charging → Charged ────────────────────────────────

#[test]
fn recovers_from_dead_over_one_charge_rate() {
    let (battery, clock) = manual_battery(&one_minute());
    battery.set_is_draining(true);
    step(&battery, &clock, 0.1);
    step(&battery, &clock, 0.1);
    step(&battery, &clock, 61.0);
    assert_eq!(battery.info().state, SystemState::Dead);

    battery.set_is_draining(false);
    step(&battery, &clock, 0.1);
    let info = battery.info();
    assert_eq!(info.state, SystemState::Charging);
    assert!(info.level.abs() < f64::EPSILON);

    let mut last = 0.0;
    // One extra second absorbs floating-point shortfall at the top.
    for _ in 0..61 {
        step(&battery, &clock, 1.0);
        let level = battery.info().level;
        assert!(level >= last);
        last = level;
    }
    let info = battery.info();
    assert_eq!(info.state, SystemState::Charged);
    assert!((info.level - 100.0).abs() < f64::EPSILON);
}

// ── Charging interrupted mid-cycle ────────────────────────────

#[test]
fn reconnect_mid_charge_goes_through_disconnecting() {
    let (battery, clock) = manual_battery(&one_minute());
    battery.set_is_draining(true);
    step(&battery, &clock, 0.1);
    step(&battery, &clock, 0.1);
    step(&battery, &clock, 36.0); // 100 → 40
    battery.set_is_draining(false);
    step(&battery, &clock, 0.0);
    let info = battery.info();
    assert_eq!(info.state, SystemState::Charging);
    assert!((info.level - 40.0).abs() < 1e-6);

    step(&battery, &clock, 3.0); // 40 → 45, still charging
    battery.set_is_draining(true);
    step(&battery, &clock, 1.2); // 45 → 47, then reconnect
    let info = battery.info();
    assert_eq!(info.state, SystemState::Disconnecting);
    assert!((info.level - 47.0).abs() < 1e-6, "level {}", info.level);
}

// ── Override while draining ───────────────────────────────────

#[test]
fn override_is_immediate_and_sticky() {
    let (battery, clock) = manual_battery(&one_minute());
    battery.set_is_draining(true);
    step(&battery, &clock, 0.1);
    step(&battery, &clock, 0.1);
    step(&battery, &clock, 54.0);
    let info = battery.info();
    assert_eq!(info.state, SystemState::Draining);
    assert!((info.level - 10.0).abs() < 1e-6);

    battery.set_charged_override(true);
    let info = battery.info();
    assert_eq!(info.state, SystemState::Charged);
    assert!((info.level - 100.0).abs() < f64::EPSILON);
    assert!(info.charged_override);

    for _ in 0..10 {
        step(&battery, &clock, 30.0);
        assert_eq!(battery.info().state, SystemState::Charged);
    }

    battery.set_charged_override(false);
    step(&battery, &clock, 0.1);
    assert_eq!(battery.info().state, SystemState::Disconnecting);
}

// ── Snapshot during the dwell ─────────────────────────────────

#[test]
fn remaining_dwell_counts_down_and_clamps() {
    let (battery, clock) = manual_battery(&BatteryConfig {
        disconnecting_secs: 30.0,
        ..one_minute()
    });
    battery.set_is_draining(true);
    step(&battery, &clock, 0.1);

    clock.advance_secs(12.0);
    let remaining = battery.info().disconnecting_remaining.expect("in Disconnecting");
    assert!((remaining.as_secs_f64() - 18.0).abs() < 1e-6);

    clock.advance_secs(60.0);
    assert_eq!(battery.info().disconnecting_remaining, Some(Duration::ZERO));

    battery.poll();
    let info = battery.info();
    assert_eq!(info.state, SystemState::Draining);
    assert_eq!(info.disconnecting_remaining, None);
}

// ── Lifecycle and concurrency ────────────────────────────────

#[test]
fn instances_are_independent() {
    let (a, clock_a) = manual_battery(&one_minute());
    let (b, clock_b) = manual_battery(&one_minute());
    a.set_is_draining(true);
    step(&a, &clock_a, 0.1);
    step(&b, &clock_b, 0.1);
    assert_eq!(a.info().state, SystemState::Disconnecting);
    assert_eq!(b.info().state, SystemState::Charged);

    a.stop();
    assert!(!a.is_running());
    assert!(b.is_running());
}

#[test]
fn stop_twice_is_same_as_once() {
    let battery = Battery::new("real-clock", &BatteryConfig::fast());
    battery.stop();
    let frozen = battery.info();
    battery.stop();
    thread::sleep(Duration::from_millis(250));
    assert_eq!(battery.info().last_update_at, frozen.last_update_at);
}

#[test]
fn dropping_a_battery_stops_its_thread() {
    let battery = Battery::new("dropped", &BatteryConfig::fast());
    assert!(battery.is_running());
    drop(battery);
}

#[test]
fn concurrent_setters_and_readers_keep_level_in_range() {
    let battery = Arc::new(Battery::with_clock(
        "busy",
        &BatteryConfig {
            drain_rate_secs: 0.5,
            charge_rate_secs: 0.5,
            disconnecting_secs: 0.0,
        },
        Arc::new(battery_panel::adapters::time::MonotonicClock::new()),
        Duration::from_millis(1),
    ));

    let writers: Vec<_> = (0..2)
        .map(|w| {
            let battery = Arc::clone(&battery);
            thread::spawn(move || {
                for i in 0..500 {
                    battery.set_is_draining((i + w) % 3 != 0);
                    if i % 97 == 0 {
                        battery.set_charged_override(i % 2 == 0);
                    }
                }
            })
        })
        .collect();

    let reader = {
        let battery = Arc::clone(&battery);
        thread::spawn(move || {
            for _ in 0..2000 {
                let info = battery.info();
                assert!((0.0..=100.0).contains(&info.level));
                if info.state != SystemState::Disconnecting {
                    assert_eq!(info.disconnecting_remaining, None);
                }
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();
    battery.stop();
}
