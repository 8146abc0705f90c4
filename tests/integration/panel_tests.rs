//! Integration tests for the inputs → batteries → strip pipeline.

use std::time::Duration;

use battery_panel::SystemState;
use battery_panel::adapters::led_strip::MemoryLedStrip;
use battery_panel::adapters::log_sink::RecordingSink;
use battery_panel::app::events::AppEvent;
use battery_panel::app::ports::Rgb;
use battery_panel::app::service::PanelRunner;

use crate::mock_hw::{Rig, one_minute};

// ── Default layout renders every battery ─────────────────────

#[test]
fn idle_panel_shows_every_section_charged() {
    let mut rig = Rig::new(5, 144, 4, &one_minute());
    rig.tick(0.0);

    let layout = rig.panel.layout();
    assert_eq!(layout.section_len, 25);
    let frame = rig.panel.strip().frame();
    for i in 0..5 {
        let s = layout.section(i);
        assert!(
            frame[s.start..s.start + s.len].iter().all(|c| c.g > 0 && c.r == 0),
            "section {} should be green",
            i
        );
    }
    // Gaps between sections stay dark.
    assert!(frame[25..29].iter().all(|c| c.is_off()));
    assert_eq!(rig.panel.strip().lit_count(), 125);
}

// ── Connect input drives one battery only ────────────────────

#[test]
fn connect_input_drains_only_its_battery() {
    let mut rig = Rig::new(3, 40, 2, &one_minute());
    rig.connects[1].set_pressed(true);

    rig.sample_inputs();
    rig.tick(0.1); // → Disconnecting
    rig.tick(0.1); // → Draining
    rig.tick(30.0);

    let infos = rig.panel.infos();
    assert_eq!(infos[0].state, SystemState::Charged);
    assert_eq!(infos[1].state, SystemState::Draining);
    assert!((infos[1].level - 50.0).abs() < 1e-6);
    assert_eq!(infos[2].state, SystemState::Charged);

    // Draining bar is yellow and about half the section.
    let s = rig.panel.layout().section(1);
    let frame = &rig.panel.strip().frame()[s.start..s.start + s.len];
    let yellow = frame.iter().filter(|c| **c == Rgb::YELLOW).count();
    assert!((6..=8).contains(&yellow), "yellow pixels {}", yellow);

    let changes = rig.state_changes();
    assert_eq!(
        changes,
        vec![
            &AppEvent::StateChanged {
                battery: 1,
                from: SystemState::Charged,
                to: SystemState::Disconnecting
            },
            &AppEvent::StateChanged {
                battery: 1,
                from: SystemState::Disconnecting,
                to: SystemState::Draining
            },
        ]
    );
}

// ── Reset input overrides every battery ──────────────────────

#[test]
fn reset_forces_all_charged_until_released() {
    let mut rig = Rig::new(2, 20, 0, &one_minute());
    for c in &rig.connects {
        c.set_pressed(true);
    }
    rig.sample_inputs();
    rig.tick(0.1);
    rig.tick(0.1);
    rig.tick(45.0);
    assert!(rig.panel.infos().iter().all(|i| i.state == SystemState::Draining));

    rig.reset.set_pressed(true);
    rig.sample_inputs();
    for info in rig.panel.infos() {
        assert_eq!(info.state, SystemState::Charged);
        assert!((info.level - 100.0).abs() < f64::EPSILON);
        assert!(info.charged_override);
    }
    rig.tick(10.0);
    assert!(rig.panel.infos().iter().all(|i| i.state == SystemState::Charged));

    rig.reset.set_pressed(false);
    rig.sample_inputs();
    assert!(rig.panel.infos().iter().all(|i| !i.charged_override));
    rig.tick(0.1);
    assert!(
        rig.panel
            .infos()
            .iter()
            .all(|i| i.state == SystemState::Disconnecting)
    );

    let overrides: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::OverrideChanged { active } => Some(*active),
            _ => None,
        })
        .collect();
    assert_eq!(overrides, [true, false]);
}

// ── Queries ──────────────────────────────────────────────────

#[test]
fn invalid_battery_index_is_none() {
    let rig = Rig::new(2, 20, 0, &one_minute());
    assert!(rig.panel.battery_info(1).is_some());
    assert!(rig.panel.battery_info(2).is_none());
}

#[test]
fn dead_battery_pulses_red() {
    let mut rig = Rig::new(1, 10, 0, &one_minute());
    rig.connects[0].set_pressed(true);
    rig.sample_inputs();
    rig.tick(0.1);
    rig.tick(0.1);
    rig.tick(70.0);
    assert_eq!(rig.panel.infos()[0].state, SystemState::Dead);

    // Red only; the pulse may sit at zero brightness.
    let frame = rig.panel.strip().frame();
    assert!(frame.iter().all(|c| c.g == 0 && c.b == 0));
}

// ── Runner lifecycle ─────────────────────────────────────────

#[test]
fn runner_updates_in_background_and_stops_cleanly() {
    let rig = Rig::new(2, 20, 0, &one_minute());
    let mut runner = PanelRunner::start(rig.panel, RecordingSink::default(), Duration::from_millis(5));

    std::thread::sleep(Duration::from_millis(100));
    assert!(runner.with_panel(|p| p.update_count()) > 0);
    assert!(runner.with_panel(|p| frame_lit(p.strip())) > 0);

    runner.stop();
    runner.stop();
    assert!(!runner.is_running());
    assert!(runner.with_panel(|p| p.is_stopped()));
    assert_eq!(runner.with_panel(|p| frame_lit(p.strip())), 0);
    assert!(
        runner
            .with_panel(|p| p.batteries().iter().all(|b| !b.is_running()))
    );
}

fn frame_lit(strip: &MemoryLedStrip) -> usize {
    strip.lit_count()
}
