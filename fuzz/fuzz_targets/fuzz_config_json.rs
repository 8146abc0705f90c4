//! Fuzz target: `SystemConfig::from_json`
//!
//! Feeds arbitrary bytes to the configuration parser and checks that any
//! document it accepts also yields a usable panel layout and strip.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - An accepted config always produces a `PanelLayout` with non-empty sections
//! - Battery rates derived from it are never zero
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use battery_panel::app::service::PanelLayout;
use battery_panel::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = SystemConfig::from_json(text) else {
        return;
    };

    let layout = PanelLayout::new(config.led_count, config.battery_count, config.spacing_leds)
        .expect("validated config must lay out");
    assert!(layout.section_len > 0);

    // Rates are clamped, never rejected.
    let rates = config.battery_config().rates();
    assert!(!rates.drain_rate.is_zero());
    assert!(!rates.charge_rate.is_zero());
});
