//! System configuration parameters
//!
//! All tunable parameters for the battery panel.  Values come from a JSON
//! document (every field optional) or from the named battery presets.

use core::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Floor substituted for a non-positive drain or charge rate.
pub const MIN_RATE: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Battery configuration
// ---------------------------------------------------------------------------

/// Per-battery timing, in seconds.
///
/// Stored as plain numbers so a config file can carry any value, including
/// nonsensical ones; [`BatteryConfig::rates`] normalises them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    /// Time to fully drain from 100% to 0%.
    pub drain_rate_secs: f64,
    /// Time to fully charge from 0% to 100%.
    pub charge_rate_secs: f64,
    /// Time spent in `Disconnecting` before draining starts.
    pub disconnecting_secs: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            drain_rate_secs: 60.0 * 60.0,   // 60 min
            charge_rate_secs: 30.0 * 60.0,  // 30 min
            disconnecting_secs: 30.0,
        }
    }
}

impl BatteryConfig {
    /// Short cycle for demonstrations.
    pub fn fast() -> Self {
        Self {
            drain_rate_secs: 2.0 * 60.0,
            charge_rate_secs: 30.0,
            disconnecting_secs: 1.0,
        }
    }

    /// Slow cycle for realistic long-running simulation.
    pub fn standard() -> Self {
        Self {
            drain_rate_secs: 200.0 * 60.0,
            charge_rate_secs: 100.0 * 60.0,
            disconnecting_secs: 60.0,
        }
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self::default(),
            Preset::Fast => Self::fast(),
            Preset::Standard => Self::standard(),
        }
    }

    /// Normalise into strictly valid durations.
    ///
    /// Rates that are not positive (or round to zero) fall back to
    /// [`MIN_RATE`]; a negative (or NaN) dwell falls back to zero.  Substitutions are logged, never
    /// reported as errors.
    pub fn rates(&self) -> Rates {
        Rates {
            drain_rate: positive_or_floor(self.drain_rate_secs, "drain_rate_secs"),
            charge_rate: positive_or_floor(self.charge_rate_secs, "charge_rate_secs"),
            disconnecting_duration: non_negative_or_zero(self.disconnecting_secs),
        }
    }
}

fn positive_or_floor(secs: f64, field: &str) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => d,
        Err(_) if secs > 0.0 => Duration::MAX,
        _ => {
            warn!("{} = {} is not positive, using {:?}", field, secs, MIN_RATE);
            MIN_RATE
        }
    }
}

fn non_negative_or_zero(secs: f64) -> Duration {
    if secs >= 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        warn!("disconnecting_secs = {} is negative, using 0s", secs);
        Duration::ZERO
    }
}

/// Validated battery timing.  Rates are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rates {
    pub drain_rate: Duration,
    pub charge_rate: Duration,
    pub disconnecting_duration: Duration,
}

impl Rates {
    /// Percentage points lost per minute while draining.
    pub fn drain_percent_per_minute(&self) -> f64 {
        100.0 / minutes(self.drain_rate)
    }

    /// Percentage points gained per minute while charging.
    pub fn charge_percent_per_minute(&self) -> f64 {
        100.0 / minutes(self.charge_rate)
    }
}

fn minutes(d: Duration) -> f64 {
    d.as_secs_f64() / 60.0
}

/// Named battery presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Default,
    Fast,
    Standard,
}

impl core::str::FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(Self::Default),
            "fast" | "demo" => Ok(Self::Fast),
            "standard" | "realistic" => Ok(Self::Standard),
            _ => Err(Error::Config("unknown preset")),
        }
    }
}

/// Which simulated input sequence drives the mock buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoMode {
    /// Connect every battery in turn, hold, release all.
    All,
    /// Toggle a random battery every couple of seconds.
    Random,
    /// No demo; inputs stay released.
    Off,
}

impl core::str::FromStr for DemoMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "random" => Ok(Self::Random),
            "off" | "none" => Ok(Self::Off),
            _ => Err(Error::Config("unknown demo mode")),
        }
    }
}

// ---------------------------------------------------------------------------
// System configuration
// ---------------------------------------------------------------------------

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Batteries ---
    /// When set, replaces `battery` with the named preset.
    pub preset: Option<Preset>,
    /// Explicit battery timing (used when `preset` is absent).
    pub battery: BatteryConfig,
    /// Number of independent batteries on the panel.
    pub battery_count: usize,

    // --- LED strip ---
    /// Total LEDs on the strip.
    pub led_count: usize,
    /// Dark LEDs between two battery sections.
    pub spacing_leds: usize,

    // --- Timing ---
    /// Battery self-poll interval (milliseconds)
    pub poll_interval_ms: u64,
    /// Panel input/render interval (milliseconds)
    pub panel_update_ms: u64,
    /// Telemetry log interval (seconds)
    pub telemetry_interval_secs: u64,
    /// Stop after this many seconds; 0 runs until killed.
    pub run_secs: u64,

    // --- Simulation ---
    pub demo: DemoMode,
    /// RNG seed for flicker and demo; 0 draws from entropy.
    pub demo_seed: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            preset: None,
            battery: BatteryConfig::default(),
            battery_count: 5,

            led_count: 144,
            spacing_leds: 4,

            poll_interval_ms: 100, // 10 Hz
            panel_update_ms: 50,   // 20 Hz
            telemetry_interval_secs: 5,
            run_secs: 0,

            demo: DemoMode::Random,
            demo_seed: 0,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON document.  Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Battery timing after applying the preset, if any.
    pub fn battery_config(&self) -> BatteryConfig {
        self.preset.map_or(self.battery, BatteryConfig::preset)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn panel_update_interval(&self) -> Duration {
        Duration::from_millis(self.panel_update_ms)
    }

    /// Reject values that would leave the panel unable to run.
    ///
    /// Battery timing is not checked here; it is clamped instead.
    pub fn validate(&self) -> Result<()> {
        if self.battery_count == 0 {
            return Err(Error::Config("battery_count must be > 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be > 0"));
        }
        if self.panel_update_ms == 0 {
            return Err(Error::Config("panel_update_ms must be > 0"));
        }
        if self.telemetry_interval_secs == 0 {
            return Err(Error::Config("telemetry_interval_secs must be > 0"));
        }
        let spacing = self.spacing_leds.saturating_mul(self.battery_count - 1);
        if self.led_count <= spacing || (self.led_count - spacing) / self.battery_count == 0 {
            return Err(Error::Config("led_count too small for battery_count and spacing_leds"));
        }
        Ok(())
    }
}
