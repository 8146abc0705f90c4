//! Battery section pattern engine.
//!
//! Turns a [`BatteryInfo`] snapshot into pixels for one section of the LED
//! strip.  The panel calls [`SectionRenderer::advance`] once per update and
//! then [`SectionRenderer::render`] once per battery.
//!
//! ## Patterns
//!
//! | State         | Pattern                                          | Rate |
//! |---------------|--------------------------------------------------|------|
//! | Charged       | Whole section green, subtle sine pulse 90–100 %  | 1 Hz |
//! | Disconnecting | Green bar, pixels flicker yellow or off          | 1 Hz |
//! | Draining      | Yellow bar, 2 flickering pixels past its end     | -    |
//! | Dead          | Whole section red, deep sine pulse 0–100 %       | 1 Hz |
//! | Charging      | Green bar, one yellow pixel sweeping above it    | 1 Hz |
//!
//! The bar length is `ceil(section_len * level / 100)`.

use core::f64::consts::TAU;
use core::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::{LedStripPort, Rgb};
use crate::battery::BatteryInfo;
use crate::fsm::SystemState;

const CHARGED_MAX_BRIGHTNESS: f64 = 40.0;
const DEAD_MAX_BRIGHTNESS: f64 = 10.0;
/// Pixels past the end of the draining bar that may flicker.
const DRAIN_FLICKER_ZONE: usize = 2;
const DRAIN_FLICKER_CHANCE: f64 = 0.3;
/// Chance that a flickering disconnect pixel is yellow rather than off.
const DISCONNECT_YELLOW_CHANCE: f64 = 0.6;

/// A contiguous run of LEDs owned by one battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub start: usize,
    pub len: usize,
}

/// Number of pixels in a bar for `level` percent of `len`.
pub fn lit_pixels(len: usize, level: f64) -> usize {
    let lit = (len as f64 * level / 100.0).ceil();
    if lit.is_nan() || lit <= 0.0 {
        0
    } else {
        (lit as usize).min(len)
    }
}

/// Animation state shared by every section.  Stack-allocated.
pub struct SectionRenderer {
    /// 0.0..1.0, one cycle per second.
    flash_phase: f64,
    /// 0.0..1.0, one cycle every two seconds.
    pulse_phase: f64,
    rng: SmallRng,
}

impl SectionRenderer {
    /// `seed == 0` draws the flicker RNG from OS entropy.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self {
            flash_phase: 0.0,
            pulse_phase: 0.0,
            rng,
        }
    }

    /// Advance the animation phases by real elapsed time.
    pub fn advance(&mut self, dt: Duration) {
        let secs = dt.as_secs_f64();
        self.flash_phase = (self.flash_phase + secs).rem_euclid(1.0);
        self.pulse_phase = (self.pulse_phase + secs * 0.5).rem_euclid(1.0);
    }

    pub fn flash_phase(&self) -> f64 {
        self.flash_phase
    }

    pub fn pulse_phase(&self) -> f64 {
        self.pulse_phase
    }

    /// Draw one battery into `section`.  Pixels outside the section are
    /// never touched; the caller clears the strip beforehand.
    pub fn render<S: LedStripPort + ?Sized>(
        &mut self,
        strip: &mut S,
        section: Section,
        info: &BatteryInfo,
    ) {
        match info.state {
            SystemState::Charged => self.charged(strip, section),
            SystemState::Disconnecting => self.disconnecting(strip, section, info.level),
            SystemState::Draining => self.draining(strip, section, info.level),
            SystemState::Dead => self.dead(strip, section),
            SystemState::Charging => self.charging(strip, section, info.level),
        }
    }

    fn charged<S: LedStripPort + ?Sized>(&self, strip: &mut S, section: Section) {
        let g = CHARGED_MAX_BRIGHTNESS * (0.9 + 0.1 * (self.flash_phase * TAU).sin());
        fill_section(strip, section, Rgb::new(0, g as u8, 0));
    }

    fn disconnecting<S: LedStripPort + ?Sized>(
        &mut self,
        strip: &mut S,
        section: Section,
        level: f64,
    ) {
        // Flicker grows over each one-second cycle.
        let flicker = self.flash_phase * 0.5;
        for i in 0..lit_pixels(section.len, level) {
            let colour = if self.rng.gen_bool(flicker) {
                if self.rng.gen_bool(DISCONNECT_YELLOW_CHANCE) {
                    Rgb::YELLOW
                } else {
                    Rgb::BLACK
                }
            } else {
                Rgb::GREEN
            };
            strip.set_pixel(section.start + i, colour);
        }
    }

    fn draining<S: LedStripPort + ?Sized>(&mut self, strip: &mut S, section: Section, level: f64) {
        let lit = lit_pixels(section.len, level);
        for i in 0..lit {
            strip.set_pixel(section.start + i, Rgb::YELLOW);
        }
        for i in lit..(lit + DRAIN_FLICKER_ZONE).min(section.len) {
            if self.rng.gen_bool(DRAIN_FLICKER_CHANCE) {
                strip.set_pixel(section.start + i, Rgb::YELLOW);
            }
        }
    }

    fn dead<S: LedStripPort + ?Sized>(&self, strip: &mut S, section: Section) {
        let r = DEAD_MAX_BRIGHTNESS * (0.5 + 0.5 * (self.flash_phase * TAU).sin());
        fill_section(strip, section, Rgb::new(r as u8, 0, 0));
    }

    fn charging<S: LedStripPort + ?Sized>(&self, strip: &mut S, section: Section, level: f64) {
        let lit = lit_pixels(section.len, level);
        for i in 0..lit {
            strip.set_pixel(section.start + i, Rgb::GREEN);
        }
        if lit < section.len {
            let sweep = (self.flash_phase * (section.len - lit) as f64) as usize;
            if lit + sweep < section.len {
                strip.set_pixel(section.start + lit + sweep, Rgb::YELLOW);
            }
        }
    }
}

fn fill_section<S: LedStripPort + ?Sized>(strip: &mut S, section: Section, colour: Rgb) {
    for i in section.start..section.start + section.len {
        strip.set_pixel(i, colour);
    }
}
