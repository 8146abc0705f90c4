//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Battery / Panel (domain)
//! ```
//!
//! Driven adapters (clock, inputs, LED strip, event sinks) implement these
//! traits.  The [`Panel`](super::service::Panel) consumes them via generics,
//! so the domain core never touches hardware directly.

use std::time::Instant;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: time source → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source shared between a battery and its poll thread.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: buttons / switches → domain)
// ───────────────────────────────────────────────────────────────

/// A single digital input, sampled by the panel on every update.
pub trait InputPort {
    /// `true` while the input is active (pressed, connected).
    fn is_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// LED strip port (driven adapter: domain → addressable LEDs)
// ───────────────────────────────────────────────────────────────

/// An RGB colour, each channel 0–255.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const RED: Self = Self::new(5, 0, 0);
    pub const GREEN: Self = Self::new(0, 5, 0);
    pub const YELLOW: Self = Self::new(5, 5, 0);

    pub fn is_off(self) -> bool {
        self == Self::BLACK
    }
}

/// Write-side port for an addressable LED strip.
///
/// Writes go to a back buffer; nothing is visible until [`show`](Self::show).
pub trait LedStripPort {
    /// Number of LEDs on the strip.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set one LED.  Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: usize, colour: Rgb);

    /// Set every LED to `colour`.
    fn fill(&mut self, colour: Rgb);

    /// Latch the back buffer onto the LEDs.
    fn show(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
