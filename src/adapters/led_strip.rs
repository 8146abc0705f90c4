//! In-memory addressable LED strip.
//!
//! Double-buffered: pixel writes land in the back buffer and
//! [`show`](LedStripPort::show) latches them into the visible frame, the
//! way a NeoPixel driver only pushes data on an explicit write.  Both
//! buffers are fixed-capacity `heapless::Vec`s.

use heapless::Vec;

use crate::app::ports::{LedStripPort, Rgb};
use crate::error::{Error, Result};

/// Largest strip the panel will drive.
pub const MAX_LEDS: usize = 512;

/// A strip that renders into memory.
#[derive(Debug, Clone)]
pub struct MemoryLedStrip {
    back: Vec<Rgb, MAX_LEDS>,
    front: Vec<Rgb, MAX_LEDS>,
    /// Number of `show` calls so far.
    frames: u64,
}

impl MemoryLedStrip {
    /// A dark strip of `len` LEDs.
    pub fn new(len: usize) -> Result<Self> {
        if len > MAX_LEDS {
            return Err(Error::Capacity {
                requested: len,
                capacity: MAX_LEDS,
            });
        }
        let mut back = Vec::new();
        back.resize(len, Rgb::BLACK)
            .map_err(|()| Error::Capacity {
                requested: len,
                capacity: MAX_LEDS,
            })?;
        Ok(Self {
            front: back.clone(),
            back,
            frames: 0,
        })
    }

    /// The frame most recently latched by `show`.
    pub fn frame(&self) -> &[Rgb] {
        &self.front
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames
    }

    /// LEDs in the visible frame that are not black.
    pub fn lit_count(&self) -> usize {
        self.front.iter().filter(|c| !c.is_off()).count()
    }
}

impl LedStripPort for MemoryLedStrip {
    fn len(&self) -> usize {
        self.back.len()
    }

    fn set_pixel(&mut self, index: usize, colour: Rgb) {
        if let Some(px) = self.back.get_mut(index) {
            *px = colour;
        }
    }

    fn fill(&mut self, colour: Rgb) {
        self.back.iter_mut().for_each(|px| *px = colour);
    }

    fn show(&mut self) {
        self.front.clone_from(&self.back);
        self.frames += 1;
    }
}
