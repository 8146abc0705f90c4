//! Digital input drivers for the reset and connect buttons.
//!
//! ## Hardware
//!
//! Momentary switches or latching connectors on GPIO inputs.  Most are
//! wired active-low with a pull-up, so [`PinButton`] can invert the read.
//!
//! | Driver       | Source                          | Used by            |
//! |--------------|---------------------------------|--------------------|
//! | `PinButton`  | any `embedded_hal` `InputPin`   | real panels        |
//! | `MockButton` | shared atomic flag              | demo driver, tests |

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::InputPort;

/// A button read from a GPIO pin.
pub struct PinButton<P> {
    pin: P,
    /// `true` when the pin reads low while pressed.
    inverted: bool,
    /// Latched after the first read error so the log is not flooded.
    faulted: bool,
}

impl<P: InputPin> PinButton<P> {
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            faulted: false,
        }
    }

    /// Active-low button with pull-up.
    pub fn active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> InputPort for PinButton<P> {
    fn is_pressed(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => {
                self.faulted = false;
                high != self.inverted
            }
            Err(e) => {
                if !self.faulted {
                    warn!("Button: pin read failed ({:?}), treating as released", e);
                    self.faulted = true;
                }
                false
            }
        }
    }
}

/// In-memory button.  Clones share the same flag, so one clone can be
/// handed to the panel while another is driven by the demo or a test.
#[derive(Debug, Clone, Default)]
pub struct MockButton {
    pressed: Arc<AtomicBool>,
}

impl MockButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::Release);
    }

    pub fn pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

impl InputPort for MockButton {
    fn is_pressed(&mut self) -> bool {
        self.pressed()
    }
}
