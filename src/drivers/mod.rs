//! Input drivers and LED pattern generation.

pub mod button;
pub mod led_patterns;
