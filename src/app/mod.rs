//! Application core: domain logic around the batteries.
//!
//! The panel, its demo driver and the events they emit.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod demo;
pub mod events;
pub mod ports;
pub mod service;
