//! Battery panel library.
//!
//! Exposes the battery state machine, the panel around it and the
//! adapters the host binary wires together, for integration testing and
//! for embedding the simulator in other hosts.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod battery;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod scheduler;

pub use battery::{Battery, BatteryInfo};
pub use error::{Error, Result};
pub use fsm::SystemState;
