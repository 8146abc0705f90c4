//! Unified error type for the panel surfaces.
//!
//! The battery state machine itself is infallible: bad numeric input is
//! clamped, never rejected.  Errors only arise where the host assembles a
//! panel (configuration, strip allocation).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid.  The message names the field and why.
    Config(&'static str),
    /// A configuration document could not be parsed.
    Parse(String),
    /// A fixed-capacity buffer was asked to hold more than it can.
    Capacity { requested: usize, capacity: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Parse(msg) => write!(f, "parse: {msg}"),
            Self::Capacity {
                requested,
                capacity,
            } => write!(f, "capacity: requested {requested}, limit is {capacity}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
