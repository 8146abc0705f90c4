//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements    | Connects to              |
//! |--------------|---------------|--------------------------|
//! | `led_strip`  | LedStripPort  | In-memory frame buffer   |
//! | `log_sink`   | EventSink     | `log` facade             |
//! | `time`       | Clock         | `std::time::Instant`     |

pub mod led_strip;
pub mod log_sink;
pub mod time;
