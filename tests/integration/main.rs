//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs on a manual clock, so elapsed
//! time is exact and no test depends on the poll threads firing.

mod battery_tests;
mod mock_hw;
mod panel_tests;
