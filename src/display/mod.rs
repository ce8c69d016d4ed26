//! Display formatting for terminal output
//!
//! Provides table formatting for snapshot listings.

pub mod snapshot;

pub use snapshot::{format_age, format_snapshot_table};
