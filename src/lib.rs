//! snapmirror - scheduled, retention-limited folder snapshots
//!
//! Each backup cycle mirrors a source tree (by default the OneDrive root)
//! into a new folder named after the current minute, `YYYY-MM-DD_HH-MM`,
//! under a backup root, then deletes dated folders older than the retention
//! window. Folders that don't carry a snapshot name are never touched.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: settings, paths and source resolution
//! - `error`: custom error types
//! - `backup`: snapshot naming, mirroring, retention and the backup cycle
//! - `schedule`: OS scheduled task registration
//! - `setup`: the interactive configurator
//! - `process`: external command execution
//! - `display`: terminal formatting
//! - `cli`: command handlers
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use snapmirror::config::{SnapPaths, Settings};
//!
//! let paths = SnapPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod process;
pub mod schedule;
pub mod setup;

pub use error::{SnapError, SnapResult};
