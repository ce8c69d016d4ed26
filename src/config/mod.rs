//! Configuration module for snapmirror
//!
//! This module provides configuration management including:
//! - Settings and log path resolution
//! - User settings persistence
//! - Source directory resolution

pub mod paths;
pub mod settings;
pub mod source;

pub use paths::SnapPaths;
pub use settings::{ScheduleSettings, Settings};
pub use source::resolve_source;
