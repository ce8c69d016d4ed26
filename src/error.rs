//! Custom error types for snapmirror
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Mirror tool outcomes are not errors: they
//! are classified by [`crate::backup::CycleResult`]. Only local failures that
//! happen before or around a cycle live here.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for snapmirror operations
#[derive(Error, Debug)]
pub enum SnapError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user-supplied values
    #[error("Validation error: {0}")]
    Validation(String),

    /// The directory to back up does not exist
    #[error("Source path not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// An external process could not be launched
    #[error("Process error: {0}")]
    Process(String),

    /// Scheduled task registration or removal failed
    #[error("Schedule error: {0}")]
    Schedule(String),
}

impl SnapError {
    /// Check if this is the "source missing" error
    pub fn is_source_missing(&self) -> bool {
        matches!(self, Self::SourceMissing(_))
    }

    /// Process exit status for a local (pre-mirror) failure
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<std::io::Error> for SnapError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SnapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for snapmirror operations
pub type SnapResult<T> = Result<T, SnapError>;
