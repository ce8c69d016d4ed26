//! Path management for snapmirror
//!
//! Resolves where settings and log files live.
//!
//! ## Path Resolution Order
//!
//! 1. `SNAPMIRROR_DATA_DIR` environment variable (if set)
//! 2. The platform configuration directory reported by `directories`
//!    (`~/.config/snapmirror`, `%APPDATA%\snapmirror\config`, ...)

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

use crate::error::SnapError;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "SNAPMIRROR_DATA_DIR";

/// Manages all paths used by snapmirror
#[derive(Debug, Clone)]
pub struct SnapPaths {
    /// Base directory for settings and logs
    base_dir: PathBuf,
}

impl SnapPaths {
    /// Create a new SnapPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and the
    /// override variable is not set.
    pub fn new() -> Result<Self, SnapError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create SnapPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the directory holding log files of headless runs
    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Ensure the base and log directories exist
    pub fn ensure_directories(&self) -> Result<(), SnapError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SnapError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.log_dir())
            .map_err(|e| SnapError::Io(format!("Failed to create log directory: {}", e)))?;

        Ok(())
    }

    /// Check if the setup wizard has saved settings before
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, SnapError> {
    ProjectDirs::from("", "", "snapmirror")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| SnapError::Config("Could not determine a configuration directory".into()))
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(input: &str) -> PathBuf {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    expand_home_with(input, home.as_deref())
}

/// [`expand_home`] with an explicit home directory
///
/// Only `~` alone or followed by a separator is expanded; `~user` is left as-is.
pub fn expand_home_with(input: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(input);
    };
    match input.strip_prefix('~') {
        Some("") => home.to_path_buf(),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        _ => PathBuf::from(input),
    }
}
