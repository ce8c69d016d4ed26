//! User settings for snapmirror
//!
//! Holds the defaults shown by the setup wizard and used by headless runs:
//! retention window, backup root, mirror backend and the scheduled task.
//! A loaded `Settings` value is passed explicitly to everything that needs
//! it; nothing reads configuration from process-wide state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::SnapPaths;
use crate::backup::{MirrorBackend, RetryPolicy};
use crate::error::SnapError;
use crate::schedule::{validate_time_hhmm, HeadlessInvocation, ScheduleKind, ScheduleSpec};

/// Scheduled task preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Name of the OS scheduled task
    #[serde(default = "default_task_name")]
    pub task_name: String,

    /// How often the task fires
    #[serde(default)]
    pub kind: ScheduleKind,

    /// 24-hour `HH:MM` start time
    #[serde(default = "default_start_time")]
    pub start_time: String,

    /// Every N hours/minutes for HOURLY and MINUTE schedules
    #[serde(default = "default_modifier")]
    pub modifier: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            task_name: default_task_name(),
            kind: ScheduleKind::default(),
            start_time: default_start_time(),
            modifier: default_modifier(),
        }
    }
}

impl ScheduleSettings {
    /// What to hand the scheduler registrar
    pub fn to_spec(&self) -> ScheduleSpec {
        ScheduleSpec {
            task_name: self.task_name.clone(),
            kind: self.kind,
            start_time: self.start_time.clone(),
            modifier: self.modifier,
        }
    }
}

/// User settings for snapmirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Days a snapshot folder is kept
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Directory holding the dated snapshot folders
    #[serde(default = "default_backup_root")]
    pub backup_root: PathBuf,

    /// Explicit source directory; resolved from the environment when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Which mirror implementation performs the copy
    #[serde(default)]
    pub mirror_backend: MirrorBackend,

    /// Per-file retry policy handed to the mirror
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Scheduled task preferences
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_retention_days() -> u32 {
    30
}

#[cfg(windows)]
fn default_backup_root() -> PathBuf {
    PathBuf::from(r"D:\OneDriveBackup")
}

#[cfg(not(windows))]
fn default_backup_root() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join("OneDriveBackup"))
        .unwrap_or_else(|| PathBuf::from("OneDriveBackup"))
}

fn default_task_name() -> String {
    "SnapMirrorBackup".to_string()
}

fn default_start_time() -> String {
    "09:00".to_string()
}

fn default_modifier() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            retention_days: default_retention_days(),
            backup_root: default_backup_root(),
            source: None,
            mirror_backend: MirrorBackend::default(),
            retry: RetryPolicy::default(),
            schedule: ScheduleSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &SnapPaths) -> Result<Self, SnapError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                SnapError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SnapError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SnapPaths) -> Result<(), SnapError> {
        self.validate()?;
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SnapError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            SnapError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// The headless command line a scheduled task should run
    pub fn headless_invocation(&self, program: PathBuf) -> HeadlessInvocation {
        HeadlessInvocation {
            program,
            backup_root: self.backup_root.clone(),
            retention_days: self.retention_days,
        }
    }

    /// Reject values a cycle or the scheduler cannot work with
    pub fn validate(&self) -> Result<(), SnapError> {
        if self.retention_days == 0 {
            return Err(SnapError::Validation(
                "retention_days must be at least 1".into(),
            ));
        }
        if !validate_time_hhmm(&self.schedule.start_time) {
            return Err(SnapError::Validation(format!(
                "schedule start time '{}' is not HH:MM",
                self.schedule.start_time
            )));
        }
        if self.schedule.modifier == 0 {
            return Err(SnapError::Validation(
                "schedule modifier must be at least 1".into(),
            ));
        }
        if self.schedule.task_name.trim().is_empty() {
            return Err(SnapError::Validation("task name cannot be empty".into()));
        }
        Ok(())
    }
}
