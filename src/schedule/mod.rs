//! Scheduled task registration
//!
//! The OS scheduler invokes the headless entry point
//! (`snapmirror run --backup-root <root> --retention-days <n>`) on a fixed
//! schedule. Registration goes through the [`SchedulerRegistrar`] trait; the
//! Windows implementation is [`Schtasks`].

mod schtasks;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SnapResult;

pub use schtasks::Schtasks;

/// How often the scheduled task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScheduleKind {
    /// Once a day at the start time
    #[default]
    Daily,
    /// Every N hours
    Hourly,
    /// Every N minutes
    Minute,
}

impl ScheduleKind {
    /// Whether the modifier (every N units) applies
    pub fn uses_modifier(&self) -> bool {
        matches!(self, Self::Hourly | Self::Minute)
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "DAILY"),
            Self::Hourly => write!(f, "HOURLY"),
            Self::Minute => write!(f, "MINUTE"),
        }
    }
}

impl FromStr for ScheduleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "HOURLY" => Ok(Self::Hourly),
            "MINUTE" => Ok(Self::Minute),
            other => Err(format!("unknown schedule type '{}'", other)),
        }
    }
}

/// True for a 24-hour `HH:MM` string with HH in 00..=23 and MM in 00..=59
pub fn validate_time_hhmm(hhmm: &str) -> bool {
    let bytes = hhmm.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hh = (digits[0] - b'0') * 10 + (digits[1] - b'0');
    let mm = (digits[2] - b'0') * 10 + (digits[3] - b'0');
    hh <= 23 && mm <= 59
}

/// What to register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSpec {
    /// Task name in the OS scheduler
    pub task_name: String,
    /// Frequency
    pub kind: ScheduleKind,
    /// First start, `HH:MM`
    pub start_time: String,
    /// Every N hours/minutes; ignored for daily schedules
    pub modifier: u32,
}

/// The command line the scheduler runs each time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessInvocation {
    /// Path of the snapmirror executable
    pub program: PathBuf,
    /// Backup root passed to `run`
    pub backup_root: PathBuf,
    /// Retention passed to `run`
    pub retention_days: u32,
}

impl HeadlessInvocation {
    /// Render the task action as a single quoted command line
    pub fn command_line(&self) -> String {
        format!(
            "{} run --backup-root {} --retention-days {}",
            quote_arg(&self.program),
            quote_arg(&self.backup_root),
            self.retention_days
        )
    }
}

/// Wrap a path in double quotes for Windows argv parsing
///
/// Trailing backslashes are doubled so the closing quote is not escaped.
fn quote_arg(path: &Path) -> String {
    let text = path.display().to_string();
    let trailing = text.len() - text.trim_end_matches('\\').len();
    format!("\"{}{}\"", text, "\\".repeat(trailing))
}

/// How a task was stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The task still exists but will no longer run
    Disabled,
    /// The task was removed
    Deleted,
}

/// Registers and stops the recurring task
pub trait SchedulerRegistrar {
    /// Create or overwrite the task
    fn register(&self, spec: &ScheduleSpec, invocation: &HeadlessInvocation) -> SnapResult<()>;

    /// Disable the task, deleting it if it cannot be disabled
    fn stop(&self, task_name: &str) -> SnapResult<StopOutcome>;
}
