//! Snapshot folder naming
//!
//! Snapshot folders are named `YYYY-MM-DD_HH-MM` in local time. The format
//! sorts lexicographically in chronological order and is the only thing that
//! marks a folder under the backup root as one of ours.

use std::fmt;
use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// strftime pattern of a snapshot identifier
pub const SNAPSHOT_FORMAT: &str = "%Y-%m-%d_%H-%M";

const SNAPSHOT_NAME_LEN: usize = 16;

/// Why a folder name is not a usable snapshot identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotNameError {
    /// The name does not have the `YYYY-MM-DD_HH-MM` shape
    Shape,
    /// The shape matches but the date or time is out of range
    Calendar,
}

impl fmt::Display for SnapshotNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape => write!(f, "not shaped like YYYY-MM-DD_HH-MM"),
            Self::Calendar => write!(f, "date or time out of range"),
        }
    }
}

impl std::error::Error for SnapshotNameError {}

/// A minute-granular point in time naming a snapshot folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotId(NaiveDateTime);

impl SnapshotId {
    /// Build an identifier, truncating seconds and below
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        let truncated = at
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(at);
        Self(truncated)
    }

    /// Parse a folder name produced by [`SnapshotId`]'s `Display`
    pub fn parse(name: &str) -> Result<Self, SnapshotNameError> {
        if !is_snapshot_name(name) {
            return Err(SnapshotNameError::Shape);
        }

        // Shape check guarantees ASCII digits at these offsets
        let field = |range: std::ops::Range<usize>| -> u32 {
            name[range].bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
        };

        let year = field(0..4) as i32;
        if year == 0 {
            return Err(SnapshotNameError::Calendar);
        }
        let date = NaiveDate::from_ymd_opt(year, field(5..7), field(8..10))
            .ok_or(SnapshotNameError::Calendar)?;
        let time = NaiveTime::from_hms_opt(field(11..13), field(14..16), 0)
            .ok_or(SnapshotNameError::Calendar)?;

        Ok(Self(NaiveDateTime::new(date, time)))
    }

    /// The instant this identifier stands for
    pub fn timestamp(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SNAPSHOT_FORMAT))
    }
}

/// True iff `name` is exactly `DDDD-DD-DD_DD-DD` with ASCII digits
pub fn is_snapshot_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() != SNAPSHOT_NAME_LEN {
        return false;
    }

    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 | 13 => *b == b'-',
        10 => *b == b'_',
        _ => b.is_ascii_digit(),
    })
}

/// Source of "now" for naming and retention
pub trait Clock: Send + Sync {
    /// Current local wall-clock time
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Hands out snapshot identifiers for "now"
///
/// Identifiers never go backwards within one namer, even if the wall clock
/// does (daylight saving, NTP corrections); a regressed clock repeats the
/// last identifier instead.
pub struct SnapshotNamer {
    clock: Box<dyn Clock>,
    last: Mutex<Option<SnapshotId>>,
}

impl SnapshotNamer {
    /// Namer backed by the local clock
    pub fn system() -> Self {
        Self::with_clock(Box::new(LocalClock))
    }

    /// Namer backed by a custom clock
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(None),
        }
    }

    /// The clock used for naming
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Identifier for the current minute
    pub fn current_identifier(&self) -> SnapshotId {
        let candidate = SnapshotId::from_datetime(self.clock.now());
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let issued = match *last {
            Some(prev) if prev > candidate => prev,
            _ => candidate,
        };
        *last = Some(issued);
        issued
    }
}

impl Default for SnapshotNamer {
    fn default() -> Self {
        Self::system()
    }
}
