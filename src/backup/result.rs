//! Mirror outcome classification
//!
//! Exit codes follow robocopy's bit layout: values below 8 are successful
//! cycles carrying informational flags, 8 and above are failures.

use std::fmt;

/// Ordinal classification of a mirror invocation (lower is better)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleResult(i32);

impl CycleResult {
    /// Nothing to copy, nothing wrong
    pub const NO_CHANGE: Self = Self(0);
    /// Bit: files were copied
    pub const COPIED: i32 = 1;
    /// Bit: destination held entries not present in the source
    pub const EXTRAS: i32 = 2;
    /// Bit: mismatched entries were found
    pub const MISMATCHES: i32 = 4;
    /// Some files or directories could not be copied
    pub const FAILED: Self = Self(8);
    /// Serious error: nothing could be copied at all
    pub const FATAL: Self = Self(16);

    /// Lowest code that counts as a failed cycle
    pub const FAILURE_THRESHOLD: i32 = 8;

    /// Wrap a raw exit code
    pub fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Classify an exit status; a missing status (killed by a signal) is fatal
    pub fn from_exit_status(status: Option<i32>) -> Self {
        status.map_or(Self::FATAL, Self)
    }

    /// Compose a result from informational flags plus a failure marker
    pub fn from_flags(copied: bool, extras: bool, mismatches: bool, failed: bool) -> Self {
        let mut code = 0;
        if copied {
            code |= Self::COPIED;
        }
        if extras {
            code |= Self::EXTRAS;
        }
        if mismatches {
            code |= Self::MISMATCHES;
        }
        if failed {
            code |= Self::FAILED.0;
        }
        Self(code)
    }

    /// The underlying exit code
    pub fn code(&self) -> i32 {
        self.0
    }

    /// Codes 0-7 are successful cycles; negative codes are never produced
    /// by the tool and are treated as failures.
    pub fn is_success(&self) -> bool {
        (0..Self::FAILURE_THRESHOLD).contains(&self.0)
    }

    /// Inverse of [`is_success`](Self::is_success)
    pub fn is_fatal(&self) -> bool {
        !self.is_success()
    }

    /// Whether any file was copied
    pub fn files_copied(&self) -> bool {
        self.is_success() && self.0 & Self::COPIED != 0
    }

    /// Whether extraneous destination entries were seen
    pub fn has_extras(&self) -> bool {
        self.is_success() && self.0 & Self::EXTRAS != 0
    }

    /// Whether mismatches were seen
    pub fn has_mismatches(&self) -> bool {
        self.is_success() && self.0 & Self::MISMATCHES != 0
    }

    /// Human-readable summary of the code
    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "no changes needed",
            1 => "files copied",
            2 => "extraneous destination entries detected",
            3 => "files copied, extraneous entries detected",
            4 => "mismatches detected",
            5 => "files copied, mismatches detected",
            6 => "mismatches and extraneous entries detected",
            7 => "files copied, mismatches and extraneous entries detected",
            _ => "fatal: copy failures or serious error",
        }
    }
}

impl fmt::Display for CycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_threshold() {
        for code in 0..8 {
            assert!(CycleResult::from_code(code).is_success(), "code {code}");
        }
        for code in [8, 9, 15, 16, 255] {
            assert!(CycleResult::from_code(code).is_fatal(), "code {code}");
        }
        assert!(CycleResult::from_code(-1).is_fatal());
    }

    #[test]
    fn test_signal_termination_is_fatal() {
        assert_eq!(CycleResult::from_exit_status(None), CycleResult::FATAL);
        assert_eq!(CycleResult::from_exit_status(Some(3)).code(), 3);
    }

    #[test]
    fn test_flags() {
        let result = CycleResult::from_flags(true, true, false, false);
        assert_eq!(result.code(), 3);
        assert!(result.files_copied());
        assert!(result.has_extras());
        assert!(!result.has_mismatches());

        let all = CycleResult::from_flags(true, true, true, false);
        assert_eq!(all.code(), 7);

        let failed = CycleResult::from_flags(true, false, false, true);
        assert_eq!(failed.code(), 9);
        assert!(failed.is_fatal());
        assert!(!failed.files_copied());
    }

    #[test]
    fn test_ordering_is_ordinal() {
        assert!(CycleResult::NO_CHANGE < CycleResult::from_code(7));
        assert!(CycleResult::from_code(7) < CycleResult::FAILED);
    }

    #[test]
    fn test_display() {
        assert_eq!(CycleResult::from_code(1).to_string(), "1 (files copied)");
    }
}
