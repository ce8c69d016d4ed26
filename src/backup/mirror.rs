//! Mirror invocation
//!
//! A [`Mirror`] makes a destination directory an exact copy of a source
//! tree and reports a [`CycleResult`]. Two implementations exist: the
//! robocopy wrapper, which drives the external tool through a
//! [`ProcessRunner`], and the in-process [`NativeMirror`].

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::native::NativeMirror;
use super::result::CycleResult;
use crate::process::{CommandSpec, ProcessRunner, SystemRunner};

/// Outcome of one mirror invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// Classified result
    pub result: CycleResult,
    /// Tool output, kept for the log
    pub stdout: String,
    /// Diagnostics; only surfaced when the result is fatal
    pub stderr: String,
}

impl MirrorReport {
    /// A fatal report carrying one diagnostic line
    pub fn fatal(diagnostic: impl Into<String>) -> Self {
        Self {
            result: CycleResult::FATAL,
            stdout: String::new(),
            stderr: diagnostic.into(),
        }
    }
}

/// One-directional tree mirror
pub trait Mirror {
    /// Create `destination` (and any missing ancestors), then mirror `source`
    /// into it, removing destination entries that are absent from `source`.
    fn mirror(&self, source: &Path, destination: &Path) -> MirrorReport;
}

/// Per-file retry policy for locked or unreadable files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt
    pub retries: u32,
    /// Seconds to wait between attempts
    pub wait_secs: u32,
}

impl RetryPolicy {
    /// Wait between attempts
    pub fn wait(&self) -> Duration {
        Duration::from_secs(u64::from(self.wait_secs))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            wait_secs: 1,
        }
    }
}

/// Which mirror implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MirrorBackend {
    /// Windows `robocopy /MIR`
    Robocopy,
    /// Built-in mirror, available everywhere
    Native,
}

impl Default for MirrorBackend {
    fn default() -> Self {
        if cfg!(windows) {
            Self::Robocopy
        } else {
            Self::Native
        }
    }
}

impl std::fmt::Display for MirrorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Robocopy => write!(f, "robocopy"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// Build the mirror for a backend
pub fn mirror_for(backend: MirrorBackend, retry: RetryPolicy) -> Box<dyn Mirror> {
    match backend {
        MirrorBackend::Robocopy => Box::new(Robocopy::new(SystemRunner, retry)),
        MirrorBackend::Native => Box::new(NativeMirror::new(retry)),
    }
}

/// Mirrors with `robocopy <src> <dst> /MIR /FFT /R:n /W:n`
///
/// `/FFT` assumes FAT file times (2 second granularity) so that copies
/// between file systems with different timestamp precision are not
/// repeated on every run.
pub struct Robocopy<R> {
    runner: R,
    retry: RetryPolicy,
}

impl<R: ProcessRunner> Robocopy<R> {
    /// Create a robocopy mirror using `runner`
    pub fn new(runner: R, retry: RetryPolicy) -> Self {
        Self { runner, retry }
    }

    /// The exact command line for one invocation
    pub fn command(&self, source: &Path, destination: &Path) -> CommandSpec {
        CommandSpec::new("robocopy")
            .arg(source.to_string_lossy())
            .arg(destination.to_string_lossy())
            .args(["/MIR", "/FFT"])
            .arg(format!("/R:{}", self.retry.retries))
            .arg(format!("/W:{}", self.retry.wait_secs))
    }
}

impl<R: ProcessRunner> Mirror for Robocopy<R> {
    fn mirror(&self, source: &Path, destination: &Path) -> MirrorReport {
        if let Err(e) = fs::create_dir_all(destination) {
            return MirrorReport::fatal(format!(
                "Failed to create destination {}: {}",
                destination.display(),
                e
            ));
        }

        let command = self.command(source, destination);
        tracing::info!(command = %command, "running mirror");

        match self.runner.run(&command) {
            Ok(output) => MirrorReport {
                result: CycleResult::from_exit_status(output.status),
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(e) => MirrorReport::fatal(format!("Failed to launch robocopy: {}", e)),
        }
    }
}
