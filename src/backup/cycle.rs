//! Backup cycle orchestration
//!
//! One cycle: check the source, ensure the backup root, mirror into a new
//! dated folder, and prune expired folders when the mirror succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use super::mirror::Mirror;
use super::naming::SnapshotNamer;
use super::result::CycleResult;
use super::retention::{prune_at, PruneReport};
use crate::error::{SnapError, SnapResult};

/// Outcome of a cycle that reached the mirror
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Snapshot folder the mirror wrote into
    pub destination: PathBuf,
    /// Classified mirror result
    pub result: CycleResult,
    /// Prune pass, present only for successful results
    pub prune: Option<PruneReport>,
    /// Standard output of the mirror
    pub mirror_output: String,
}

impl CycleOutcome {
    /// Whether the cycle succeeded (mirror result below 8)
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Process exit status: 0 on success, the mirror code otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            self.result.code()
        }
    }

    /// Human-readable report: mirror output, result, then the prune pass
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .mirror_output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        lines.push(format!("Snapshot: {}", self.destination.display()));
        lines.push(format!("Mirror result: {}", self.result));

        match &self.prune {
            Some(report) => {
                lines.push(format!("Pruned {} old snapshot(s)", report.removed.len()));
                for failure in &report.failed {
                    lines.push(format!(
                        "  could not remove {}: {}",
                        failure.path.display(),
                        failure.error
                    ));
                }
            }
            None => lines.push("Pruning skipped because the mirror failed.".to_string()),
        }
        lines
    }
}

/// Process exit status for the result of [`BackupCycle::run_once`]
///
/// `0` on success, `1` for local errors (source missing), and the mirror's
/// own code for fatal mirror results.
pub fn exit_status(result: &SnapResult<CycleOutcome>) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => e.exit_code(),
    }
}

/// Runs backup cycles
///
/// Cycles are synchronous and must not run concurrently against the same
/// backup root; no lock is taken on it.
pub struct BackupCycle<'a> {
    mirror: &'a dyn Mirror,
    namer: &'a SnapshotNamer,
}

impl<'a> BackupCycle<'a> {
    /// Create a cycle runner
    pub fn new(mirror: &'a dyn Mirror, namer: &'a SnapshotNamer) -> Self {
        Self { mirror, namer }
    }

    /// Run one full cycle
    ///
    /// # Errors
    ///
    /// - [`SnapError::SourceMissing`] when `source` is not a directory; the
    ///   mirror is not invoked and nothing is created.
    /// - [`SnapError::Validation`] for a zero retention window.
    /// - [`SnapError::Io`] when the backup root cannot be created.
    ///
    /// A fatal mirror result is not an error: it is returned in the outcome
    /// with pruning skipped.
    pub fn run_once(
        &self,
        source: &Path,
        backup_root: &Path,
        retention_days: u32,
    ) -> SnapResult<CycleOutcome> {
        if !source.is_dir() {
            tracing::error!(source = %source.display(), "source path not found");
            return Err(SnapError::SourceMissing(source.to_path_buf()));
        }
        if retention_days == 0 {
            return Err(SnapError::Validation(
                "retention days must be at least 1".into(),
            ));
        }

        fs::create_dir_all(backup_root).map_err(|e| {
            SnapError::Io(format!(
                "Failed to create backup root {}: {}",
                backup_root.display(),
                e
            ))
        })?;

        let destination = backup_root.join(self.namer.current_identifier().to_string());
        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            "starting backup cycle"
        );

        let report = self.mirror.mirror(source, &destination);
        if !report.stdout.trim().is_empty() {
            tracing::info!("mirror output:\n{}", report.stdout.trim_end());
        }

        if report.result.is_fatal() {
            tracing::error!(code = report.result.code(), "mirror failed; skipping prune");
            if !report.stderr.trim().is_empty() {
                tracing::error!("mirror diagnostics:\n{}", report.stderr.trim_end());
            }
            return Ok(CycleOutcome {
                destination,
                result: report.result,
                prune: None,
                mirror_output: report.stdout,
            });
        }

        tracing::info!(result = %report.result, "mirror finished");
        let prune = prune_at(backup_root, retention_days, self.namer.clock().now());
        tracing::info!(
            removed = prune.removed.len(),
            failed = prune.failed.len(),
            "prune finished"
        );

        Ok(CycleOutcome {
            destination,
            result: report.result,
            prune: Some(prune),
            mirror_output: report.stdout,
        })
    }

    /// Headless entry point: run one cycle and map it with [`exit_status`]
    pub fn run_headless(&self, source: &Path, backup_root: &Path, retention_days: u32) -> i32 {
        let result = self.run_once(source, backup_root, retention_days);
        if let Err(e) = &result {
            tracing::error!(error = %e, "backup cycle aborted");
        }
        exit_status(&result)
    }
}
