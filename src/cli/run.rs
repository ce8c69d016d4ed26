//! Headless backup run
//!
//! `snapmirror run` performs one backup cycle and exits with a status the
//! scheduler can act on. This is the command scheduled tasks invoke.

use std::path::PathBuf;

use clap::Args;

use crate::backup::{exit_status, mirror_for, BackupCycle, MirrorBackend, SnapshotNamer};
use crate::config::{resolve_source, Settings};

/// Arguments for a single backup cycle
///
/// Anything not given on the command line falls back to saved settings.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory holding the dated snapshot folders
    #[arg(long)]
    pub backup_root: Option<PathBuf>,

    /// Delete snapshots older than this many days
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub retention_days: Option<u32>,

    /// Directory to back up (defaults to the OneDrive root)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Mirror implementation
    #[arg(long, value_enum)]
    pub backend: Option<MirrorBackend>,
}

/// Run one backup cycle and return the process exit status
///
/// `0` on success, `1` when the cycle could not start, or the mirror's own
/// code when it failed.
pub fn handle_run(settings: &Settings, args: RunArgs) -> i32 {
    let backup_root = args
        .backup_root
        .unwrap_or_else(|| settings.backup_root.clone());
    let retention_days = args.retention_days.unwrap_or(settings.retention_days);
    let backend = args.backend.unwrap_or(settings.mirror_backend);

    let source = match resolve_source(args.source.or_else(|| settings.source.clone())) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "cannot determine source directory");
            return e.exit_code();
        }
    };

    let mirror = mirror_for(backend, settings.retry);
    let namer = SnapshotNamer::system();
    let cycle = BackupCycle::new(mirror.as_ref(), &namer);

    let result = cycle.run_once(&source, &backup_root, retention_days);
    match &result {
        Ok(outcome) => {
            for line in outcome.summary_lines() {
                println!("{}", line);
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
    exit_status(&result)
}
