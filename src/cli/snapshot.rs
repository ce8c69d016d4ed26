//! Snapshot listing and pruning commands

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::Args;

use crate::backup::{
    expired_snapshots, prune_at, retention_cutoff, scan_snapshots, Clock, LocalClock,
};
use crate::config::Settings;
use crate::display::format_snapshot_table;
use crate::error::{SnapError, SnapResult};

/// Which backup root and retention window to look at
#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotArgs {
    /// Directory holding the dated snapshot folders
    #[arg(long)]
    pub backup_root: Option<PathBuf>,

    /// Retention window in days
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub retention_days: Option<u32>,
}

impl SnapshotArgs {
    fn resolve(&self, settings: &Settings) -> (PathBuf, u32) {
        (
            self.backup_root
                .clone()
                .unwrap_or_else(|| settings.backup_root.clone()),
            self.retention_days.unwrap_or(settings.retention_days),
        )
    }
}

/// List snapshot folders under the backup root
pub fn handle_list(settings: &Settings, args: &SnapshotArgs) -> SnapResult<()> {
    let (root, retention_days) = args.resolve(settings);
    let now = LocalClock.now();
    let scan = scan_snapshots(&root)?;

    println!("Snapshots in {}", root.display());
    println!();
    println!(
        "{}",
        format_snapshot_table(
            &scan.snapshots,
            now,
            retention_cutoff(now, retention_days)
        )
    );

    if !scan.snapshots.is_empty() {
        println!();
        println!(
            "Total: {} snapshot(s), retention {} day(s)",
            scan.snapshots.len(),
            retention_days
        );
    }

    if !scan.unparseable.is_empty() {
        println!();
        println!("Ignored (not a valid date):");
        for path in &scan.unparseable {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

/// Delete expired snapshots; without `force` only shows what would go
pub fn handle_prune(settings: &Settings, args: &SnapshotArgs, force: bool) -> SnapResult<()> {
    prune_as_of(settings, args, force, LocalClock.now())
}

/// Preview and deletion share one `now` so they agree on the cutoff
fn prune_as_of(
    settings: &Settings,
    args: &SnapshotArgs,
    force: bool,
    now: NaiveDateTime,
) -> SnapResult<()> {
    let (root, retention_days) = args.resolve(settings);
    let expired = expired_snapshots(&root, retention_days, now)?;

    if expired.is_empty() {
        println!("No snapshots to prune.");
        println!("Current retention policy: {} day(s)", retention_days);
        return Ok(());
    }

    println!("Prune Summary");
    println!("=============");
    println!("Backup root: {}", root.display());
    println!("Retention policy: {} day(s)", retention_days);
    println!("Snapshots to delete: {}", expired.len());
    for snapshot in &expired {
        println!("  {}", snapshot.id);
    }
    println!();

    if !force {
        println!("To proceed, run again with --force flag:");
        println!("  snapmirror prune --force");
        return Ok(());
    }

    let report = prune_at(&root, retention_days, now);
    println!("Deleted {} snapshot(s).", report.removed.len());

    if report.failed.is_empty() {
        return Ok(());
    }
    for failure in &report.failed {
        println!("  could not remove {}: {}", failure.path.display(), failure.error);
    }
    Err(SnapError::Io(format!(
        "{} snapshot(s) could not be fully removed",
        report.failed.len()
    )))
}
