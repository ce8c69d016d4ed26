//! Backup engine for snapmirror
//!
//! Mirrors a source tree into dated snapshot folders and prunes the ones
//! that fell out of the retention window.
//!
//! # Architecture
//!
//! - `naming`: snapshot identifiers (`YYYY-MM-DD_HH-MM`) and the clock
//! - `result`: `CycleResult`, the robocopy-style outcome classification
//! - `mirror`: the `Mirror` trait and the robocopy invoker
//! - `native`: the built-in mirror
//! - `retention`: listing and pruning snapshot folders
//! - `cycle`: `BackupCycle`, which ties the above together
//!
//! # Backup Layout
//!
//! ```text
//! D:\OneDriveBackup\
//!   2025-10-31_09-00\
//!   2025-11-01_09-00\
//!   SomethingElse\        <- never touched
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use snapmirror::backup::{mirror_for, BackupCycle, MirrorBackend, RetryPolicy, SnapshotNamer};
//!
//! let mirror = mirror_for(MirrorBackend::Native, RetryPolicy::default());
//! let namer = SnapshotNamer::system();
//! let outcome = BackupCycle::new(mirror.as_ref(), &namer)
//!     .run_once(&source, &backup_root, 30)?;
//! println!("{}", outcome.result);
//! ```

mod cycle;
mod mirror;
mod native;
mod naming;
mod result;
mod retention;

pub use cycle::{exit_status, BackupCycle, CycleOutcome};
pub use mirror::{mirror_for, Mirror, MirrorBackend, MirrorReport, RetryPolicy, Robocopy};
pub use native::NativeMirror;
pub use naming::{
    is_snapshot_name, Clock, FixedClock, LocalClock, SnapshotId, SnapshotNameError,
    SnapshotNamer, SNAPSHOT_FORMAT,
};
pub use result::CycleResult;
pub use retention::{
    expired_snapshots, is_expired, prune, prune_at, retention_cutoff, scan_snapshots,
    PruneFailure, PruneReport, SnapshotInfo, SnapshotScan,
};

#[cfg(test)]
pub(crate) use mirror::testing;
