//! Retention pruning
//!
//! Deletes snapshot folders older than the retention window. The folder name
//! is the only discriminator: anything under the backup root that is not a
//! real directory named `YYYY-MM-DD_HH-MM` with a valid date is left alone,
//! and age comes from the name, never from filesystem timestamps.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use walkdir::WalkDir;

use super::naming::{is_snapshot_name, Clock, LocalClock, SnapshotId};
use crate::error::{SnapError, SnapResult};

/// A snapshot folder found under the backup root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Identifier parsed from the folder name
    pub id: SnapshotId,
    /// Full path to the folder
    pub path: PathBuf,
}

/// Result of listing a backup root
#[derive(Debug, Clone, Default)]
pub struct SnapshotScan {
    /// Snapshot folders, newest first
    pub snapshots: Vec<SnapshotInfo>,
    /// Snapshot-shaped directories whose date does not exist
    pub unparseable: Vec<PathBuf>,
}

/// A condemned folder that could not be fully deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneFailure {
    /// The snapshot folder
    pub path: PathBuf,
    /// First error met while deleting it
    pub error: String,
}

/// What a prune pass did
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Folders deleted completely
    pub removed: Vec<PathBuf>,
    /// Folders that were only partially deleted
    pub failed: Vec<PruneFailure>,
    /// Snapshot-shaped folders skipped because their name does not parse
    pub skipped: Vec<PathBuf>,
}

impl PruneReport {
    /// Whether nothing was deleted or attempted
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.failed.is_empty()
    }
}

/// `now` shifted back by whole days; time of day is kept as-is
pub fn retention_cutoff(now: NaiveDateTime, retention_days: u32) -> NaiveDateTime {
    now.checked_sub_signed(Duration::days(i64::from(retention_days)))
        .unwrap_or(NaiveDateTime::MIN)
}

/// A snapshot is expired when it is strictly older than the cutoff
pub fn is_expired(id: &SnapshotId, cutoff: NaiveDateTime) -> bool {
    id.timestamp() < cutoff
}

/// List snapshot folders directly under `root`
///
/// A missing root is an empty list.
pub fn scan_snapshots(root: &Path) -> SnapResult<SnapshotScan> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SnapshotScan::default()),
        Err(e) => {
            return Err(SnapError::Io(format!(
                "Failed to read backup root {}: {}",
                root.display(),
                e
            )))
        }
    };

    let mut scan = SnapshotScan::default();

    for entry in entries {
        let entry = entry.map_err(|e| {
            SnapError::Io(format!("Failed to read directory entry: {}", e))
        })?;

        // file_type() does not follow symlinks
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_snapshot_name(name) {
            continue;
        }

        match SnapshotId::parse(name) {
            Ok(id) => scan.snapshots.push(SnapshotInfo {
                id,
                path: entry.path(),
            }),
            Err(_) => scan.unparseable.push(entry.path()),
        }
    }

    scan.snapshots.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(scan)
}

/// Snapshots a prune at `now` would delete, newest first
pub fn expired_snapshots(
    root: &Path,
    retention_days: u32,
    now: NaiveDateTime,
) -> SnapResult<Vec<SnapshotInfo>> {
    let cutoff = retention_cutoff(now, retention_days);
    let scan = scan_snapshots(root)?;
    Ok(scan
        .snapshots
        .into_iter()
        .filter(|s| is_expired(&s.id, cutoff))
        .collect())
}

/// Delete expired snapshot folders under `root` using the local clock
pub fn prune(root: &Path, retention_days: u32) -> PruneReport {
    prune_at(root, retention_days, LocalClock.now())
}

/// Delete snapshot folders whose identifier is strictly older than
/// `now - retention_days`
///
/// Never fails: an unreadable root is logged and yields an empty report, and
/// a folder that cannot be fully deleted does not stop the pass.
pub fn prune_at(root: &Path, retention_days: u32, now: NaiveDateTime) -> PruneReport {
    let cutoff = retention_cutoff(now, retention_days);
    let mut report = PruneReport::default();

    let scan = match scan_snapshots(root) {
        Ok(scan) => scan,
        Err(e) => {
            tracing::warn!(root = %root.display(), error = %e, "skipping prune");
            return report;
        }
    };

    for path in scan.unparseable {
        tracing::warn!(path = %path.display(), "not pruning folder with an invalid date");
        report.skipped.push(path);
    }

    for snapshot in scan.snapshots {
        if !is_expired(&snapshot.id, cutoff) {
            continue;
        }

        tracing::info!(path = %snapshot.path.display(), "pruning old backup");
        match remove_tree(&snapshot.path) {
            None => report.removed.push(snapshot.path),
            Some(error) => {
                tracing::warn!(path = %snapshot.path.display(), error = %error, "prune incomplete");
                report.failed.push(PruneFailure {
                    path: snapshot.path,
                    error,
                });
            }
        }
    }

    report
}

/// Best-effort recursive delete; returns the first error, if any
///
/// Keeps going after individual failures so that as much as possible is
/// reclaimed.
fn remove_tree(path: &Path) -> Option<String> {
    let mut first_error = None;

    for entry in WalkDir::new(path).contents_first(true) {
        let outcome = match entry {
            Ok(entry) if entry.file_type().is_dir() => fs::remove_dir(entry.path()),
            Ok(entry) => fs::remove_file(entry.path()),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
        };

        if let Err(e) = outcome {
            tracing::debug!(error = %e, "failed to delete entry");
            first_error.get_or_insert_with(|| e.to_string());
        }
    }

    first_error
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_snapshot(root: &Path, when: NaiveDateTime) -> PathBuf {
        let path = root.join(SnapshotId::from_datetime(when).to_string());
        fs::create_dir_all(path.join("Documents")).unwrap();
        fs::write(path.join("Documents/report.txt"), "data").unwrap();
        path
    }

    #[test]
    fn test_retention_boundary() {
        let temp = TempDir::new().unwrap();
        let now = at("2025-11-08 09:00:00");

        let boundary = make_snapshot(temp.path(), now - Duration::days(7));
        let older = make_snapshot(temp.path(), now - Duration::days(7) - Duration::minutes(1));
        let recent = make_snapshot(temp.path(), now - Duration::days(1));

        let report = prune_at(temp.path(), 7, now);

        assert!(boundary.exists(), "boundary-equal snapshot must survive");
        assert!(!older.exists());
        assert!(recent.exists());
        assert_eq!(report.removed, vec![older]);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_cutoff_keeps_time_of_day() {
        let cutoff = retention_cutoff(at("2025-11-08 17:45:30"), 30);
        assert_eq!(cutoff, at("2025-10-09 17:45:30"));
    }

    #[test]
    fn test_foreign_entries_are_never_touched() {
        let temp = TempDir::new().unwrap();
        let now = at("2025-11-08 09:00:00");

        let foreign_dir = temp.path().join("MyImportantData");
        fs::create_dir(&foreign_dir).unwrap();
        fs::write(foreign_dir.join("keep.txt"), "keep").unwrap();
        let almost = temp.path().join("2020-1-5_09-00");
        fs::create_dir(&almost).unwrap();
        let shaped_file = temp.path().join("2020-01-05_09-00");
        fs::write(&shaped_file, "a file, not a folder").unwrap();

        let report = prune_at(temp.path(), 1, now);

        assert!(report.is_empty());
        assert!(foreign_dir.join("keep.txt").exists());
        assert!(almost.exists());
        assert!(shaped_file.exists());
    }

    #[test]
    fn test_calendar_invalid_names_are_skipped() {
        let temp = TempDir::new().unwrap();
        let bogus = temp.path().join("2025-13-40_25-99");
        let year_zero = temp.path().join("0000-01-01_00-00");
        fs::create_dir(&bogus).unwrap();
        fs::create_dir(&year_zero).unwrap();

        let report = prune_at(temp.path(), 1, at("2099-01-01 00:00:00"));

        assert!(bogus.exists());
        assert!(year_zero.exists());
        let mut skipped = report.skipped.clone();
        skipped.sort();
        assert_eq!(skipped, vec![year_zero, bogus]);
        assert!(report.removed.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_removal_does_not_stop_the_pass() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let now = at("2025-11-08 09:00:00");
        let stuck = make_snapshot(temp.path(), now - Duration::days(40));
        let other = make_snapshot(temp.path(), now - Duration::days(50));

        let locked = stuck.join("Documents");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions
        if fs::write(locked.join("write-check"), "x").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = prune_at(temp.path(), 30, now);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.removed, vec![other.clone()]);
        assert!(!other.exists());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, stuck);
        assert!(!report.failed[0].error.is_empty());
        assert!(stuck.exists());
    }

    #[test]
    fn test_all_expired_folders_are_removed_in_one_pass() {
        let temp = TempDir::new().unwrap();
        let now = at("2025-11-08 09:00:00");
        for days in [10, 20, 40, 400] {
            make_snapshot(temp.path(), now - Duration::days(days));
        }
        let kept = make_snapshot(temp.path(), now);

        let report = prune_at(temp.path(), 5, now);

        assert_eq!(report.removed.len(), 4);
        let scan = scan_snapshots(temp.path()).unwrap();
        assert_eq!(scan.snapshots.len(), 1);
        assert_eq!(scan.snapshots[0].path, kept);
    }

    #[test]
    fn test_prune_uses_local_clock() {
        let temp = TempDir::new().unwrap();
        let ancient = make_snapshot(temp.path(), at("2000-01-01 00:00:00"));
        let fresh = make_snapshot(temp.path(), LocalClock.now());

        let report = prune(temp.path(), 30);

        assert_eq!(report.removed, vec![ancient]);
        assert!(fresh.is_dir());
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("absent");

        assert!(scan_snapshots(&root).unwrap().snapshots.is_empty());
        assert!(prune_at(&root, 1, at("2025-11-08 09:00:00")).is_empty());
    }

    #[test]
    fn test_scan_is_newest_first() {
        let temp = TempDir::new().unwrap();
        let now = at("2025-11-08 09:00:00");
        make_snapshot(temp.path(), now - Duration::days(2));
        make_snapshot(temp.path(), now);
        make_snapshot(temp.path(), now - Duration::days(1));

        let scan = scan_snapshots(temp.path()).unwrap();
        let names: Vec<String> = scan.snapshots.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(
            names,
            vec!["2025-11-08_09-00", "2025-11-07_09-00", "2025-11-06_09-00"]
        );
    }

    #[test]
    fn test_expired_snapshots_preview_deletes_nothing() {
        let temp = TempDir::new().unwrap();
        let now = at("2025-11-08 09:00:00");
        let old = make_snapshot(temp.path(), now - Duration::days(31));
        make_snapshot(temp.path(), now);

        let expired = expired_snapshots(temp.path(), 30, now).unwrap();

        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].path, old);
        assert!(old.exists());
    }

    #[test]
    fn test_huge_retention_does_not_overflow() {
        let temp = TempDir::new().unwrap();
        make_snapshot(temp.path(), at("1990-01-01 00:00:00"));

        let report = prune_at(temp.path(), u32::MAX, at("2025-11-08 09:00:00"));
        assert!(report.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_snapshot_names_are_not_followed() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("precious.txt"), "x").unwrap();

        let root = temp.path().join("root");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("2001-01-01_00-00")).unwrap();

        let report = prune_at(&root, 1, at("2025-11-08 09:00:00"));

        assert!(report.is_empty());
        assert!(outside.join("precious.txt").exists());
    }
}
