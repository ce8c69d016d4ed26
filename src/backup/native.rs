//! In-process tree mirror
//!
//! Gives platforms without robocopy the same `/MIR /FFT` behavior and the
//! same result codes:
//!
//! | bit | meaning |
//! |-----|---------|
//! | 1   | at least one file copied |
//! | 2   | extraneous destination entries removed |
//! | 4   | file/directory type mismatches replaced |
//! | 8   | some entries could not be copied or removed |
//! | 16  | source or destination root unusable |

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use filetime::FileTime;
use walkdir::WalkDir;

use super::mirror::{Mirror, MirrorReport, RetryPolicy};
use super::result::CycleResult;

/// Modification times closer than this are considered equal
pub const TIMESTAMP_TOLERANCE_NANOS: i128 = 2_000_000_000;

/// Pure-Rust mirror built on `walkdir` and `filetime`
#[derive(Debug, Clone, Default)]
pub struct NativeMirror {
    retry: RetryPolicy,
}

/// Counters and output collected during one run
#[derive(Default)]
struct MirrorRun {
    copied: usize,
    skipped: usize,
    extras: usize,
    mismatches: usize,
    failed: usize,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

impl MirrorRun {
    fn note(&mut self, tag: &str, rel: &Path) {
        self.stdout.push(format!("  {:<14}{}", tag, rel.display()));
    }

    fn fail(&mut self, what: &str, path: &Path, err: impl std::fmt::Display) {
        self.failed += 1;
        self.stderr
            .push(format!("ERROR {} {}: {}", what, path.display(), err));
    }

    fn into_report(mut self) -> MirrorReport {
        let result = CycleResult::from_flags(
            self.copied > 0,
            self.extras > 0,
            self.mismatches > 0,
            self.failed > 0,
        );
        self.stdout.push(format!(
            "Copied: {}  Skipped: {}  Extras: {}  Mismatches: {}  Failed: {}",
            self.copied, self.skipped, self.extras, self.mismatches, self.failed
        ));
        MirrorReport {
            result,
            stdout: self.stdout.join("\n"),
            stderr: self.stderr.join("\n"),
        }
    }
}

impl NativeMirror {
    /// Create a native mirror with the given per-file retry policy
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Copy new and changed entries from `source` into `destination`
    fn copy_tree(&self, source: &Path, destination: &Path, run: &mut MirrorRun) {
        for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    run.fail("reading", &path, e);
                    continue;
                }
            };
            let Ok(rel) = entry.path().strip_prefix(source) else {
                continue;
            };
            let target = destination.join(rel);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                self.sync_dir(&target, rel, run);
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(meta) => self.sync_file(entry.path(), &meta, &target, rel, run),
                    Err(e) => run.fail("reading", entry.path(), e),
                }
            } else {
                run.note("Skipped link", rel);
                run.skipped += 1;
            }
        }
    }

    fn sync_dir(&self, target: &Path, rel: &Path, run: &mut MirrorRun) {
        match fs::symlink_metadata(target) {
            Ok(meta) if meta.is_dir() => return,
            Ok(_) => {
                run.mismatches += 1;
                run.note("*MISMATCH", rel);
                if let Err(e) = fs::remove_file(target) {
                    run.fail("replacing", target, e);
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                run.fail("inspecting", target, e);
                return;
            }
        }

        match fs::create_dir(target) {
            Ok(()) => run.note("New Dir", rel),
            Err(e) => run.fail("creating", target, e),
        }
    }

    fn sync_file(
        &self,
        src: &Path,
        src_meta: &Metadata,
        target: &Path,
        rel: &Path,
        run: &mut MirrorRun,
    ) {
        let tag = match fs::symlink_metadata(target) {
            Ok(meta) if meta.is_dir() => {
                run.mismatches += 1;
                run.note("*MISMATCH", rel);
                if let Err(e) = fs::remove_dir_all(target) {
                    run.fail("replacing", target, e);
                    return;
                }
                "New File"
            }
            Ok(meta) if meta.file_type().is_symlink() => {
                // Never write through a link planted in the destination
                if let Err(e) = fs::remove_file(target) {
                    run.fail("replacing", target, e);
                    return;
                }
                "Newer"
            }
            Ok(meta) if unchanged(src_meta, &meta) => {
                run.skipped += 1;
                return;
            }
            Ok(_) => "Newer",
            Err(e) if e.kind() == io::ErrorKind::NotFound => "New File",
            Err(e) => {
                run.fail("inspecting", target, e);
                return;
            }
        };

        match self.copy_with_retry(src, src_meta, target) {
            Ok(()) => {
                run.copied += 1;
                run.note(tag, rel);
            }
            Err(e) => run.fail("copying", rel, e),
        }
    }

    fn copy_with_retry(&self, src: &Path, src_meta: &Metadata, target: &Path) -> io::Result<()> {
        self.with_retry(src, || copy_preserving_mtime(src, src_meta, target))
    }

    /// Run `op` once plus up to `retries` more times, waiting between tries
    fn with_retry<F>(&self, path: &Path, mut op: F) -> io::Result<()>
    where
        F: FnMut() -> io::Result<()>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.retry.retries => return Err(e),
                Err(e) => {
                    attempt += 1;
                    tracing::debug!(path = %path.display(), error = %e, attempt, "retrying copy");
                    thread::sleep(self.retry.wait());
                }
            }
        }
    }

    /// Remove destination entries with no counterpart of the same kind
    fn purge_extras(&self, source: &Path, destination: &Path, run: &mut MirrorRun) {
        let mut entries = WalkDir::new(destination).min_depth(1).into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    run.fail("reading", &path, e);
                    continue;
                }
            };
            let Ok(rel) = entry.path().strip_prefix(destination) else {
                continue;
            };
            let rel: PathBuf = rel.to_path_buf();
            let is_dir = entry.file_type().is_dir();

            let keep = fs::symlink_metadata(source.join(&rel))
                .map(|meta| meta.is_dir() == is_dir)
                .unwrap_or(false);
            if keep {
                continue;
            }

            let removed = if is_dir {
                entries.skip_current_dir();
                fs::remove_dir_all(entry.path())
            } else {
                fs::remove_file(entry.path())
            };

            match removed {
                Ok(()) => {
                    run.extras += 1;
                    run.note(if is_dir { "*EXTRA Dir" } else { "*EXTRA File" }, &rel);
                }
                Err(e) => run.fail("removing", entry.path(), e),
            }
        }
    }
}

impl Mirror for NativeMirror {
    fn mirror(&self, source: &Path, destination: &Path) -> MirrorReport {
        if let Err(e) = fs::create_dir_all(destination) {
            return MirrorReport::fatal(format!(
                "ERROR creating destination {}: {}",
                destination.display(),
                e
            ));
        }
        if !source.is_dir() {
            return MirrorReport::fatal(format!(
                "ERROR source {} is not a readable directory",
                source.display()
            ));
        }
        if let Err(e) = fs::read_dir(source) {
            return MirrorReport::fatal(format!("ERROR reading {}: {}", source.display(), e));
        }

        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            "running native mirror"
        );

        let mut run = MirrorRun::default();
        run.stdout.push(format!("Source: {}", source.display()));
        run.stdout.push(format!("Dest:   {}", destination.display()));

        self.copy_tree(source, destination, &mut run);
        self.purge_extras(source, destination, &mut run);

        run.into_report()
    }
}

/// Same length and modification times within the tolerance
fn unchanged(src: &Metadata, dst: &Metadata) -> bool {
    if src.len() != dst.len() {
        return false;
    }
    let a = FileTime::from_last_modification_time(src);
    let b = FileTime::from_last_modification_time(dst);
    (nanos(a) - nanos(b)).abs() <= TIMESTAMP_TOLERANCE_NANOS
}

fn nanos(t: FileTime) -> i128 {
    i128::from(t.unix_seconds()) * 1_000_000_000 + i128::from(t.nanoseconds())
}

fn copy_preserving_mtime(src: &Path, src_meta: &Metadata, target: &Path) -> io::Result<()> {
    fs::copy(src, target)?;
    filetime::set_file_mtime(target, FileTime::from_last_modification_time(src_meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("docs/nested")).unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        fs::write(src.join("docs/a.txt"), "alpha").unwrap();
        fs::write(src.join("docs/nested/b.txt"), "beta").unwrap();
        (temp, src, dst)
    }

    fn mirror() -> NativeMirror {
        NativeMirror::new(RetryPolicy {
            retries: 1,
            wait_secs: 0,
        })
    }

    #[test]
    fn test_first_mirror_copies_tree() {
        let (_temp, src, dst) = fixture();

        let report = mirror().mirror(&src, &dst);

        assert_eq!(report.result.code(), 1);
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert_eq!(fs::read_to_string(dst.join("docs/nested/b.txt")).unwrap(), "beta");
        assert!(report.stdout.contains("Copied: 3"));
    }

    #[test]
    fn test_second_mirror_of_unchanged_tree_is_a_no_op() {
        let (_temp, src, dst) = fixture();

        assert!(mirror().mirror(&src, &dst).result.is_success());
        let second = mirror().mirror(&src, &dst);

        assert_eq!(second.result, CycleResult::NO_CHANGE);
    }

    #[test]
    fn test_extraneous_entries_are_removed() {
        let (_temp, src, dst) = fixture();
        mirror().mirror(&src, &dst);

        fs::write(dst.join("stale.txt"), "old").unwrap();
        fs::create_dir_all(dst.join("old_dir/deeper")).unwrap();
        fs::write(dst.join("old_dir/deeper/x.txt"), "x").unwrap();

        let report = mirror().mirror(&src, &dst);

        assert_eq!(report.result.code(), 2);
        assert!(!dst.join("stale.txt").exists());
        assert!(!dst.join("old_dir").exists());
        assert!(dst.join("docs/a.txt").exists());
    }

    #[test]
    fn test_changed_file_is_recopied() {
        let (_temp, src, dst) = fixture();
        mirror().mirror(&src, &dst);

        fs::write(src.join("docs/a.txt"), "alpha, revised").unwrap();
        let report = mirror().mirror(&src, &dst);

        assert_eq!(report.result.code(), 1);
        assert_eq!(
            fs::read_to_string(dst.join("docs/a.txt")).unwrap(),
            "alpha, revised"
        );
    }

    #[test]
    fn test_small_timestamp_drift_is_tolerated() {
        let (_temp, src, dst) = fixture();
        mirror().mirror(&src, &dst);

        let meta = fs::metadata(src.join("top.txt")).unwrap();
        let mtime = FileTime::from_last_modification_time(&meta);
        let drifted = FileTime::from_unix_time(mtime.unix_seconds() + 1, mtime.nanoseconds());
        filetime::set_file_mtime(dst.join("top.txt"), drifted).unwrap();

        assert_eq!(mirror().mirror(&src, &dst).result, CycleResult::NO_CHANGE);
    }

    #[test]
    fn test_type_mismatch_is_replaced() {
        let (_temp, src, dst) = fixture();
        mirror().mirror(&src, &dst);

        fs::remove_file(dst.join("top.txt")).unwrap();
        fs::create_dir(dst.join("top.txt")).unwrap();

        let report = mirror().mirror(&src, &dst);

        assert!(report.result.has_mismatches());
        assert!(report.result.files_copied());
        assert!(dst.join("top.txt").is_file());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let temp = TempDir::new().unwrap();
        let report = mirror().mirror(&temp.path().join("absent"), &temp.path().join("dst"));

        assert_eq!(report.result, CycleResult::FATAL);
        assert!(!report.stderr.is_empty());
    }

    #[test]
    fn test_copy_is_retried_a_bounded_number_of_times() {
        let native = NativeMirror::new(RetryPolicy {
            retries: 2,
            wait_secs: 0,
        });

        let mut attempts = 0;
        let result = native.with_retry(Path::new("locked.txt"), || {
            attempts += 1;
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"))
        });
        assert!(result.is_err());
        assert_eq!(attempts, 3);

        let mut attempts = 0;
        let result = native.with_retry(Path::new("busy.txt"), || {
            attempts += 1;
            if attempts == 1 {
                Err(io::Error::new(io::ErrorKind::Other, "busy"))
            } else {
                Ok(())
            }
        });
        assert!(result.is_ok());
        assert_eq!(attempts, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_reported_as_failed() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, src, dst) = fixture();
        let unreadable = src.join("docs/a.txt");
        fs::set_permissions(&unreadable, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read it anyway
        if fs::read(&unreadable).is_ok() {
            return;
        }

        let report = mirror().mirror(&src, &dst);
        fs::set_permissions(&unreadable, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(report.result.is_fatal());
        assert_eq!(report.result.code() & 8, 8);
        assert!(report.result.files_copied());
        assert!(report.stderr.contains("a.txt"));
        assert!(dst.join("top.txt").is_file());
    }

    #[test]
    fn test_source_is_never_modified() {
        let (_temp, src, dst) = fixture();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("only_in_dst.txt"), "d").unwrap();

        mirror().mirror(&src, &dst);

        assert!(!src.join("only_in_dst.txt").exists());
        assert_eq!(fs::read_to_string(src.join("top.txt")).unwrap(), "top");
    }
}
