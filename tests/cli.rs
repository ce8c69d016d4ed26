use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn snapmirror(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("snapmirror").unwrap();
    cmd.env("SNAPMIRROR_DATA_DIR", data_dir).env_remove("RUST_LOG");
    cmd
}

fn snapshot_dirs(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| snapmirror::backup::is_snapshot_name(n))
        .collect();
    names.sort();
    names
}

#[test]
fn run_creates_dated_snapshot() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    fs::create_dir_all(source.join("docs")).unwrap();
    fs::write(source.join("docs/notes.txt"), "hello").unwrap();
    let root = temp.path().join("backups");

    snapmirror(&temp.path().join("data"))
        .args(["run", "--backend", "native", "--retention-days", "30"])
        .arg("--source")
        .arg(&source)
        .arg("--backup-root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot:"))
        .stdout(predicate::str::contains("Copied: 1"));

    let snapshots = snapshot_dirs(&root);
    assert_eq!(snapshots.len(), 1);
    let copied = root.join(&snapshots[0]).join("docs/notes.txt");
    assert_eq!(fs::read_to_string(copied).unwrap(), "hello");
    assert!(source.join("docs/notes.txt").exists());
}

#[test]
fn run_prunes_old_snapshots_and_keeps_other_folders() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    fs::create_dir(&source).unwrap();
    let root = temp.path().join("backups");
    fs::create_dir_all(root.join("2000-01-01_00-00")).unwrap();
    fs::create_dir_all(root.join("MyImportantData")).unwrap();

    snapmirror(&temp.path().join("data"))
        .args(["headless-run", "--backend", "native", "--retention-days", "7"])
        .arg("--source")
        .arg(&source)
        .arg("--backup-root")
        .arg(&root)
        .assert()
        .success();

    assert!(!root.join("2000-01-01_00-00").exists());
    assert!(root.join("MyImportantData").is_dir());
    assert_eq!(snapshot_dirs(&root).len(), 1);
}

#[test]
fn run_with_missing_source_exits_one() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("backups");

    snapmirror(&temp.path().join("data"))
        .args(["run", "--backend", "native"])
        .arg("--source")
        .arg(temp.path().join("does-not-exist"))
        .arg("--backup-root")
        .arg(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Source path not found"));

    assert!(!root.exists());
}

#[test]
fn run_rejects_zero_retention() {
    let temp = TempDir::new().unwrap();

    snapmirror(temp.path())
        .args(["run", "--retention-days", "0"])
        .assert()
        .failure();
}

#[test]
fn list_shows_only_snapshot_folders() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("backups");
    fs::create_dir_all(root.join("2025-01-01_09-00")).unwrap();
    fs::create_dir_all(root.join("MyImportantData")).unwrap();

    snapmirror(&temp.path().join("data"))
        .arg("list")
        .arg("--backup-root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01-01_09-00"))
        .stdout(predicate::str::contains("MyImportantData").not());
}

#[test]
fn prune_previews_without_force() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("backups");
    fs::create_dir_all(root.join("2000-01-01_00-00")).unwrap();

    snapmirror(&temp.path().join("data"))
        .args(["prune", "--retention-days", "30"])
        .arg("--backup-root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    assert!(root.join("2000-01-01_00-00").is_dir());
}

#[test]
fn prune_force_removes_expired_snapshots() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("backups");
    let recent = chrono::Local::now().format("%Y-%m-%d_%H-%M").to_string();
    fs::create_dir_all(root.join("2000-01-01_00-00")).unwrap();
    fs::create_dir_all(root.join(&recent)).unwrap();
    fs::create_dir_all(root.join("MyImportantData")).unwrap();

    snapmirror(&temp.path().join("data"))
        .args(["prune", "--force", "--retention-days", "30"])
        .arg("--backup-root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 snapshot(s)."));

    assert!(!root.join("2000-01-01_00-00").exists());
    assert!(root.join(&recent).is_dir());
    assert!(root.join("MyImportantData").is_dir());
}

#[test]
fn config_shows_paths() {
    let temp = TempDir::new().unwrap();

    snapmirror(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("Retention days: 30"));
}
