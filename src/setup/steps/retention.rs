//! Retention and backup root setup step
//!
//! Asks how many days of snapshots to keep and where they go.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::paths::expand_home;
use crate::config::Settings;
use crate::error::SnapResult;
use crate::setup::prompt::Prompter;

/// Retention step result
pub struct RetentionSetupResult {
    /// Days a snapshot folder is kept
    pub retention_days: u32,
    /// Directory holding the snapshot folders
    pub backup_root: PathBuf,
}

/// Retention step
pub struct RetentionSetupStep;

impl RetentionSetupStep {
    /// Run the retention step with `defaults` pre-filled
    pub fn run<R: BufRead, W: Write>(
        prompter: &mut Prompter<R, W>,
        defaults: &Settings,
    ) -> SnapResult<RetentionSetupResult> {
        prompter.say("")?;
        prompter.say("Step 1: Retention")?;
        prompter.say("=================")?;

        let retention_days = prompter.u32_with_default(
            "Retention in days (how many days of dated backups to keep)",
            defaults.retention_days,
            1,
        )?;

        let root = prompter.with_default(
            "Backup root folder (should NOT be inside the source)",
            &defaults.backup_root.display().to_string(),
        )?;

        Ok(RetentionSetupResult {
            retention_days,
            backup_root: expand_home(&root),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use directories::BaseDirs;
    use std::io::Cursor;

    fn run(script: &str) -> RetentionSetupResult {
        let mut prompter = Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        RetentionSetupStep::run(&mut prompter, &Settings::default()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let result = run("\n\n");
        assert_eq!(result.retention_days, 30);
        assert_eq!(result.backup_root, Settings::default().backup_root);
    }

    #[test]
    fn test_home_is_expanded_in_backup_root() {
        let Some(dirs) = BaseDirs::new() else {
            return;
        };

        let result = run("7\n~/Backups\n");

        assert_eq!(result.retention_days, 7);
        assert_eq!(result.backup_root, dirs.home_dir().join("Backups"));
    }
}
