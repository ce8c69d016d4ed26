//! Setup wizard orchestration
//!
//! Collects retention, backup root and schedule, saves them, then offers a
//! test backup, task registration and task removal. Nothing runs unless the
//! user confirms it.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::backup::{exit_status, BackupCycle, Mirror, SnapshotNamer};
use crate::config::{resolve_source, Settings, SnapPaths};
use crate::error::SnapResult;
use crate::schedule::{SchedulerRegistrar, StopOutcome};

use super::prompt::Prompter;
use super::steps::{RetentionSetupStep, ScheduleSetupStep};

/// Result of running the setup wizard
pub struct SetupResult {
    /// Settings as saved
    pub settings: Settings,
    /// Exit status of the test backup, if one was run
    pub test_run: Option<i32>,
    /// Whether the scheduled task was registered
    pub task_installed: bool,
    /// How the task was stopped, if it was
    pub task_stopped: Option<StopOutcome>,
}

/// The interactive configurator
pub struct SetupWizard<'a> {
    paths: SnapPaths,
    mirror: &'a dyn Mirror,
    namer: &'a SnapshotNamer,
    registrar: &'a dyn SchedulerRegistrar,
    program: PathBuf,
}

impl<'a> SetupWizard<'a> {
    /// Create a new setup wizard
    ///
    /// `program` is the executable the scheduled task will launch.
    pub fn new(
        paths: SnapPaths,
        mirror: &'a dyn Mirror,
        namer: &'a SnapshotNamer,
        registrar: &'a dyn SchedulerRegistrar,
        program: PathBuf,
    ) -> Self {
        Self {
            paths,
            mirror,
            namer,
            registrar,
            program,
        }
    }

    /// Run the interactive setup wizard
    pub fn run<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
        settings: &mut Settings,
    ) -> SnapResult<SetupResult> {
        prompter.say("")?;
        prompter.say("===========================================")?;
        prompter.say("  snapmirror - Versioned Backup Setup")?;
        prompter.say("===========================================")?;
        prompter.say("Backups copy the source into a new dated folder on each run.")?;
        prompter.say("Only dated folders created by snapmirror are ever pruned.")?;

        let retention = RetentionSetupStep::run(prompter, settings)?;
        let schedule = ScheduleSetupStep::run(prompter, &settings.schedule)?;

        settings.retention_days = retention.retention_days;
        settings.backup_root = retention.backup_root;
        settings.schedule = schedule;
        settings.save(&self.paths)?;
        prompter.say(&format!(
            "Settings saved to {}",
            self.paths.settings_file().display()
        ))?;

        let mut result = SetupResult {
            settings: settings.clone(),
            test_run: None,
            task_installed: false,
            task_stopped: None,
        };

        if prompter.yes_no("Run a one-time backup now?", true)? {
            result.test_run = Some(self.test_run(prompter, settings)?);
        }

        if prompter.yes_no(
            "Install or update the Scheduled Task with these settings?",
            true,
        )? {
            result.task_installed = self.install(prompter, settings)?;
        }

        if prompter.yes_no(
            "Do you want to stop (disable/delete) the Scheduled Task now?",
            false,
        )? {
            match self.registrar.stop(&settings.schedule.task_name) {
                Ok(outcome) => {
                    let verb = match outcome {
                        StopOutcome::Disabled => "disabled",
                        StopOutcome::Deleted => "deleted",
                    };
                    prompter.say(&format!("Task '{}' {}.", settings.schedule.task_name, verb))?;
                    result.task_stopped = Some(outcome);
                }
                Err(e) => prompter.say(&format!("Could not stop task: {}", e))?,
            }
        }

        prompter.say("")?;
        prompter.say("Done.")?;
        Ok(result)
    }

    fn test_run<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
        settings: &Settings,
    ) -> SnapResult<i32> {
        let source = match resolve_source(settings.source.clone()) {
            Ok(source) => source,
            Err(e) => {
                prompter.say(&format!("Cannot run a backup: {}", e))?;
                return Ok(e.exit_code());
            }
        };

        let cycle = BackupCycle::new(self.mirror, self.namer);
        let result = cycle.run_once(&source, &settings.backup_root, settings.retention_days);
        match &result {
            Ok(outcome) => {
                for line in outcome.summary_lines() {
                    prompter.say(&line)?;
                }
            }
            Err(e) => prompter.say(&format!("Backup could not start: {}", e))?,
        }

        let code = exit_status(&result);

        if code == 0 {
            prompter.say("Backup finished successfully.")?;
        } else {
            prompter.say(&format!(
                "Backup failed (exit code {}). Fix issues and try again.",
                code
            ))?;
        }
        Ok(code)
    }

    fn install<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
        settings: &Settings,
    ) -> SnapResult<bool> {
        let spec = settings.schedule.to_spec();
        let invocation = settings.headless_invocation(self.program.clone());

        match self.registrar.register(&spec, &invocation) {
            Ok(()) => {
                prompter.say(&format!("Scheduled Task '{}' registered.", spec.task_name))?;
                Ok(true)
            }
            Err(e) => {
                prompter.say(&format!(
                    "Task registration failed: {}. You may need an elevated shell.",
                    e
                ))?;
                Ok(false)
            }
        }
    }
}
