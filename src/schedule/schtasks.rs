//! Windows Task Scheduler registrar
//!
//! Wraps `schtasks.exe`. Registering with `/RL HIGHEST` may need an
//! elevated shell.

use super::{
    validate_time_hhmm, HeadlessInvocation, ScheduleSpec, SchedulerRegistrar, StopOutcome,
};
use crate::error::{SnapError, SnapResult};
use crate::process::{CommandSpec, ProcessOutput, ProcessRunner};

/// `schtasks` driven through a [`ProcessRunner`]
pub struct Schtasks<R> {
    runner: R,
}

impl<R: ProcessRunner> Schtasks<R> {
    /// Create a registrar using `runner`
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// The `schtasks /Create` command for a schedule
    pub fn create_command(&self, spec: &ScheduleSpec, invocation: &HeadlessInvocation) -> CommandSpec {
        let mut cmd = CommandSpec::new("schtasks").args([
            "/Create".to_string(),
            "/TN".to_string(),
            spec.task_name.clone(),
            "/SC".to_string(),
            spec.kind.to_string(),
            "/TR".to_string(),
            invocation.command_line(),
            "/RL".to_string(),
            "HIGHEST".to_string(),
            "/F".to_string(),
        ]);

        if validate_time_hhmm(&spec.start_time) {
            cmd = cmd.arg("/ST").arg(spec.start_time.clone());
        }

        if spec.kind.uses_modifier() && spec.modifier >= 1 {
            cmd = cmd.arg("/MO").arg(spec.modifier.to_string());
        }

        cmd
    }

    fn run(&self, command: &CommandSpec) -> SnapResult<ProcessOutput> {
        self.runner
            .run(command)
            .map_err(|e| SnapError::Process(format!("Failed to launch schtasks: {}", e)))
    }
}

impl<R: ProcessRunner> SchedulerRegistrar for Schtasks<R> {
    fn register(&self, spec: &ScheduleSpec, invocation: &HeadlessInvocation) -> SnapResult<()> {
        let command = self.create_command(spec, invocation);
        tracing::info!(command = %command, "registering scheduled task");

        let output = self.run(&command)?;
        if output.success() {
            tracing::info!("{}", output.stdout.trim());
            Ok(())
        } else {
            Err(SnapError::Schedule(output.stderr.trim().to_string()))
        }
    }

    fn stop(&self, task_name: &str) -> SnapResult<StopOutcome> {
        let disable = CommandSpec::new("schtasks").args(["/Change", "/TN", task_name, "/Disable"]);
        if self.run(&disable)?.success() {
            return Ok(StopOutcome::Disabled);
        }

        let delete = CommandSpec::new("schtasks").args(["/Delete", "/TN", task_name, "/F"]);
        if self.run(&delete)?.success() {
            return Ok(StopOutcome::Deleted);
        }

        Err(SnapError::Schedule(format!(
            "No task named '{}' found to stop or delete",
            task_name
        )))
    }
}
