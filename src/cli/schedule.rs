//! Scheduled task commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::error::SnapResult;
use crate::schedule::{SchedulerRegistrar, StopOutcome};

/// Scheduled task subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ScheduleCommands {
    /// Create or update the scheduled task from saved settings
    Install,

    /// Disable the scheduled task, deleting it if disabling fails
    Stop,

    /// Show the command line the scheduled task would run
    Show,
}

/// Handle a schedule command
///
/// `program` is the executable the task will launch.
pub fn handle_schedule_command(
    registrar: &dyn SchedulerRegistrar,
    settings: &Settings,
    program: PathBuf,
    cmd: ScheduleCommands,
) -> SnapResult<()> {
    let schedule = &settings.schedule;

    match cmd {
        ScheduleCommands::Install => {
            settings.validate()?;
            let spec = schedule.to_spec();
            let invocation = settings.headless_invocation(program);
            registrar.register(&spec, &invocation)?;
            println!("Scheduled Task '{}' registered.", spec.task_name);
            println!("  Runs: {}", invocation.command_line());
        }

        ScheduleCommands::Stop => {
            let outcome = registrar.stop(&schedule.task_name)?;
            let verb = match outcome {
                StopOutcome::Disabled => "disabled",
                StopOutcome::Deleted => "deleted",
            };
            println!("Task '{}' {}.", schedule.task_name, verb);
        }

        ScheduleCommands::Show => {
            println!("Task name:  {}", schedule.task_name);
            println!("Schedule:   {}", schedule.kind);
            println!("Start time: {}", schedule.start_time);
            if schedule.kind.uses_modifier() {
                println!("Every:      {}", schedule.modifier);
            }
            println!(
                "Command:    {}",
                settings.headless_invocation(program).command_line()
            );
        }
    }

    Ok(())
}
