//! Scheduled task setup step
//!
//! Collects the task name and how often it runs.

use std::io::{BufRead, Write};

use crate::config::ScheduleSettings;
use crate::error::SnapResult;
use crate::schedule::ScheduleKind;
use crate::setup::prompt::Prompter;

/// Schedule step
pub struct ScheduleSetupStep;

impl ScheduleSetupStep {
    /// Run the schedule step with `defaults` pre-filled
    pub fn run<R: BufRead, W: Write>(
        prompter: &mut Prompter<R, W>,
        defaults: &ScheduleSettings,
    ) -> SnapResult<ScheduleSettings> {
        prompter.say("")?;
        prompter.say("Step 2: Schedule")?;
        prompter.say("================")?;

        let task_name = prompter.with_default("Scheduled Task name", &defaults.task_name)?;

        prompter.say("")?;
        prompter.say("Schedule type options supported here:")?;
        prompter.say("  DAILY  - run once each day at the time you choose")?;
        prompter.say("  HOURLY - run every N hours")?;
        prompter.say("  MINUTE - run every N minutes")?;

        let kind = loop {
            let answer = prompter.with_default(
                "Choose schedule type (DAILY|HOURLY|MINUTE)",
                &defaults.kind.to_string(),
            )?;
            match answer.parse::<ScheduleKind>() {
                Ok(kind) => break kind,
                Err(_) => prompter.say("Type DAILY, HOURLY, or MINUTE.")?,
            }
        };

        let (start_time, modifier) = match kind {
            ScheduleKind::Daily => {
                let start = prompter.time_hhmm("Start time (HH:MM) for daily run", &defaults.start_time)?;
                (start, 1)
            }
            ScheduleKind::Hourly => {
                let every = prompter.u32_with_default("Every how many hours?", defaults.modifier, 1)?;
                let start = prompter.time_hhmm("Start time (HH:MM) for first run", &defaults.start_time)?;
                (start, every)
            }
            ScheduleKind::Minute => {
                let every = prompter.u32_with_default("Every how many minutes?", defaults.modifier, 1)?;
                let start = prompter.time_hhmm("Start time (HH:MM) to align first run", &defaults.start_time)?;
                (start, every)
            }
        };

        Ok(ScheduleSettings {
            task_name,
            kind,
            start_time,
            modifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(script: &str) -> ScheduleSettings {
        let mut prompter = Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        ScheduleSetupStep::run(&mut prompter, &ScheduleSettings::default()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let schedule = run("\n\n\n");
        assert_eq!(schedule, ScheduleSettings::default());
    }

    #[test]
    fn test_hourly_asks_for_modifier() {
        let schedule = run("Nightly\nweekly\nhourly\n6\n07:15\n");
        assert_eq!(schedule.task_name, "Nightly");
        assert_eq!(schedule.kind, ScheduleKind::Hourly);
        assert_eq!(schedule.modifier, 6);
        assert_eq!(schedule.start_time, "07:15");
    }
}
