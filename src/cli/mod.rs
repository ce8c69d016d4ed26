//! CLI command handlers
//!
//! Each submodule parses one group of commands and prints its results.

pub mod run;
pub mod schedule;
pub mod snapshot;

pub use run::{handle_run, RunArgs};
pub use schedule::{handle_schedule_command, ScheduleCommands};
pub use snapshot::{handle_list, handle_prune, SnapshotArgs};
