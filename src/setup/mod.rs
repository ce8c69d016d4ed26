//! Interactive configurator
//!
//! Walks a user through retention, backup root and schedule, then
//! optionally runs a test backup and registers the scheduled task.

pub mod prompt;
pub mod steps;
pub mod wizard;

pub use prompt::Prompter;
pub use wizard::{SetupResult, SetupWizard};
