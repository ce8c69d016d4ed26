//! Setup wizard steps
//!
//! Individual steps in the setup wizard flow.

pub mod retention;
pub mod schedule;

pub use retention::RetentionSetupStep;
pub use schedule::ScheduleSetupStep;
