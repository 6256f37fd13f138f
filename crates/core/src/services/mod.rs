//! Business logic services.

pub mod broadcast;
pub mod history;
pub mod migration;
pub mod stats;
pub mod steps;
pub mod subscriber;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcast::{BroadcastOutcome, BroadcastService};
pub use history::HistoryService;
pub use migration::{MigrationReport, MigrationService};
pub use stats::{StatsReport, StatsService};
pub use steps::{StepMessage, StepOutcome, StepRunReport, StepScheduler, step_sequence};
pub use subscriber::SubscriberService;
