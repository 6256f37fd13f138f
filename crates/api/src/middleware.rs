//! API middleware and shared state.

use dripcast_common::config::SchedulerConfig;
use dripcast_core::{
    BroadcastService, HistoryService, MigrationService, StatsService, StepScheduler,
    SubscriberService,
};
use dripcast_store::AuthVerifierRef;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Registration and recent-signup listing.
    pub subscriber_service: SubscriberService,
    /// Immediate announcements to all subscribers.
    pub broadcast_service: BroadcastService,
    /// The drip step scheduler.
    pub step_scheduler: StepScheduler,
    /// Dashboard aggregation.
    pub stats_service: StatsService,
    /// Per-user history and read state.
    pub history_service: HistoryService,
    /// One-shot audit-log backfill.
    pub migration_service: MigrationService,
    /// Verifies admin bearer tokens against the hosted auth provider.
    pub auth: AuthVerifierRef,
    /// Credentials accepted by the scheduler trigger endpoint.
    pub scheduler: SchedulerConfig,
}
