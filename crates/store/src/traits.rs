//! Collaborator seams for the hosted store and auth provider.
//!
//! Core services depend on these traits rather than on the REST
//! implementations, so tests can inject in-memory doubles and the wiring in
//! the server binary stays the only place that knows about the transport.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use dripcast_common::AppResult;

use crate::records::{BroadcastRecord, HistoryKey, HistoryRecord, NewHistoryRecord, Subscriber};

/// Subscriber table operations.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Insert a subscriber keyed by subscription id. A conflicting key is
    /// ignored, leaving the existing row (and its `created_at`) untouched.
    async fn register(&self, subscription_id: &str, created_at: DateTime<Utc>) -> AppResult<()>;

    /// All subscription ids, for broadcast fan-out.
    async fn list_ids(&self) -> AppResult<Vec<String>>;

    /// Subscribers with `start <= created_at < end`.
    async fn created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Subscriber>>;

    /// Subscribers with `created_at >= since`, oldest first.
    async fn created_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Subscriber>>;

    /// Most recently registered subscribers, newest first.
    async fn recent(&self, limit: u64) -> AppResult<Vec<Subscriber>>;

    /// Count of subscribers with `created_at >= since`.
    async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<u64>;

    /// Total subscriber count.
    async fn count_all(&self) -> AppResult<u64>;
}

/// Shared handle to a [`SubscriberStore`].
pub type SubscriberStoreRef = Arc<dyn SubscriberStore>;

/// Per-recipient notification history operations.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert one batch of history rows in a single request.
    ///
    /// Callers are responsible for chunking; each call is one store request.
    async fn insert_batch(&self, rows: &[NewHistoryRecord]) -> AppResult<()>;

    /// History for one subscriber, newest first.
    async fn for_subscriber(
        &self,
        subscription_id: &str,
        limit: u64,
    ) -> AppResult<Vec<HistoryRecord>>;

    /// Number of unread records for one subscriber.
    async fn unread_count(&self, subscription_id: &str) -> AppResult<u64>;

    /// Set `read_at` on one record, only if it belongs to the given
    /// subscriber. Returns the updated record, or `None` when no row
    /// matched both ids.
    async fn mark_read(
        &self,
        subscription_id: &str,
        notification_id: i64,
        read_at: DateTime<Utc>,
    ) -> AppResult<Option<HistoryRecord>>;

    /// Of the given candidates, the subscription ids that already have a
    /// record for this step offset.
    async fn step_recipients(
        &self,
        step_hours: i32,
        subscription_ids: &[String],
    ) -> AppResult<Vec<String>>;

    /// Identity keys of every history row, for migration duplicate checks.
    async fn all_keys(&self) -> AppResult<Vec<HistoryKey>>;
}

/// Shared handle to a [`HistoryStore`].
pub type HistoryStoreRef = Arc<dyn HistoryStore>;

/// Admin broadcast audit table operations.
#[async_trait]
pub trait BroadcastStore: Send + Sync {
    /// Append one audit row.
    async fn append(&self, record: &BroadcastRecord) -> AppResult<()>;

    /// All broadcasts, oldest first.
    async fn list_oldest_first(&self) -> AppResult<Vec<BroadcastRecord>>;

    /// Broadcasts with `sent_at >= since`, oldest first.
    async fn sent_since(&self, since: DateTime<Utc>) -> AppResult<Vec<BroadcastRecord>>;
}

/// Shared handle to a [`BroadcastStore`].
pub type BroadcastStoreRef = Arc<dyn BroadcastStore>;

/// Verification of administrator credentials against the hosted auth
/// provider. No sessions or credentials are managed locally.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Check that the bearer token identifies a signed-in administrator.
    async fn verify_admin(&self, bearer_token: &str) -> AppResult<()>;
}

/// Shared handle to an [`AuthVerifier`].
pub type AuthVerifierRef = Arc<dyn AuthVerifier>;
