//! One-shot backfill of the broadcast audit log into per-user history.
//!
//! Before per-user history existed, broadcasts were only recorded in the
//! admin audit table. This utility produces one history row per
//! (broadcast, subscriber) pair for every pair that is still missing, so it
//! is safe to re-run after a partial success. It is meant for supervised,
//! sequential execution; concurrent runs can still race the duplicate check.

use std::collections::HashSet;

use tracing::warn;

use dripcast_common::AppResult;
use dripcast_store::{
    BroadcastStoreRef, HistoryKey, HistoryStoreRef, NewHistoryRecord, SubscriberStoreRef,
};

use crate::INSERT_BATCH_SIZE;

/// Result of one migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Broadcasts found in the audit table.
    pub notifications_count: usize,
    /// Subscribers the backfill fanned out to.
    pub users_count: usize,
    /// (broadcast, subscriber) pairs still missing a history row.
    pub total_records: usize,
    /// Rows actually inserted.
    pub inserted_count: usize,
    /// Human-readable summary.
    pub message: String,
}

/// Backfill service over the three stores.
#[derive(Clone)]
pub struct MigrationService {
    subscribers: SubscriberStoreRef,
    history: HistoryStoreRef,
    broadcasts: BroadcastStoreRef,
}

impl MigrationService {
    /// Create a new migration service.
    #[must_use]
    pub fn new(
        subscribers: SubscriberStoreRef,
        history: HistoryStoreRef,
        broadcasts: BroadcastStoreRef,
    ) -> Self {
        Self {
            subscribers,
            history,
            broadcasts,
        }
    }

    /// Run the backfill once.
    pub async fn run(&self) -> AppResult<MigrationReport> {
        let broadcasts = self.broadcasts.list_oldest_first().await?;
        if broadcasts.is_empty() {
            return Ok(MigrationReport {
                notifications_count: 0,
                users_count: 0,
                total_records: 0,
                inserted_count: 0,
                message: "nothing to migrate: the broadcast table is empty".to_string(),
            });
        }

        let subscriber_ids = self.subscribers.list_ids().await?;
        if subscriber_ids.is_empty() {
            return Ok(MigrationReport {
                notifications_count: broadcasts.len(),
                users_count: 0,
                total_records: 0,
                inserted_count: 0,
                message: "nothing to migrate: no subscribers are registered".to_string(),
            });
        }

        // Existing history is fetched once up front; a failure here skips
        // duplicate detection rather than aborting the run.
        let existing: HashSet<HistoryKey> = match self.history.all_keys().await {
            Ok(keys) => keys.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "Could not load existing history, skipping duplicate check");
                HashSet::new()
            }
        };

        let mut rows = Vec::new();
        for broadcast in &broadcasts {
            for subscription_id in &subscriber_ids {
                if existing.contains(&HistoryKey::for_broadcast(broadcast, subscription_id)) {
                    continue;
                }
                rows.push(NewHistoryRecord {
                    subscription_id: subscription_id.clone(),
                    title: broadcast.title.clone(),
                    message: broadcast.message.clone(),
                    url: None,
                    step_hours: None,
                    sent_at: broadcast.sent_at,
                });
            }
        }

        let mut inserted_count = 0;
        for (batch_index, chunk) in rows.chunks(INSERT_BATCH_SIZE).enumerate() {
            match self.history.insert_batch(chunk).await {
                Ok(()) => inserted_count += chunk.len(),
                Err(e) => {
                    warn!(batch = batch_index + 1, error = %e, "Migration batch failed");
                }
            }
        }

        let message = if rows.is_empty() {
            "all broadcasts are already migrated, nothing inserted".to_string()
        } else if inserted_count == 0 {
            "migration ran but no rows could be inserted, check the server logs".to_string()
        } else if inserted_count < rows.len() {
            format!(
                "migration partially succeeded: {inserted_count} of {} rows inserted",
                rows.len()
            )
        } else {
            "migration completed".to_string()
        };
        tracing::info!(
            notifications = broadcasts.len(),
            users = subscriber_ids.len(),
            inserted = inserted_count,
            "Migration run finished"
        );

        Ok(MigrationReport {
            notifications_count: broadcasts.len(),
            users_count: subscriber_ids.len(),
            total_records: rows.len(),
            inserted_count,
            message,
        })
    }
}
