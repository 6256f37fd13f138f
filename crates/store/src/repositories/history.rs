//! Notification history repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dripcast_common::AppResult;

use crate::client::{RestClient, in_filter};
use crate::records::{HistoryKey, HistoryRecord, NewHistoryRecord};
use crate::traits::HistoryStore;

const TABLE: &str = "user_notifications";

/// Repository for per-recipient notification history on the hosted store.
#[derive(Debug, Clone)]
pub struct RestHistoryRepository {
    client: RestClient,
}

#[derive(Deserialize)]
struct IdRow {
    subscription_id: String,
}

#[derive(Serialize)]
struct ReadPatch {
    read_at: DateTime<Utc>,
}

impl RestHistoryRepository {
    /// Create a new history repository.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HistoryStore for RestHistoryRepository {
    async fn insert_batch(&self, rows: &[NewHistoryRecord]) -> AppResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.client.insert(TABLE, rows).await
    }

    async fn for_subscriber(
        &self,
        subscription_id: &str,
        limit: u64,
    ) -> AppResult<Vec<HistoryRecord>> {
        self.client
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("subscription_id", format!("eq.{subscription_id}")),
                    ("order", "sent_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }

    async fn unread_count(&self, subscription_id: &str) -> AppResult<u64> {
        self.client
            .count(
                TABLE,
                &[
                    ("select", "id".to_string()),
                    ("subscription_id", format!("eq.{subscription_id}")),
                    ("read_at", "is.null".to_string()),
                ],
            )
            .await
    }

    async fn mark_read(
        &self,
        subscription_id: &str,
        notification_id: i64,
        read_at: DateTime<Utc>,
    ) -> AppResult<Option<HistoryRecord>> {
        // Both filters must match, so a subscriber can only touch their own
        // records; a mismatch updates nothing and returns no rows.
        let updated: Vec<HistoryRecord> = self
            .client
            .update_returning(
                TABLE,
                &[
                    ("id", format!("eq.{notification_id}")),
                    ("subscription_id", format!("eq.{subscription_id}")),
                ],
                &ReadPatch { read_at },
            )
            .await?;
        Ok(updated.into_iter().next())
    }

    async fn step_recipients(
        &self,
        step_hours: i32,
        subscription_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if subscription_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<IdRow> = self
            .client
            .select(
                TABLE,
                &[
                    ("select", "subscription_id".to_string()),
                    ("step_hours", format!("eq.{step_hours}")),
                    ("subscription_id", in_filter(subscription_ids)),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.subscription_id).collect())
    }

    async fn all_keys(&self) -> AppResult<Vec<HistoryKey>> {
        self.client
            .select(
                TABLE,
                &[("select", "subscription_id,title,message,sent_at".to_string())],
            )
            .await
    }
}
