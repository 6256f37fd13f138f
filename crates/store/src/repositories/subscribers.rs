//! Subscriber repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use dripcast_common::AppResult;

use crate::client::RestClient;
use crate::records::Subscriber;
use crate::traits::SubscriberStore;

const TABLE: &str = "profiles";

/// Repository for subscriber operations on the hosted store.
#[derive(Debug, Clone)]
pub struct RestSubscriberRepository {
    client: RestClient,
}

#[derive(Deserialize)]
struct IdRow {
    subscription_id: String,
}

impl RestSubscriberRepository {
    /// Create a new subscriber repository.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriberStore for RestSubscriberRepository {
    async fn register(&self, subscription_id: &str, created_at: DateTime<Utc>) -> AppResult<()> {
        let row = Subscriber {
            subscription_id: subscription_id.to_string(),
            created_at,
        };
        // Conflicts keep the existing row, so created_at is never refreshed.
        self.client
            .upsert_ignore_duplicates(TABLE, "subscription_id", &row)
            .await
    }

    async fn list_ids(&self) -> AppResult<Vec<String>> {
        let rows: Vec<IdRow> = self
            .client
            .select(TABLE, &[("select", "subscription_id".to_string())])
            .await?;
        Ok(rows.into_iter().map(|r| r.subscription_id).collect())
    }

    async fn created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Subscriber>> {
        self.client
            .select(
                TABLE,
                &[
                    ("select", "subscription_id,created_at".to_string()),
                    ("created_at", format!("gte.{}", start.to_rfc3339())),
                    ("created_at", format!("lt.{}", end.to_rfc3339())),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await
    }

    async fn created_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Subscriber>> {
        self.client
            .select(
                TABLE,
                &[
                    ("select", "subscription_id,created_at".to_string()),
                    ("created_at", format!("gte.{}", since.to_rfc3339())),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<Subscriber>> {
        self.client
            .select(
                TABLE,
                &[
                    ("select", "subscription_id,created_at".to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        self.client
            .count(
                TABLE,
                &[
                    ("select", "subscription_id".to_string()),
                    ("created_at", format!("gte.{}", since.to_rfc3339())),
                ],
            )
            .await
    }

    async fn count_all(&self) -> AppResult<u64> {
        self.client
            .count(TABLE, &[("select", "subscription_id".to_string())])
            .await
    }
}
