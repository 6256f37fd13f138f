//! Admin broadcast audit repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use dripcast_common::AppResult;

use crate::client::RestClient;
use crate::records::BroadcastRecord;
use crate::traits::BroadcastStore;

const TABLE: &str = "notifications";

/// Repository for the admin-facing broadcast audit table.
#[derive(Debug, Clone)]
pub struct RestBroadcastRepository {
    client: RestClient,
}

impl RestBroadcastRepository {
    /// Create a new broadcast repository.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BroadcastStore for RestBroadcastRepository {
    async fn append(&self, record: &BroadcastRecord) -> AppResult<()> {
        self.client.insert(TABLE, record).await
    }

    async fn list_oldest_first(&self) -> AppResult<Vec<BroadcastRecord>> {
        self.client
            .select(
                TABLE,
                &[
                    ("select", "title,message,sent_at".to_string()),
                    ("order", "sent_at.asc".to_string()),
                ],
            )
            .await
    }

    async fn sent_since(&self, since: DateTime<Utc>) -> AppResult<Vec<BroadcastRecord>> {
        self.client
            .select(
                TABLE,
                &[
                    ("select", "title,message,sent_at".to_string()),
                    ("sent_at", format!("gte.{}", since.to_rfc3339())),
                    ("order", "sent_at.asc".to_string()),
                ],
            )
            .await
    }
}
