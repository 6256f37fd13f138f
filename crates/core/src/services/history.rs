//! Per-subscriber notification history.

use chrono::{DateTime, Utc};

use dripcast_common::{AppError, AppResult};
use dripcast_store::{HistoryRecord, HistoryStoreRef};

/// Maximum history rows returned per listing.
pub const HISTORY_LIMIT: u64 = 50;

/// Service reading and mutating a subscriber's notification history.
#[derive(Clone)]
pub struct HistoryService {
    history: HistoryStoreRef,
}

impl HistoryService {
    /// Create a new history service.
    #[must_use]
    pub fn new(history: HistoryStoreRef) -> Self {
        Self { history }
    }

    /// A subscriber's history, newest first, with their unread count.
    pub async fn list(&self, subscription_id: &str) -> AppResult<(Vec<HistoryRecord>, u64)> {
        let subscription_id = require_id(subscription_id)?;
        let records = self.history.for_subscriber(subscription_id, HISTORY_LIMIT).await?;
        let unread = self.history.unread_count(subscription_id).await?;
        Ok((records, unread))
    }

    /// Mark one notification as read.
    ///
    /// The update is scoped to the owning subscriber: a notification id
    /// belonging to someone else is untouched and reported as `None`.
    pub async fn mark_read(
        &self,
        subscription_id: &str,
        notification_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Option<HistoryRecord>> {
        let subscription_id = require_id(subscription_id)?;
        self.history.mark_read(subscription_id, notification_id, now).await
    }
}

fn require_id(subscription_id: &str) -> AppResult<&str> {
    let trimmed = subscription_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "subscription_id must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
