//! Row types for the hosted store tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A push subscriber (`profiles` table).
///
/// Keyed by the opaque subscription identifier issued by the push provider.
/// `created_at` is set at first registration and never refreshed: the upsert
/// uses ignore-duplicates semantics, so step-window eligibility stays
/// anchored to the original signup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Opaque identifier issued by the push delivery provider.
    pub subscription_id: String,
    /// First registration time.
    pub created_at: DateTime<Utc>,
}

/// A delivered notification, one row per recipient
/// (`user_notifications` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Recipient subscription id.
    pub subscription_id: String,
    /// Delivered title.
    pub title: String,
    /// Delivered body.
    pub message: String,
    /// Deep link opened when the recipient taps the notification.
    pub url: Option<String>,
    /// Drip offset in hours; `None` for administrator broadcasts.
    pub step_hours: Option<i32>,
    /// Send time.
    pub sent_at: DateTime<Utc>,
    /// Read time, `None` until the recipient opens the notification.
    pub read_at: Option<DateTime<Utc>>,
}

/// A `user_notifications` row to insert (the store assigns the id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    /// Recipient subscription id.
    pub subscription_id: String,
    /// Title to record.
    pub title: String,
    /// Body to record.
    pub message: String,
    /// Optional deep link.
    pub url: Option<String>,
    /// Drip offset in hours; `None` for broadcasts.
    pub step_hours: Option<i32>,
    /// Send time, shared across all records of one send.
    pub sent_at: DateTime<Utc>,
}

/// Admin-facing audit row, one per broadcast regardless of recipient count
/// (`notifications` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRecord {
    /// Broadcast title.
    pub title: String,
    /// Broadcast body.
    pub message: String,
    /// Send time.
    pub sent_at: DateTime<Utc>,
}

/// The identity of a history row for duplicate detection during migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryKey {
    /// Recipient subscription id.
    pub subscription_id: String,
    /// Recorded title.
    pub title: String,
    /// Recorded body.
    pub message: String,
    /// Recorded send time.
    pub sent_at: DateTime<Utc>,
}

impl HistoryKey {
    /// The key a (broadcast, subscriber) pair would occupy in history.
    #[must_use]
    pub fn for_broadcast(broadcast: &BroadcastRecord, subscription_id: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            title: broadcast.title.clone(),
            message: broadcast.message.clone(),
            sent_at: broadcast.sent_at,
        }
    }

}
