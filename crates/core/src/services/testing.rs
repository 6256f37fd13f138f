//! In-memory doubles for the external collaborators, used by service tests.

#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use dripcast_common::{AppError, AppResult};
use dripcast_push::{PushAudience, PushMessage, PushProvider, PushReceipt};
use dripcast_store::{
    BroadcastRecord, BroadcastStore, HistoryKey, HistoryRecord, HistoryStore, NewHistoryRecord,
    Subscriber, SubscriberStore,
};

/// Subscriber store over a vector, with upsert-ignore semantics.
#[derive(Default)]
pub struct MockSubscriberStore {
    pub subscribers: Mutex<Vec<Subscriber>>,
    pub fail_counts: bool,
    pub fail_lists: bool,
}

impl MockSubscriberStore {
    pub fn with_subscribers(subscribers: Vec<Subscriber>) -> Self {
        Self {
            subscribers: Mutex::new(subscribers),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SubscriberStore for MockSubscriberStore {
    async fn register(&self, subscription_id: &str, created_at: DateTime<Utc>) -> AppResult<()> {
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers.iter().any(|s| s.subscription_id == subscription_id) {
            // ignore-duplicates: the existing row wins
            return Ok(());
        }
        subscribers.push(Subscriber {
            subscription_id: subscription_id.to_string(),
            created_at,
        });
        Ok(())
    }

    async fn list_ids(&self) -> AppResult<Vec<String>> {
        if self.fail_lists {
            return Err(AppError::Store("subscriber list unavailable".into()));
        }
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.subscription_id.clone())
            .collect())
    }

    async fn created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Subscriber>> {
        if self.fail_lists {
            return Err(AppError::Store("subscriber query unavailable".into()));
        }
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.created_at >= start && s.created_at < end)
            .cloned()
            .collect())
    }

    async fn created_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Subscriber>> {
        if self.fail_lists {
            return Err(AppError::Store("subscriber query unavailable".into()));
        }
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.created_at >= since)
            .cloned()
            .collect())
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<Subscriber>> {
        let mut subscribers = self.subscribers.lock().unwrap().clone();
        subscribers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        subscribers.truncate(limit as usize);
        Ok(subscribers)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        if self.fail_counts {
            return Err(AppError::Store("count unavailable".into()));
        }
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.created_at >= since)
            .count() as u64)
    }

    async fn count_all(&self) -> AppResult<u64> {
        if self.fail_counts {
            return Err(AppError::Store("count unavailable".into()));
        }
        Ok(self.subscribers.lock().unwrap().len() as u64)
    }
}

/// History store over a vector, assigning sequential ids.
#[derive(Default)]
pub struct MockHistoryStore {
    pub rows: Mutex<Vec<HistoryRecord>>,
    /// Size of every `insert_batch` call, in order.
    pub insert_batches: Mutex<Vec<usize>>,
    pub fail_inserts: bool,
    next_id: AtomicI64,
}

impl MockHistoryStore {
    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl HistoryStore for MockHistoryStore {
    async fn insert_batch(&self, rows: &[NewHistoryRecord]) -> AppResult<()> {
        self.insert_batches.lock().unwrap().push(rows.len());
        if self.fail_inserts {
            return Err(AppError::Store("insert rejected".into()));
        }
        let mut stored = self.rows.lock().unwrap();
        for row in rows {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            stored.push(HistoryRecord {
                id,
                subscription_id: row.subscription_id.clone(),
                title: row.title.clone(),
                message: row.message.clone(),
                url: row.url.clone(),
                step_hours: row.step_hours,
                sent_at: row.sent_at,
                read_at: None,
            });
        }
        Ok(())
    }

    async fn for_subscriber(
        &self,
        subscription_id: &str,
        limit: u64,
    ) -> AppResult<Vec<HistoryRecord>> {
        let mut rows: Vec<HistoryRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.subscription_id == subscription_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn unread_count(&self, subscription_id: &str) -> AppResult<u64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.subscription_id == subscription_id && r.read_at.is_none())
            .count() as u64)
    }

    async fn mark_read(
        &self,
        subscription_id: &str,
        notification_id: i64,
        read_at: DateTime<Utc>,
    ) -> AppResult<Option<HistoryRecord>> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.id == notification_id && row.subscription_id == subscription_id {
                row.read_at = Some(read_at);
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn step_recipients(
        &self,
        step_hours: i32,
        subscription_ids: &[String],
    ) -> AppResult<Vec<String>> {
        let wanted: HashSet<&String> = subscription_ids.iter().collect();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.step_hours == Some(step_hours) && wanted.contains(&r.subscription_id))
            .map(|r| r.subscription_id.clone())
            .collect())
    }

    async fn all_keys(&self) -> AppResult<Vec<HistoryKey>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|r| HistoryKey {
                subscription_id: r.subscription_id.clone(),
                title: r.title.clone(),
                message: r.message.clone(),
                sent_at: r.sent_at,
            })
            .collect())
    }
}

/// Broadcast audit store over a vector.
#[derive(Default)]
pub struct MockBroadcastStore {
    pub rows: Mutex<Vec<BroadcastRecord>>,
    pub fail_append: bool,
    pub fail_lists: bool,
}

impl MockBroadcastStore {
    pub fn with_broadcasts(rows: Vec<BroadcastRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }
}

#[async_trait]
impl BroadcastStore for MockBroadcastStore {
    async fn append(&self, record: &BroadcastRecord) -> AppResult<()> {
        if self.fail_append {
            return Err(AppError::Store("append rejected".into()));
        }
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_oldest_first(&self) -> AppResult<Vec<BroadcastRecord>> {
        if self.fail_lists {
            return Err(AppError::Store("broadcast list unavailable".into()));
        }
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(rows)
    }

    async fn sent_since(&self, since: DateTime<Utc>) -> AppResult<Vec<BroadcastRecord>> {
        if self.fail_lists {
            return Err(AppError::Store("broadcast query unavailable".into()));
        }
        let mut rows: Vec<BroadcastRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.sent_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(rows)
    }
}

/// Push provider double that records every call.
#[derive(Default)]
pub struct MockPushProvider {
    pub calls: Mutex<Vec<(PushMessage, PushAudience)>>,
    /// Sends whose title is in this set fail with a delivery error.
    pub fail_titles: HashSet<String>,
}

impl MockPushProvider {
    pub fn failing_for(titles: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_titles: titles.iter().map(ToString::to_string).collect(),
        }
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn send(
        &self,
        message: &PushMessage,
        audience: &PushAudience,
    ) -> AppResult<PushReceipt> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((message.clone(), audience.clone()));
            calls.len()
        };
        if self.fail_titles.contains(&message.title) {
            return Err(AppError::Delivery("provider rejected the send".into()));
        }
        Ok(PushReceipt {
            notification_id: format!("delivery-{call_index}"),
        })
    }
}
