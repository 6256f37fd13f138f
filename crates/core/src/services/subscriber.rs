//! Subscriber registration service.

use chrono::{DateTime, Utc};

use dripcast_common::{AppError, AppResult};
use dripcast_store::{Subscriber, SubscriberStoreRef};

/// Service for registering subscribers and listing recent signups.
#[derive(Clone)]
pub struct SubscriberService {
    subscribers: SubscriberStoreRef,
}

impl SubscriberService {
    /// Create a new subscriber service.
    #[must_use]
    pub fn new(subscribers: SubscriberStoreRef) -> Self {
        Self { subscribers }
    }

    /// Register a subscription id obtained from the push provider.
    ///
    /// Registration is an upsert keyed by the subscription id: registering
    /// an already-known id is a no-op and does not refresh `created_at`, so
    /// drip eligibility stays anchored to the first signup.
    pub async fn register(&self, subscription_id: &str, now: DateTime<Utc>) -> AppResult<()> {
        let subscription_id = subscription_id.trim();
        if subscription_id.is_empty() {
            return Err(AppError::Validation(
                "subscription_id must not be empty".to_string(),
            ));
        }

        self.subscribers.register(subscription_id, now).await?;
        tracing::info!(subscription_id = %subscription_id, "Registered subscriber");
        Ok(())
    }

    /// Most recently registered subscribers, newest first.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<Subscriber>> {
        self.subscribers.recent(limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::testing::MockSubscriberStore;
    use chrono::Duration;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_register_trims_and_stores() {
        let store = Arc::new(MockSubscriberStore::default());
        let service = SubscriberService::new(store.clone());
        let now = Utc::now();

        service.register("  sub-1  ", now).await.unwrap();

        let subscribers = store.subscribers.lock().unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].subscription_id, "sub-1");
        assert_eq!(subscribers[0].created_at, now);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_id() {
        let store = Arc::new(MockSubscriberStore::default());
        let service = SubscriberService::new(store.clone());

        let result = service.register("   ", Utc::now()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.subscribers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reregistration_keeps_original_created_at() {
        let store = Arc::new(MockSubscriberStore::default());
        let service = SubscriberService::new(store.clone());
        let first = Utc::now() - Duration::hours(24);

        service.register("sub-1", first).await.unwrap();
        service.register("sub-1", Utc::now()).await.unwrap();

        let subscribers = store.subscribers.lock().unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].created_at, first);
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first() {
        let now = Utc::now();
        let store = Arc::new(MockSubscriberStore::with_subscribers(vec![
            Subscriber {
                subscription_id: "old".to_string(),
                created_at: now - Duration::days(2),
            },
            Subscriber {
                subscription_id: "new".to_string(),
                created_at: now,
            },
        ]));
        let service = SubscriberService::new(store);

        let recent = service.recent(1).await.unwrap();

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].subscription_id, "new");
    }
}
