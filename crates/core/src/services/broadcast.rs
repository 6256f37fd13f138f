//! Immediate broadcast service.

use chrono::{DateTime, Utc};
use tracing::warn;

use dripcast_common::{AppError, AppResult};
use dripcast_push::{PushAudience, PushMessage, PushProviderRef};
use dripcast_store::{
    BroadcastRecord, BroadcastStoreRef, HistoryStoreRef, NewHistoryRecord, SubscriberStoreRef,
};

use crate::INSERT_BATCH_SIZE;

/// Maximum title length after trimming, in characters.
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum message length after trimming, in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Result of one broadcast.
///
/// Delivery and history recording are separate phases with separate flags:
/// the push can reach end users while recording partially fails, and that
/// difference matters to callers.
#[derive(Debug, Clone)]
pub struct BroadcastOutcome {
    /// Provider-assigned delivery identifier.
    pub notification_id: String,
    /// Whether the push provider accepted the send. Always true on `Ok`;
    /// a rejected send aborts the broadcast before anything is persisted.
    pub delivered: bool,
    /// Whether every history row was persisted.
    pub recorded: bool,
    /// Number of subscribers a history row was attempted for.
    pub recipients: usize,
    /// Human-readable note when recording was incomplete.
    pub warning: Option<String>,
}

/// Service sending an administrator announcement to every subscriber.
#[derive(Clone)]
pub struct BroadcastService {
    subscribers: SubscriberStoreRef,
    history: HistoryStoreRef,
    broadcasts: BroadcastStoreRef,
    push: PushProviderRef,
}

/// Trim and cap administrator input to a character budget.
fn sanitize(input: &str, max_chars: usize) -> String {
    input.trim().chars().take(max_chars).collect()
}

impl BroadcastService {
    /// Create a new broadcast service.
    #[must_use]
    pub fn new(
        subscribers: SubscriberStoreRef,
        history: HistoryStoreRef,
        broadcasts: BroadcastStoreRef,
        push: PushProviderRef,
    ) -> Self {
        Self {
            subscribers,
            history,
            broadcasts,
            push,
        }
    }

    /// Send one announcement to all subscribers.
    ///
    /// The phases are not transactional: a delivery failure aborts the whole
    /// broadcast with nothing persisted, while persistence failures after a
    /// successful delivery are downgraded to a warning on the outcome.
    pub async fn send(
        &self,
        title: &str,
        message: &str,
        now: DateTime<Utc>,
    ) -> AppResult<BroadcastOutcome> {
        let title = sanitize(title, MAX_TITLE_LEN);
        let message = sanitize(message, MAX_MESSAGE_LEN);
        if title.is_empty() || message.is_empty() {
            return Err(AppError::Validation(
                "title and message are required".to_string(),
            ));
        }

        // Phase 1: deliver. One batch call targeting every subscriber.
        let receipt = self
            .push
            .send(
                &PushMessage {
                    title: title.clone(),
                    message: message.clone(),
                    url: None,
                },
                &PushAudience::Everyone,
            )
            .await?;
        tracing::info!(
            notification_id = %receipt.notification_id,
            title = %title,
            "Broadcast delivered"
        );

        // Phase 2: admin audit row. The push already went out, so a failure
        // here must not fail the broadcast.
        if let Err(e) = self
            .broadcasts
            .append(&BroadcastRecord {
                title: title.clone(),
                message: message.clone(),
                sent_at: now,
            })
            .await
        {
            warn!(error = %e, "Failed to append broadcast audit record");
        }

        // Phase 3: per-recipient history fan-out, chunked to bound request
        // size. Failures degrade to a warning.
        let mut recorded = true;
        let mut warning = None;
        let mut recipients = 0;

        match self.subscribers.list_ids().await {
            Ok(ids) => {
                let rows: Vec<NewHistoryRecord> = ids
                    .into_iter()
                    .filter(|id| !id.trim().is_empty())
                    .map(|subscription_id| NewHistoryRecord {
                        subscription_id,
                        title: title.clone(),
                        message: message.clone(),
                        url: None,
                        step_hours: None,
                        sent_at: now,
                    })
                    .collect();
                recipients = rows.len();

                let mut failed_batches = 0usize;
                let mut total_batches = 0usize;
                for chunk in rows.chunks(INSERT_BATCH_SIZE) {
                    total_batches += 1;
                    if let Err(e) = self.history.insert_batch(chunk).await {
                        warn!(
                            batch = total_batches,
                            size = chunk.len(),
                            error = %e,
                            "Failed to insert broadcast history batch"
                        );
                        failed_batches += 1;
                    }
                }
                if failed_batches > 0 {
                    recorded = false;
                    warning = Some(format!(
                        "notification delivered, but {failed_batches} of {total_batches} history batches failed"
                    ));
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to list subscribers for history fan-out");
                recorded = false;
                warning =
                    Some("notification delivered, but history could not be recorded".to_string());
            }
        }

        Ok(BroadcastOutcome {
            notification_id: receipt.notification_id,
            delivered: true,
            recorded,
            recipients,
            warning,
        })
    }
}
