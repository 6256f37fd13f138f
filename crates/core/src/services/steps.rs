//! Drip step scheduler.
//!
//! Invoked on an external cadence (expected: hourly). Each run walks the
//! configured step sequence in order; for every offset it selects the
//! subscribers whose signup falls in that offset's one-hour eligibility
//! window, sends one batch push, and records one history row per recipient.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use dripcast_common::AppResult;
use dripcast_push::{PushAudience, PushMessage, PushProviderRef};
use dripcast_store::{HistoryStoreRef, NewHistoryRecord, SubscriberStoreRef};

use crate::INSERT_BATCH_SIZE;

/// One entry of the drip sequence.
#[derive(Debug, Clone)]
pub struct StepMessage {
    /// Hours after signup at which this message is due.
    pub offset_hours: i32,
    /// Push title.
    pub title: String,
    /// Push body.
    pub message: String,
    /// Optional deep link.
    pub url: Option<String>,
}

impl StepMessage {
    fn new(offset_hours: i32, title: &str, message: &str) -> Self {
        Self {
            offset_hours,
            title: title.to_string(),
            message: message.to_string(),
            url: None,
        }
    }

    /// Display label for this offset, e.g. `"24h"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}h", self.offset_hours)
    }
}

/// The built-in coaching sequence: eight messages over the first week.
#[must_use]
pub fn step_sequence() -> Vec<StepMessage> {
    vec![
        StepMessage::new(
            1,
            "Welcome aboard!",
            "Thanks for joining. Your first lesson is ready whenever you are.",
        ),
        StepMessage::new(
            24,
            "Day 1 complete!",
            "One day in. A few minutes of practice today keeps the momentum going.",
        ),
        StepMessage::new(
            48,
            "Two days strong",
            "You are building a habit. Pick up where you left off today.",
        ),
        StepMessage::new(
            72,
            "Congrats on day 3!",
            "Three days of learning. Consistency beats intensity. Keep it up!",
        ),
        StepMessage::new(
            96,
            "Day 4 check-in",
            "Most people quit by now. You did not. Today's session is waiting.",
        ),
        StepMessage::new(
            120,
            "Five days in",
            "Halfway through your first week. Review what you have learned so far.",
        ),
        StepMessage::new(
            144,
            "Almost a full week",
            "Day 6. One more day to complete your first week streak.",
        ),
        StepMessage::new(
            168,
            "One week milestone!",
            "A full week of learning. You have earned it. Here is to week two!",
        ),
    ]
}

/// The one-hour signup window eligible for offset `h` at invocation time
/// `now`: `[now - (h+1)h, now - h·h)`.
///
/// The window is anchored to `now`, not to the signup time, so each
/// subscriber falls into each offset's window exactly once only if the
/// scheduler runs at least hourly. Sparser cadences silently skip
/// subscribers.
#[must_use]
pub fn eligibility_window(
    now: DateTime<Utc>,
    offset_hours: i32,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = now - Duration::hours(i64::from(offset_hours));
    let start = end - Duration::hours(1);
    (start, end)
}

/// Outcome of one offset within a run.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Offset label, e.g. `"24h"`.
    pub step: String,
    /// Offset in hours.
    pub offset_hours: i32,
    /// Number of recipients the push was delivered to. Zero when the window
    /// was empty or when this offset failed.
    pub count: usize,
    /// Provider delivery id when a push went out.
    pub notification_id: Option<String>,
    /// Whether the push provider accepted the send.
    pub delivered: bool,
    /// Whether every history row for this offset was persisted.
    pub recorded: bool,
}

impl StepOutcome {
    fn skipped(step: &StepMessage) -> Self {
        Self {
            step: step.label(),
            offset_hours: step.offset_hours,
            count: 0,
            notification_id: None,
            delivered: false,
            recorded: true,
        }
    }
}

/// Aggregate result of one scheduler run.
#[derive(Debug, Clone)]
pub struct StepRunReport {
    /// Sum of per-offset recipient counts.
    pub total_count: usize,
    /// Number of offsets that delivered to at least one recipient.
    pub success_count: usize,
    /// Per-offset outcomes, in sequence order.
    pub results: Vec<StepOutcome>,
}

/// Scheduler walking the drip sequence offset-by-offset.
#[derive(Clone)]
pub struct StepScheduler {
    subscribers: SubscriberStoreRef,
    history: HistoryStoreRef,
    push: PushProviderRef,
    sequence: Vec<StepMessage>,
}

impl StepScheduler {
    /// Create a scheduler over the built-in sequence.
    #[must_use]
    pub fn new(
        subscribers: SubscriberStoreRef,
        history: HistoryStoreRef,
        push: PushProviderRef,
    ) -> Self {
        Self {
            subscribers,
            history,
            push,
            sequence: step_sequence(),
        }
    }

    /// Replace the drip sequence.
    #[must_use]
    pub fn with_sequence(mut self, sequence: Vec<StepMessage>) -> Self {
        self.sequence = sequence;
        self
    }

    /// Run the full sequence once.
    ///
    /// Offsets are isolated from each other: a provider or store failure on
    /// one offset contributes a zero count for that offset and the run
    /// continues. The run itself only fails on errors raised before any
    /// offset is processed.
    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<StepRunReport> {
        let mut results = Vec::with_capacity(self.sequence.len());
        for step in &self.sequence {
            results.push(self.run_step(step, now).await);
        }

        let total_count = results.iter().map(|r| r.count).sum();
        let success_count = results.iter().filter(|r| r.count > 0).count();
        tracing::info!(total_count, success_count, "Step scheduler run finished");
        Ok(StepRunReport {
            total_count,
            success_count,
            results,
        })
    }

    async fn run_step(&self, step: &StepMessage, now: DateTime<Utc>) -> StepOutcome {
        let (window_start, window_end) = eligibility_window(now, step.offset_hours);

        let eligible = match self.subscribers.created_between(window_start, window_end).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                warn!(step = %step.label(), error = %e, "Failed to query eligible subscribers");
                return StepOutcome::skipped(step);
            }
        };

        let candidates: Vec<String> = eligible
            .into_iter()
            .map(|s| s.subscription_id)
            .filter(|id| !id.trim().is_empty())
            .collect();
        if candidates.is_empty() {
            return StepOutcome::skipped(step);
        }

        // Skip recipients who already received this offset, so a re-trigger
        // within the same window does not double-send.
        let targets = match self
            .history
            .step_recipients(step.offset_hours, &candidates)
            .await
        {
            Ok(already_sent) => candidates
                .into_iter()
                .filter(|id| !already_sent.contains(id))
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!(
                    step = %step.label(),
                    error = %e,
                    "Duplicate check failed, proceeding without it"
                );
                candidates
            }
        };
        if targets.is_empty() {
            return StepOutcome::skipped(step);
        }

        let receipt = match self
            .push
            .send(
                &PushMessage {
                    title: step.title.clone(),
                    message: step.message.clone(),
                    url: step.url.clone(),
                },
                &PushAudience::Subscribers(targets.clone()),
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(step = %step.label(), error = %e, "Step delivery failed");
                return StepOutcome::skipped(step);
            }
        };
        tracing::info!(
            step = %step.label(),
            count = targets.len(),
            notification_id = %receipt.notification_id,
            "Step delivered"
        );

        // One shared timestamp for every row of this offset.
        let sent_at = Utc::now();
        let rows: Vec<NewHistoryRecord> = targets
            .iter()
            .map(|subscription_id| NewHistoryRecord {
                subscription_id: subscription_id.clone(),
                title: step.title.clone(),
                message: step.message.clone(),
                url: step.url.clone(),
                step_hours: Some(step.offset_hours),
                sent_at,
            })
            .collect();

        let mut recorded = true;
        for chunk in rows.chunks(INSERT_BATCH_SIZE) {
            if let Err(e) = self.history.insert_batch(chunk).await {
                warn!(
                    step = %step.label(),
                    size = chunk.len(),
                    error = %e,
                    "Failed to insert step history batch"
                );
                recorded = false;
            }
        }

        StepOutcome {
            step: step.label(),
            offset_hours: step.offset_hours,
            count: targets.len(),
            notification_id: Some(receipt.notification_id),
            delivered: true,
            recorded,
        }
    }
}
