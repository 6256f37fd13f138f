//! Push delivery provider client for dripcast.
//!
//! Actual push transport (device registration, platform delivery) is
//! delegated to a hosted provider; this crate only shapes and forwards batch
//! send requests. Core services depend on the [`PushProvider`] trait so
//! tests can inject a double.

pub mod onesignal;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use dripcast_common::AppResult;

pub use onesignal::OneSignalClient;

/// Content of one push send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Deep link opened when the recipient taps the notification.
    pub url: Option<String>,
}

/// Who a push send targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushAudience {
    /// Every current subscriber of the application.
    Everyone,
    /// An explicit list of subscription ids.
    Subscribers(Vec<String>),
}

/// Provider acknowledgement for one batch send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    /// Provider-assigned delivery identifier.
    pub notification_id: String,
}

/// A push delivery provider accepting batch send requests.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Send one notification to the given audience in a single batch call.
    async fn send(&self, message: &PushMessage, audience: &PushAudience)
    -> AppResult<PushReceipt>;
}

/// Shared handle to a [`PushProvider`].
pub type PushProviderRef = Arc<dyn PushProvider>;
