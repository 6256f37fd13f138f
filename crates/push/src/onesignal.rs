//! OneSignal REST API client.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{Value, json};

use dripcast_common::{AppError, AppResult};

use crate::{PushAudience, PushMessage, PushProvider, PushReceipt};

/// [`PushProvider`] backed by OneSignal's create-notification endpoint.
#[derive(Debug, Clone)]
pub struct OneSignalClient {
    app_id: String,
    rest_api_key: String,
    api_base: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CreateNotificationResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

impl OneSignalClient {
    /// Create a client for the given application.
    #[must_use]
    pub fn new(app_id: &str, rest_api_key: &str, api_base: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            rest_api_key: rest_api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

/// Build the create-notification request body.
fn build_payload(app_id: &str, message: &PushMessage, audience: &PushAudience) -> Value {
    let mut payload = json!({
        "app_id": app_id,
        "headings": { "en": message.title },
        "contents": { "en": message.message },
    });

    if let Some(url) = &message.url {
        payload["url"] = json!(url);
    }

    match audience {
        PushAudience::Everyone => {
            payload["included_segments"] = json!(["All"]);
        }
        PushAudience::Subscribers(ids) => {
            payload["include_player_ids"] = json!(ids);
        }
    }

    payload
}

#[async_trait]
impl PushProvider for OneSignalClient {
    async fn send(
        &self,
        message: &PushMessage,
        audience: &PushAudience,
    ) -> AppResult<PushReceipt> {
        let payload = build_payload(&self.app_id, message, audience);

        let response = self
            .http
            .post(format!("{}/notifications", self.api_base))
            .header(AUTHORIZATION, format!("Basic {}", self.rest_api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("push provider unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "push provider returned {status}: {body}"
            )));
        }

        let body: CreateNotificationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Delivery(format!("bad push provider response: {e}")))?;

        // The provider reports some failures with a 200 and an errors field.
        match body.id {
            Some(id) if !id.is_empty() => Ok(PushReceipt {
                notification_id: id,
            }),
            _ => Err(AppError::Delivery(format!(
                "push provider rejected the send: {}",
                body.errors.unwrap_or(Value::Null)
            ))),
        }
    }
}
