//! Broadcast endpoint: one announcement to every subscriber.

use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use dripcast_common::AppResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extractors::AdminAuth, middleware::AppState};

/// Create broadcast router (nested under `/notifications`).
pub fn router() -> Router<AppState> {
    Router::new().route("/broadcast", post(send_broadcast))
}

/// Broadcast request.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub message: String,
}

/// Broadcast response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    pub success: bool,
    pub message: String,
    pub notification_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Send an announcement to all subscribers (admin only).
async fn send_broadcast(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> AppResult<Json<BroadcastResponse>> {
    info!(title = %req.title, "Broadcast requested");

    let outcome = state
        .broadcast_service
        .send(&req.title, &req.message, Utc::now())
        .await?;

    let message = if outcome.recorded {
        "notification sent".to_string()
    } else {
        "notification sent, but history recording was incomplete".to_string()
    };
    Ok(Json(BroadcastResponse {
        success: true,
        message,
        notification_id: outcome.notification_id,
        warning: outcome.warning,
    }))
}
