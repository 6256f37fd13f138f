//! Subscriber registration endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use dripcast_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::middleware::AppState;

/// Create subscriber router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(register))
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Identifier issued by the push provider on the client.
    pub subscription_id: String,
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
}

/// Register a subscription id. Idempotent for already-known ids.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    state
        .subscriber_service
        .register(&req.subscription_id, Utc::now())
        .await?;
    Ok(Json(RegisterResponse { success: true }))
}
