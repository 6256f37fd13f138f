//! Per-user notification history endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::Utc;
use dripcast_common::AppResult;
use dripcast_store::HistoryRecord;
use serde::{Deserialize, Serialize};

use crate::middleware::AppState;

/// Create notifications router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_notifications).patch(mark_as_read))
}

/// History listing query.
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub subscription_id: String,
}

/// History listing response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub success: bool,
    pub notifications: Vec<HistoryRecord>,
    pub unread_count: u64,
}

/// A subscriber's notification history, newest first.
async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<NotificationListResponse>> {
    let (notifications, unread_count) =
        state.history_service.list(&query.subscription_id).await?;
    Ok(Json(NotificationListResponse {
        success: true,
        notifications,
        unread_count,
    }))
}

/// Mark-as-read request.
#[derive(Debug, Deserialize)]
pub struct MarkAsReadRequest {
    pub subscription_id: String,
    pub notification_id: i64,
}

/// Mark-as-read response. `notification` is absent when no record matched
/// both the id and the owner.
#[derive(Debug, Serialize)]
pub struct MarkAsReadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<HistoryRecord>,
}

/// Mark one notification as read, scoped to the owning subscriber.
async fn mark_as_read(
    State(state): State<AppState>,
    Json(req): Json<MarkAsReadRequest>,
) -> AppResult<Json<MarkAsReadResponse>> {
    let notification = state
        .history_service
        .mark_read(&req.subscription_id, req.notification_id, Utc::now())
        .await?;
    Ok(Json(MarkAsReadResponse {
        success: true,
        notification,
    }))
}
