//! Admin dashboard endpoints.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::Utc;
use dripcast_common::AppResult;
use dripcast_core::{MigrationReport, StatsReport};
use dripcast_store::Subscriber;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    endpoints::cron::StepRunResponse,
    extractors::AdminAuth,
    middleware::AppState,
};

/// Create admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/subscribers/recent", get(recent_subscribers))
        .route("/migrate", post(run_migration))
        .route("/steps/run", post(run_steps_manually))
}

/// Dashboard stats response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: StatsBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    pub today: u64,
    pub week: u64,
    pub month: u64,
    pub total: u64,
    pub daily_registrations: BTreeMap<String, u64>,
    pub daily_notifications: BTreeMap<String, u64>,
}

impl From<StatsReport> for StatsResponse {
    fn from(report: StatsReport) -> Self {
        Self {
            stats: StatsBody {
                today: report.today,
                week: report.week,
                month: report.month,
                total: report.total,
                daily_registrations: report.daily_registrations,
                daily_notifications: report.daily_notifications,
            },
        }
    }
}

/// Dashboard figures (admin only).
async fn get_stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse>> {
    let report = state.stats_service.report(Utc::now()).await?;
    Ok(Json(report.into()))
}

/// Recent subscribers query.
#[derive(Debug, Deserialize)]
pub struct RecentSubscribersQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Recent subscribers response.
#[derive(Debug, Serialize)]
pub struct RecentSubscribersResponse {
    pub users: Vec<Subscriber>,
}

/// Most recent signups, newest first (admin only).
async fn recent_subscribers(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<RecentSubscribersQuery>,
) -> AppResult<Json<RecentSubscribersResponse>> {
    let users = state.subscriber_service.recent(query.limit).await?;
    Ok(Json(RecentSubscribersResponse { users }))
}

/// Migration response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResponse {
    pub success: bool,
    pub message: String,
    pub notifications_count: usize,
    pub users_count: usize,
    pub total_records: usize,
    pub inserted_count: usize,
}

impl From<MigrationReport> for MigrationResponse {
    fn from(report: MigrationReport) -> Self {
        Self {
            success: true,
            message: report.message,
            notifications_count: report.notifications_count,
            users_count: report.users_count,
            total_records: report.total_records,
            inserted_count: report.inserted_count,
        }
    }
}

/// Backfill the broadcast audit log into per-user history (admin only).
async fn run_migration(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<MigrationResponse>> {
    info!("Migration requested");
    let report = state.migration_service.run().await?;
    Ok(Json(report.into()))
}

/// Manually trigger the drip scheduler (admin only). Same run as the cron
/// endpoint, behind admin auth instead of the trigger credential.
async fn run_steps_manually(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<StepRunResponse>> {
    info!("Manual step run requested");
    let report = state.step_scheduler.run(Utc::now()).await?;
    Ok(Json(report.into()))
}
