//! Scheduler trigger endpoint, invoked by the external cron runner.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use dripcast_common::AppResult;
use dripcast_core::StepRunReport;
use serde::Serialize;

use crate::{extractors::SchedulerTrigger, middleware::AppState};

/// Create cron router.
pub fn router() -> Router<AppState> {
    Router::new().route("/steps", get(run_steps))
}

/// Scheduler run response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRunResponse {
    pub success: bool,
    pub message: String,
    pub total_count: usize,
    pub success_count: usize,
    pub results: Vec<StepResult>,
}

/// One offset's outcome within a run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    pub delivered: bool,
    pub recorded: bool,
}

impl From<StepRunReport> for StepRunResponse {
    fn from(report: StepRunReport) -> Self {
        Self {
            success: true,
            message: format!(
                "step run finished: {} recipients across {} steps",
                report.total_count, report.success_count
            ),
            total_count: report.total_count,
            success_count: report.success_count,
            results: report
                .results
                .into_iter()
                .map(|r| StepResult {
                    step: r.step,
                    count: r.count,
                    notification_id: r.notification_id,
                    delivered: r.delivered,
                    recorded: r.recorded,
                })
                .collect(),
        }
    }
}

/// Run the drip sequence once. Authorized by the trusted scheduler header
/// or the cron secret.
async fn run_steps(
    _trigger: SchedulerTrigger,
    State(state): State<AppState>,
) -> AppResult<Json<StepRunResponse>> {
    let report = state.step_scheduler.run(Utc::now()).await?;
    Ok(Json(report.into()))
}
