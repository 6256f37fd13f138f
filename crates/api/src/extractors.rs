//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use dripcast_common::AppError;

use crate::middleware::AppState;

/// Administrator extractor.
///
/// Forwards the caller's bearer token to the hosted auth provider; any
/// non-success rejects the request before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        state.auth.verify_admin(token).await?;
        Ok(Self)
    }
}

/// Scheduler trigger extractor.
///
/// Accepts either the trusted scheduler-origin header (added by the
/// platform's cron runner) or a bearer token matching the configured cron
/// secret for manual runs. Without a configured secret only the header is
/// accepted.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerTrigger;

impl FromRequestParts<AppState> for SchedulerTrigger {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.contains_key(&state.scheduler.trigger_header) {
            return Ok(Self);
        }
        if let Some(secret) = &state.scheduler.cron_secret
            && bearer_token(parts) == Some(secret.as_str())
        {
            return Ok(Self);
        }
        Err(AppError::Unauthorized(
            "Scheduler trigger credential required".to_string(),
        ))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
