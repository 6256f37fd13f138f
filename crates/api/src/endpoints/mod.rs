//! API endpoints.

mod admin;
mod broadcast;
mod cron;
mod notifications;
mod subscribers;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/subscribers", subscribers::router())
        .nest(
            "/notifications",
            notifications::router().merge(broadcast::router()),
        )
        .nest("/cron", cron::router())
        .nest("/admin", admin::router())
}
