//! Dripcast server entry point.

use std::sync::Arc;

use axum::Router;
use dripcast_api::{AppState, router as api_router};
use dripcast_common::Config;
use dripcast_core::{
    BroadcastService, HistoryService, MigrationService, StatsService, StepScheduler,
    SubscriberService,
};
use dripcast_push::{OneSignalClient, PushProviderRef};
use dripcast_store::{
    AuthVerifierRef, BroadcastStoreRef, HistoryStoreRef, RestAuthVerifier,
    RestBroadcastRepository, RestClient, RestHistoryRepository, RestSubscriberRepository,
    SubscriberStoreRef,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local development reads credentials from .env
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dripcast=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting dripcast server...");

    // Load configuration
    let config = Config::load()?;
    let reporting_tz = config.stats.reporting_timezone()?;

    // Hosted store client and repositories
    let store_client = RestClient::new(&config.store.base_url, &config.store.service_key);
    let subscribers: SubscriberStoreRef =
        Arc::new(RestSubscriberRepository::new(store_client.clone()));
    let history: HistoryStoreRef = Arc::new(RestHistoryRepository::new(store_client.clone()));
    let broadcasts: BroadcastStoreRef = Arc::new(RestBroadcastRepository::new(store_client));

    // Push provider
    let push: PushProviderRef = Arc::new(OneSignalClient::new(
        &config.push.app_id,
        &config.push.rest_api_key,
        &config.push.api_base,
    ));

    // Admin auth delegates to the hosted auth provider
    let auth: AuthVerifierRef = Arc::new(RestAuthVerifier::new(
        &config.store.base_url,
        &config.store.service_key,
    ));

    // Initialize services
    let subscriber_service = SubscriberService::new(subscribers.clone());
    let broadcast_service = BroadcastService::new(
        subscribers.clone(),
        history.clone(),
        broadcasts.clone(),
        push.clone(),
    );
    let step_scheduler = StepScheduler::new(subscribers.clone(), history.clone(), push);
    let stats_service = StatsService::new(subscribers.clone(), broadcasts.clone(), reporting_tz);
    let history_service = HistoryService::new(history.clone());
    let migration_service = MigrationService::new(subscribers, history, broadcasts);

    // Create app state
    let state = AppState {
        subscriber_service,
        broadcast_service,
        step_scheduler,
        stats_service,
        history_service,
        migration_service,
        auth,
        scheduler: config.scheduler.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
