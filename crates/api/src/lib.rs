//! HTTP API layer for dripcast.
//!
//! This crate provides the public and admin REST surface:
//!
//! - **Endpoints**: subscriber registration, broadcasts, the drip scheduler
//!   trigger, per-user history, and the admin dashboard
//! - **Extractors**: admin bearer auth and scheduler-trigger credentials
//! - **Middleware**: shared application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;

pub use endpoints::router;
pub use middleware::AppState;
