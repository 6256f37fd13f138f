//! Hosted-store access layer for dripcast.
//!
//! Persistence is delegated to a hosted relational database that exposes a
//! PostgREST-compatible REST interface. This crate provides:
//!
//! - **Client**: a thin authenticated REST client via [`RestClient`]
//! - **Records**: row types for the three tables
//!   (`profiles`, `user_notifications`, `notifications`)
//! - **Traits**: collaborator seams ([`SubscriberStore`], [`HistoryStore`],
//!   [`BroadcastStore`], [`AuthVerifier`]) that core services depend on, so
//!   tests can inject in-memory doubles
//! - **Repositories**: the REST-backed implementations of those traits

pub mod auth;
pub mod client;
pub mod records;
pub mod repositories;
pub mod traits;

pub use auth::RestAuthVerifier;
pub use client::RestClient;
pub use records::{BroadcastRecord, HistoryKey, HistoryRecord, NewHistoryRecord, Subscriber};
pub use repositories::{
    RestBroadcastRepository, RestHistoryRepository, RestSubscriberRepository,
};
pub use traits::{
    AuthVerifier, AuthVerifierRef, BroadcastStore, BroadcastStoreRef, HistoryStore,
    HistoryStoreRef, SubscriberStore, SubscriberStoreRef,
};
