//! Core business logic for dripcast.

pub mod services;

pub use services::*;

/// Maximum number of history rows per insert request, bounding request size
/// when fanning out to the full subscriber set.
pub const INSERT_BATCH_SIZE: usize = 1000;
