//! REST-backed repository implementations.

mod broadcasts;
mod history;
mod subscribers;

pub use broadcasts::RestBroadcastRepository;
pub use history::RestHistoryRepository;
pub use subscribers::RestSubscriberRepository;
