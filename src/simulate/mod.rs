//! In-memory collaborators
//!
//! A simulated paged feed and an in-memory viewport. The CLI drives the
//! pager with these, and the tests use them in place of a real backend and a
//! real intersection observer.

mod feed;
mod viewport;

pub use feed::{FeedConfig, SimulatedFeed};
pub use viewport::InMemoryViewport;
