//! Page store module
//!
//! Holds the ordered sequence of fetched pages and the accumulated view
//! derived from it.
//!
//! # Overview
//!
//! The store provides:
//! - `PageStore` - Bounded page window with oldest-first eviction
//! - Recompute-on-read of the accumulated view through a merge policy
//! - A revision counter bumped on every mutation

mod page_store;

pub use page_store::PageStore;

#[cfg(test)]
mod tests;
