//! Pagination controller module
//!
//! Owns the page key, the end-of-data flag and the single-flight fetch
//! lifecycle.
//!
//! # Overview
//!
//! The pager module provides:
//! - `Pager` - Controller that fetches pages and feeds the page store
//! - `PageFetcher` - Trait for the caller-supplied fetch function
//! - `FetcherContext` - Handle a fetch uses to move the page key or end the feed
//! - `PageDriver` - Object-safe view of a pager used by the visibility trigger

mod controller;
mod types;

pub use controller::{FetchHandle, Pager};
pub use types::{
    page_fetcher, ErrorCallback, FetchState, FetchStatus, FetcherContext, PageDriver,
    PageFetcher, PagerOptions, PagerStats,
};
