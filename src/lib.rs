// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Pager
//!
//! A Rust-native pagination state controller for infinite-scroll style
//! feeds.
//!
//! ## Features
//!
//! - **Accumulated View**: Pages are merged into one flat list, or through a custom merge policy
//! - **Bounded Window**: Keep only the newest `max_pages` pages in memory
//! - **Single Flight**: At most one fetch in flight per pager
//! - **End of Data**: Fetchers end the feed through their context
//! - **Visibility Trigger**: Fetch the next page when a sentinel element scrolls into view
//! - **Scoped Cleanup**: Dispose pagers and triggers together with their owner
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_pager::{page_fetcher, Pager, PagerOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let fetcher = page_fetcher(|page: u32, ctx| async move {
//!         let items = load_page(page).await?;
//!         if items.is_empty() {
//!             ctx.set_end_of_data(true);
//!         } else {
//!             ctx.set_page_key(page + 1);
//!         }
//!         Ok(items)
//!     });
//!
//!     // The first page is requested immediately
//!     let pager = Pager::new(fetcher, PagerOptions::new(1).with_max_pages(5))?;
//!     pager.settled().await;
//!
//!     while !pager.end_of_data() {
//!         pager.fetch_next();
//!         pager.settled().await;
//!     }
//!     println!("{} items", pager.accumulated().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Visibility Trigger                         │
//! │  bind(element, gate) → observe   enter → gate/end/loading check │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │ request_next
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Pager                                   │
//! │  page key · end of data · single flight · error callback        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │ append
//! ┌────────────────────────────┬────────────────────────────────────┐
//! │        Page Store          │           Merge Policy             │
//! ├────────────────────────────┼────────────────────────────────────┤
//! │ Bounded window             │ Flatten (default)                  │
//! │ Oldest-first eviction      │ Whole pages                        │
//! │ Recompute on read          │ Custom function                    │
//! └────────────────────────────┴────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pager
pub mod error;

/// Common types and type aliases
pub mod types;

/// Serializable pager configuration
pub mod config;

/// Merge policies for the accumulated view
pub mod merge;

/// Bounded page storage
pub mod store;

/// Disposal scopes
pub mod scope;

/// Pagination controller
pub mod pager;

/// Visibility-driven fetching
pub mod trigger;

/// Simulated feed and viewport
pub mod simulate;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::PagerConfig;
pub use merge::{merge_fn, AppendPages, Flatten, MergePolicy};
pub use pager::{page_fetcher, FetchState, FetcherContext, PageFetcher, Pager, PagerOptions};
pub use scope::Scope;
pub use store::PageStore;
pub use trigger::{Gate, VisibilityEvent, VisibilitySource, VisibilityTrigger};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
