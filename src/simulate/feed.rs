//! Simulated offset-paginated feed

use crate::error::{Error, Result};
use crate::pager::{FetcherContext, PageFetcher};
use crate::types::JsonPage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Shape of the simulated feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Total number of items
    pub total: usize,
    /// Items per page
    pub page_size: usize,
    /// Page number (0-based) whose first fetch fails
    #[serde(default)]
    pub fail_at: Option<usize>,
    /// Delay before every response
    #[serde(default)]
    pub latency: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            total: 100,
            page_size: 10,
            fail_at: None,
            latency: Duration::ZERO,
        }
    }
}

impl FeedConfig {
    /// Create a feed config
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size,
            ..Default::default()
        }
    }

    /// Fail the first fetch of one page
    #[must_use]
    pub fn with_fail_at(mut self, page: usize) -> Self {
        self.fail_at = Some(page);
        self
    }

    /// Delay every response
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Feed keyed by item offset
///
/// Each fetch returns up to `page_size` JSON items starting at the offset,
/// moves the page key to the next offset, and ends the feed once the last
/// item has been served.
#[derive(Debug)]
pub struct SimulatedFeed {
    config: FeedConfig,
    failed: AtomicBool,
    calls: AtomicUsize,
}

impl SimulatedFeed {
    /// Create a feed
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            failed: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Feed shape
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher<usize, JsonPage> for SimulatedFeed {
    async fn fetch(&self, offset: usize, ctx: FetcherContext<usize>) -> Result<JsonPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if self.config.page_size == 0 {
            return Err(Error::fetch("page size must be positive"));
        }
        let page = offset / self.config.page_size;
        if self.config.fail_at == Some(page) && !self.failed.swap(true, Ordering::SeqCst) {
            return Err(Error::fetch(format!("simulated failure at offset {offset}")));
        }

        let end = (offset + self.config.page_size).min(self.config.total);
        let items: JsonPage = (offset..end)
            .map(|id| json!({ "id": id, "title": format!("Item {id}") }))
            .collect();
        debug!(offset, served = items.len(), "Serving simulated page");

        ctx.set_page_key(end);
        if end >= self.config.total {
            ctx.set_end_of_data(true);
        }
        Ok(items)
    }
}
