//! Pager types and traits
//!
//! Defines the fetch lifecycle, the fetcher contract and pager options.

use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::merge::{Flatten, MergePolicy, SharedMerge};
use crate::types::ExecutionContext;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

// ============================================================================
// Fetch State
// ============================================================================

/// State of the current or most recent page fetch
#[derive(Debug, Clone, Default)]
pub enum FetchState<T> {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch returned this page
    Success(T),
    /// The last fetch failed
    Error(Arc<Error>),
}

impl<T> FetchState<T> {
    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if nothing has been fetched yet
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if the last fetch succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Check if the last fetch failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Get the last fetched page, if the last fetch succeeded
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Get the last error, if the last fetch failed
    pub fn error(&self) -> Option<&Arc<Error>> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Payload-free status
    pub fn status(&self) -> FetchStatus {
        match self {
            Self::Idle => FetchStatus::Idle,
            Self::Loading => FetchStatus::Loading,
            Self::Success(_) => FetchStatus::Success,
            Self::Error(_) => FetchStatus::Error,
        }
    }
}

/// Fetch state without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

// ============================================================================
// Shared Control Block
// ============================================================================

/// Page key, end-of-data flag and disposal flag shared with fetch contexts
pub(crate) struct Control<P> {
    cursor: Mutex<Cursor<P>>,
    disposed: AtomicBool,
    revision: watch::Sender<u64>,
}

struct Cursor<P> {
    page_key: P,
    end_of_data: bool,
}

impl<P: Clone> Control<P> {
    pub(crate) fn new(initial_page_key: P) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            cursor: Mutex::new(Cursor {
                page_key: initial_page_key,
                end_of_data: false,
            }),
            disposed: AtomicBool::new(false),
            revision,
        }
    }

    pub(crate) fn page_key(&self) -> P {
        self.cursor.lock().page_key.clone()
    }

    pub(crate) fn set_page_key(&self, page_key: P) {
        self.cursor.lock().page_key = page_key;
        self.notify();
    }

    pub(crate) fn end_of_data(&self) -> bool {
        self.cursor.lock().end_of_data
    }

    /// End-of-data only ever moves from false to true
    pub(crate) fn set_end_of_data(&self, end: bool) {
        {
            let mut cursor = self.cursor.lock();
            if cursor.end_of_data == end {
                return;
            }
            if !end {
                debug!("Ignoring attempt to clear end-of-data");
                return;
            }
            cursor.end_of_data = true;
        }
        debug!("End of data reached");
        self.notify();
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Returns true for the call that actually disposed
    pub(crate) fn dispose(&self) -> bool {
        !self.disposed.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

// ============================================================================
// Fetcher Context
// ============================================================================

/// Handle passed to every fetch
///
/// Writes made after the owning pager is disposed are dropped.
pub struct FetcherContext<P> {
    control: Arc<Control<P>>,
}

impl<P> Clone for FetcherContext<P> {
    fn clone(&self) -> Self {
        Self {
            control: Arc::clone(&self.control),
        }
    }
}

impl<P: Clone> FetcherContext<P> {
    pub(crate) fn new(control: Arc<Control<P>>) -> Self {
        Self { control }
    }

    /// Current stored page key
    pub fn page_key(&self) -> P {
        self.control.page_key()
    }

    /// Set the page key used by the next fetch
    pub fn set_page_key(&self, page_key: P) {
        if self.is_disposed() {
            debug!("Pager disposed, dropping page key update");
            return;
        }
        self.control.set_page_key(page_key);
    }

    /// Check if the feed has ended
    pub fn end_of_data(&self) -> bool {
        self.control.end_of_data()
    }

    /// Mark the feed as ended (`false` never clears an ended feed)
    pub fn set_end_of_data(&self, end: bool) {
        if self.is_disposed() {
            debug!("Pager disposed, dropping end-of-data update");
            return;
        }
        self.control.set_end_of_data(end);
    }

    /// Check if the owning pager has been disposed
    pub fn is_disposed(&self) -> bool {
        self.control.is_disposed()
    }
}

impl<P: Clone + fmt::Debug> fmt::Debug for FetcherContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetcherContext")
            .field("page_key", &self.page_key())
            .field("end_of_data", &self.end_of_data())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ============================================================================
// Fetcher Trait
// ============================================================================

/// Caller-supplied function that fetches one page
///
/// Implemented for any `Fn(P, FetcherContext<P>) -> impl Future<Output = Result<T>>`.
#[async_trait]
pub trait PageFetcher<P, T>: Send + Sync {
    /// Fetch the page identified by `page_key`
    async fn fetch(&self, page_key: P, ctx: FetcherContext<P>) -> Result<T>;
}

#[async_trait]
impl<P, T, F, Fut> PageFetcher<P, T> for F
where
    P: Send + 'static,
    T: Send + 'static,
    F: Fn(P, FetcherContext<P>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    async fn fetch(&self, page_key: P, ctx: FetcherContext<P>) -> Result<T> {
        (self)(page_key, ctx).await
    }
}

/// Identity helper that pins a closure to the fetcher signature
///
/// Lets the compiler infer the context type of an un-annotated closure.
pub fn page_fetcher<P, T, F, Fut>(f: F) -> F
where
    F: Fn(P, FetcherContext<P>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    f
}

// ============================================================================
// Page Driver
// ============================================================================

/// Object-safe view of a pager
///
/// The visibility trigger only needs to read the gating flags and kick off
/// the next fetch, so it holds one of these instead of a fully typed pager.
pub trait PageDriver: Send + Sync {
    /// Check if the feed has ended
    fn end_of_data(&self) -> bool;

    /// Check if a fetch is in flight
    fn is_loading(&self) -> bool;

    /// Start the next fetch (no-op when ended or loading)
    fn request_next(&self);

    /// Where the pager runs
    fn execution_context(&self) -> ExecutionContext;
}

// ============================================================================
// Options
// ============================================================================

/// Callback invoked with every fetch failure
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// Options for building a pager
pub struct PagerOptions<P, T, V> {
    /// Page key used by the first fetch
    pub initial_page_key: P,
    /// Serializable settings (window bound, execution context)
    pub config: PagerConfig,
    /// Policy used to build the accumulated view
    pub merge: SharedMerge<T, V>,
    /// Failure callback
    pub on_error: Option<ErrorCallback>,
}

impl<P, T, V> PagerOptions<P, T, V>
where
    T: AsRef<[V]> + 'static,
    V: Clone + 'static,
{
    /// Create options that flatten pages into one view
    pub fn new(initial_page_key: P) -> Self {
        Self::with_merge_policy(initial_page_key, Flatten)
    }
}

impl<P, T, V> PagerOptions<P, T, V> {
    /// Create options with a custom merge policy
    pub fn with_merge_policy(
        initial_page_key: P,
        merge: impl MergePolicy<T, V> + 'static,
    ) -> Self {
        Self {
            initial_page_key,
            config: PagerConfig::default(),
            merge: Arc::new(merge),
            on_error: None,
        }
    }

    /// Replace the merge policy
    #[must_use]
    pub fn with_merge(mut self, merge: impl MergePolicy<T, V> + 'static) -> Self {
        self.merge = Arc::new(merge);
        self
    }

    /// Bound the page window
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = Some(max_pages);
        self
    }

    /// Set the execution context
    #[must_use]
    pub fn with_execution_context(mut self, context: ExecutionContext) -> Self {
        self.config.execution_context = context;
        self
    }

    /// Replace the serializable settings
    #[must_use]
    pub fn with_config(mut self, config: PagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the failure callback
    #[must_use]
    pub fn with_on_error(mut self, on_error: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(on_error));
        self
    }
}

impl<P: fmt::Debug, T, V> fmt::Debug for PagerOptions<P, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerOptions")
            .field("initial_page_key", &self.initial_page_key)
            .field("config", &self.config)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Point-in-time summary of a pager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerStats {
    /// Pages currently held
    pub pages: usize,
    /// Items in the accumulated view
    pub items: usize,
    /// Status of the current or last fetch
    pub status: FetchStatus,
    /// Whether the feed has ended
    pub end_of_data: bool,
    /// Fetches started
    pub fetches_started: u64,
    /// Fetches that returned a page
    pub fetches_succeeded: u64,
    /// Fetches that failed
    pub fetches_failed: u64,
    /// Pages dropped by the window bound
    pub pages_evicted: u64,
}
