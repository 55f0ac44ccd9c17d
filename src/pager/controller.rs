//! Pager implementation
//!
//! A pager runs at most one fetch at a time on the Tokio runtime it was
//! created on. Fetches are spawned tasks; when one settles it either appends
//! its page to the store or records the error. A panicking fetcher counts as
//! a failed fetch. Nothing is written once the pager is disposed.

use super::types::{
    Control, ErrorCallback, FetchState, FetcherContext, PageDriver, PageFetcher, PagerOptions,
    PagerStats,
};
use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::store::PageStore;
use crate::types::ExecutionContext;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};

/// Pagination controller
///
/// Cheap to clone; all clones drive the same state.
pub struct Pager<P, T, V> {
    inner: Arc<PagerInner<P, T, V>>,
}

struct PagerInner<P, T, V> {
    control: Arc<Control<P>>,
    fetcher: Arc<dyn PageFetcher<P, T>>,
    data: Mutex<PagerData<T, V>>,
    on_error: Option<ErrorCallback>,
    execution_context: ExecutionContext,
    runtime: Handle,
}

struct PagerData<T, V> {
    store: PageStore<T, V>,
    fetch_state: FetchState<T>,
    in_flight: Option<AbortHandle>,
    fetches_started: u64,
    fetches_succeeded: u64,
    fetches_failed: u64,
}

/// Handle to a spawned fetch
#[derive(Debug)]
pub struct FetchHandle {
    handle: JoinHandle<()>,
}

impl FetchHandle {
    /// Wait for the fetch to settle
    ///
    /// Returns false when the fetch was aborted by disposal or panicked.
    pub async fn wait(self) -> bool {
        self.handle.await.is_ok()
    }

    /// Check if the fetch task has finished
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<P, T, V> Clone for Pager<P, T, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, T, V> Pager<P, T, V>
where
    P: Clone + Send + Sync + fmt::Debug + 'static,
    T: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a pager and start fetching the first page
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        fetcher: impl PageFetcher<P, T> + 'static,
        options: PagerOptions<P, T, V>,
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::config(format!("Pager requires a Tokio runtime: {e}")))?;
        let window = options.config.window()?;

        let pager = Self {
            inner: Arc::new(PagerInner {
                control: Arc::new(Control::new(options.initial_page_key)),
                fetcher: Arc::new(fetcher),
                data: Mutex::new(PagerData {
                    store: PageStore::with_merge(window, options.merge),
                    fetch_state: FetchState::Idle,
                    in_flight: None,
                    fetches_started: 0,
                    fetches_succeeded: 0,
                    fetches_failed: 0,
                }),
                on_error: options.on_error,
                execution_context: options.config.execution_context,
                runtime,
            }),
        };

        debug!(
            max_pages = ?window,
            context = ?pager.inner.execution_context,
            "Pager created"
        );
        pager.fetch_next();
        Ok(pager)
    }

    /// Create a pager that is disposed together with `scope`
    pub fn with_scope(
        fetcher: impl PageFetcher<P, T> + 'static,
        options: PagerOptions<P, T, V>,
        scope: &Scope,
    ) -> Result<Self> {
        let pager = Self::new(fetcher, options)?;
        let owned = pager.clone();
        scope.on_cleanup(move || owned.dispose());
        Ok(pager)
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Fetch the next page
    ///
    /// Returns `None` without calling the fetcher when the feed has ended, a
    /// fetch is already in flight, or the pager is disposed.
    pub fn fetch_next(&self) -> Option<FetchHandle> {
        if self.inner.control.end_of_data() {
            debug!("End of data, skipping fetch");
            return None;
        }
        self.start_fetch(self.inner.control.page_key())
    }

    /// Fetch a page with an explicit key
    ///
    /// Ignores the end-of-data flag but still respects the single flight
    /// rule. The stored page key is left alone unless the fetcher moves it.
    pub fn refetch_with(&self, page_key: P) -> Option<FetchHandle> {
        self.start_fetch(page_key)
    }

    fn start_fetch(&self, page_key: P) -> Option<FetchHandle> {
        if self.inner.control.is_disposed() {
            debug!("Pager disposed, skipping fetch");
            return None;
        }

        let mut data = self.inner.data.lock();
        if data.fetch_state.is_loading() {
            debug!("Fetch already in flight, skipping");
            return None;
        }
        data.fetch_state = FetchState::Loading;
        data.fetches_started += 1;
        debug!(page_key = ?page_key, fetch = data.fetches_started, "Fetching page");

        let ctx = FetcherContext::new(Arc::clone(&self.inner.control));
        let inner = Arc::clone(&self.inner);
        // Spawned while holding the lock so the task cannot settle before
        // its abort handle is recorded
        let handle = self.inner.runtime.spawn(async move {
            let result = AssertUnwindSafe(inner.fetcher.fetch(page_key, ctx))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(Error::fetch(format!(
                        "fetcher panicked: {}",
                        panic_message(&*payload)
                    )))
                });
            inner.settle(result);
        });
        data.in_flight = Some(handle.abort_handle());
        drop(data);

        self.inner.control.notify();
        Some(FetchHandle { handle })
    }

    /// Wait until no fetch is in flight
    pub async fn settled(&self) {
        let mut changes = self.subscribe();
        while self.is_loading() && !self.is_disposed() {
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Accumulated view of all held pages
    pub fn accumulated(&self) -> Vec<V> {
        self.inner.data.lock().store.accumulated().to_vec()
    }

    /// Read the accumulated view without cloning it
    pub fn with_accumulated<R>(&self, f: impl FnOnce(&[V]) -> R) -> R {
        let mut data = self.inner.data.lock();
        f(data.store.accumulated())
    }

    /// Raw pages, oldest first
    pub fn pages(&self) -> Vec<T> {
        self.inner.data.lock().store.pages_vec()
    }

    /// Replace the raw pages
    pub fn set_pages(&self, pages: Vec<T>) {
        self.inner.data.lock().store.reset(pages);
        self.inner.control.notify();
    }

    /// State of the current or last fetch
    pub fn fetch_state(&self) -> FetchState<T> {
        self.inner.data.lock().fetch_state.clone()
    }

    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.inner.data.lock().fetch_state.is_loading()
    }

    /// Page key the next fetch will use
    pub fn page_key(&self) -> P {
        self.inner.control.page_key()
    }

    /// Set the page key the next fetch will use
    pub fn set_page_key(&self, page_key: P) {
        self.inner.control.set_page_key(page_key);
    }

    /// Check if the feed has ended
    pub fn end_of_data(&self) -> bool {
        self.inner.control.end_of_data()
    }

    /// Mark the feed as ended (`false` never clears an ended feed)
    pub fn set_end_of_data(&self, end: bool) {
        self.inner.control.set_end_of_data(end);
    }

    /// Where the pager runs
    pub fn execution_context(&self) -> ExecutionContext {
        self.inner.execution_context
    }

    /// Receiver that changes on every state transition
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.control.subscribe()
    }

    /// Point-in-time summary
    pub fn stats(&self) -> PagerStats {
        let mut data = self.inner.data.lock();
        let items = data.store.accumulated().len();
        PagerStats {
            pages: data.store.len(),
            items,
            status: data.fetch_state.status(),
            end_of_data: self.inner.control.end_of_data(),
            fetches_started: data.fetches_started,
            fetches_succeeded: data.fetches_succeeded,
            fetches_failed: data.fetches_failed,
            pages_evicted: data.store.evicted(),
        }
    }

    // ========================================================================
    // Disposal
    // ========================================================================

    /// Stop the pager
    ///
    /// Aborts the in-flight fetch; results that still arrive are dropped.
    pub fn dispose(&self) {
        if !self.inner.control.dispose() {
            return;
        }
        {
            let mut data = self.inner.data.lock();
            if let Some(in_flight) = data.in_flight.take() {
                in_flight.abort();
            }
            if data.fetch_state.is_loading() {
                data.fetch_state = FetchState::Idle;
            }
        }
        debug!("Pager disposed");
        self.inner.control.notify();
    }

    /// Check if the pager has been disposed
    pub fn is_disposed(&self) -> bool {
        self.inner.control.is_disposed()
    }
}

impl<P, T, V> PagerInner<P, T, V>
where
    P: Clone,
    T: Clone,
{
    fn settle(&self, result: Result<T>) {
        let mut data = self.data.lock();
        data.in_flight = None;
        if self.control.is_disposed() {
            debug!("Fetch settled after disposal, dropping result");
            return;
        }

        match result {
            Ok(record) => {
                data.fetch_state = FetchState::Success(record.clone());
                data.fetches_succeeded += 1;
                data.store.append(record);
                debug!(pages = data.store.len(), "Page fetched");
                drop(data);
            }
            Err(err) => {
                let err = Arc::new(err);
                data.fetch_state = FetchState::Error(Arc::clone(&err));
                data.fetches_failed += 1;
                drop(data);

                warn!(error = %err, "Page fetch failed");
                if let Some(on_error) = &self.on_error {
                    on_error(&err);
                }
            }
        }
        self.control.notify();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl<P, T, V> PageDriver for Pager<P, T, V>
where
    P: Clone + Send + Sync + fmt::Debug + 'static,
    T: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn end_of_data(&self) -> bool {
        Pager::end_of_data(self)
    }

    fn is_loading(&self) -> bool {
        Pager::is_loading(self)
    }

    fn request_next(&self) {
        let _ = self.fetch_next();
    }

    fn execution_context(&self) -> ExecutionContext {
        Pager::execution_context(self)
    }
}

impl<P, T, V> fmt::Debug for Pager<P, T, V>
where
    P: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.data.lock();
        f.debug_struct("Pager")
            .field("page_key", &self.inner.control.page_key())
            .field("end_of_data", &self.inner.control.end_of_data())
            .field("status", &data.fetch_state.status())
            .field("store", &data.store)
            .field("disposed", &self.inner.control.is_disposed())
            .finish()
    }
}
