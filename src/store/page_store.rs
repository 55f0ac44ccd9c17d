//! Page store implementation
//!
//! The accumulated view is cached and marked dirty on every mutation. The
//! next read rebuilds it by folding the merge policy over the whole surviving
//! sequence, so readers never observe a view that lags behind the pages.

use crate::merge::{fold_pages, Flatten, SharedMerge};
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Ordered page sequence with a bounded window and a derived view
pub struct PageStore<T, V> {
    /// Pages, oldest first
    pages: VecDeque<T>,
    /// Window bound (None = unbounded)
    max_pages: Option<NonZeroUsize>,
    /// Policy used to build the view
    merge: SharedMerge<T, V>,
    /// Cached view
    view: Vec<V>,
    /// Whether the cached view is stale
    dirty: bool,
    /// Bumped on every mutation
    revision: u64,
    /// Pages dropped by the window bound
    evicted: u64,
}

impl<T, V> PageStore<T, V>
where
    T: AsRef<[V]> + 'static,
    V: Clone + 'static,
{
    /// Create a store that flattens pages into one view
    pub fn new(max_pages: Option<NonZeroUsize>) -> Self {
        Self::with_merge(max_pages, Arc::new(Flatten))
    }
}

impl<T, V> PageStore<T, V> {
    /// Create a store with a custom merge policy
    pub fn with_merge(max_pages: Option<NonZeroUsize>, merge: SharedMerge<T, V>) -> Self {
        Self {
            pages: VecDeque::new(),
            max_pages,
            merge,
            view: Vec::new(),
            dirty: false,
            revision: 0,
            evicted: 0,
        }
    }

    /// Append a page to the tail, evicting from the head past the window
    pub fn append(&mut self, record: T) {
        self.pages.push_back(record);
        self.enforce_window();
        self.touch();
    }

    /// Replace the whole sequence
    ///
    /// The window bound still applies: when `records` is longer than
    /// `max_pages`, the oldest entries are dropped.
    pub fn reset(&mut self, records: Vec<T>) {
        self.pages = records.into();
        self.enforce_window();
        self.touch();
    }

    /// Get the accumulated view, rebuilding it if the pages changed
    pub fn accumulated(&mut self) -> &[V] {
        if self.dirty {
            self.view = fold_pages(&*self.merge, &self.pages);
            self.dirty = false;
        }
        &self.view
    }

    /// Get the raw pages, oldest first
    pub fn pages(&self) -> &VecDeque<T> {
        &self.pages
    }

    /// Number of pages currently held
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if no pages are held
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Window bound
    pub fn max_pages(&self) -> Option<NonZeroUsize> {
        self.max_pages
    }

    /// Mutation counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total pages dropped by the window bound
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Check if the cached view needs a rebuild
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn enforce_window(&mut self) {
        let Some(max) = self.max_pages else {
            return;
        };
        let excess = self.pages.len().saturating_sub(max.get());
        if excess > 0 {
            self.pages.drain(..excess);
            self.evicted += excess as u64;
            debug!(evicted = excess, max_pages = max.get(), "Evicted oldest pages");
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

impl<T: Clone, V> PageStore<T, V> {
    /// Clone the raw pages into a vector, oldest first
    pub fn pages_vec(&self) -> Vec<T> {
        self.pages.iter().cloned().collect()
    }
}

impl<T, V> fmt::Debug for PageStore<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageStore")
            .field("pages", &self.pages.len())
            .field("max_pages", &self.max_pages)
            .field("dirty", &self.dirty)
            .field("revision", &self.revision)
            .finish()
    }
}
