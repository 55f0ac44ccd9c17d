//! Owner scopes and cleanup registration
//!
//! A `Scope` collects cleanup callbacks from the pager and the visibility
//! trigger. Disposing the scope runs every callback exactly once, newest
//! first. Dropping the last handle disposes it as well.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

type Cleanup = Box<dyn FnOnce() + Send>;

/// Cloneable handle to an owner scope
#[derive(Clone, Default)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

#[derive(Default)]
struct ScopeInner {
    cleanups: Mutex<Vec<Cleanup>>,
    disposed: AtomicBool,
}

impl Scope {
    /// Create a new live scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback to run when the scope is disposed
    ///
    /// Registering on an already disposed scope runs the callback immediately.
    pub fn on_cleanup(&self, cleanup: impl FnOnce() + Send + 'static) {
        if self.is_disposed() {
            cleanup();
            return;
        }
        self.inner.cleanups.lock().push(Box::new(cleanup));
    }

    /// Run all registered cleanups
    ///
    /// Later calls are no-ops.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.run_cleanups();
    }

    /// Check if the scope has been disposed
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Number of cleanups waiting to run
    pub fn pending_cleanups(&self) -> usize {
        self.inner.cleanups.lock().len()
    }
}

impl ScopeInner {
    fn run_cleanups(&self) {
        // Take the list first so callbacks may touch the scope again
        let cleanups = std::mem::take(&mut *self.cleanups.lock());
        debug!(count = cleanups.len(), "Disposing scope");
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.run_cleanups();
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("disposed", &self.is_disposed())
            .field("pending_cleanups", &self.pending_cleanups())
            .finish()
    }
}
