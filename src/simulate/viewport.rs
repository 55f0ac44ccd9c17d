//! In-memory visibility source

use crate::trigger::{VisibilityCallback, VisibilityEvent, VisibilitySource};
use crate::types::ElementId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Visibility source driven by hand or from a channel
#[derive(Default)]
pub struct InMemoryViewport {
    observers: Mutex<HashMap<ElementId, VisibilityCallback>>,
    disconnects: AtomicUsize,
}

impl InMemoryViewport {
    /// Create an empty viewport
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event
    ///
    /// Returns false when nobody observes the element.
    pub fn emit(&self, event: VisibilityEvent) -> bool {
        // Released before the callback runs so it can (un)observe freely
        let callback = self.observers.lock().get(&event.element).cloned();
        match callback {
            Some(callback) => {
                callback(event);
                true
            }
            None => false,
        }
    }

    /// Report that an element scrolled into view
    pub fn enter(&self, element: impl Into<ElementId>) -> bool {
        self.emit(VisibilityEvent::enter(element))
    }

    /// Report that an element scrolled out of view
    pub fn leave(&self, element: impl Into<ElementId>) -> bool {
        self.emit(VisibilityEvent::leave(element))
    }

    /// Deliver events from a channel until it closes
    ///
    /// Yields between events so fetches started by one event can make
    /// progress before the next arrives. Returns the number delivered.
    pub async fn pump(&self, mut events: mpsc::UnboundedReceiver<VisibilityEvent>) -> usize {
        let mut delivered = 0;
        while let Some(event) = events.recv().await {
            if self.emit(event) {
                delivered += 1;
            }
            tokio::task::yield_now().await;
        }
        delivered
    }

    /// Check if an element is observed
    pub fn is_observed(&self, element: &ElementId) -> bool {
        self.observers.lock().contains_key(element)
    }

    /// Number of observed elements
    pub fn observed_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Number of `disconnect` calls
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl VisibilitySource for InMemoryViewport {
    fn observe(&self, element: &ElementId, callback: VisibilityCallback) {
        self.observers.lock().insert(element.clone(), callback);
    }

    fn unobserve(&self, element: &ElementId) {
        self.observers.lock().remove(element);
    }

    fn disconnect(&self) {
        self.observers.lock().clear();
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for InMemoryViewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryViewport")
            .field("observed", &self.observed_count())
            .field("disconnects", &self.disconnect_count())
            .finish()
    }
}
