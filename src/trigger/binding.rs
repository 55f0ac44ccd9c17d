//! Visibility trigger implementation
//!
//! The trigger keeps one binding per element. Source callbacks hold a weak
//! reference back to the trigger so a source never keeps it alive.

use super::types::{Action, Gate, VisibilityCallback, VisibilityEvent, VisibilitySource};
use crate::pager::PageDriver;
use crate::scope::Scope;
use crate::types::ElementId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Binds visibility events to a pager
///
/// Cheap to clone; all clones share the same bindings.
#[derive(Clone)]
pub struct VisibilityTrigger {
    inner: Arc<TriggerInner>,
}

struct TriggerInner {
    driver: Arc<dyn PageDriver>,
    source: Arc<dyn VisibilitySource>,
    bindings: Mutex<HashMap<ElementId, Binding>>,
    disposed: AtomicBool,
    next_id: AtomicU64,
}

struct Binding {
    id: u64,
    gate: Gate,
    action: Option<Action>,
}

/// Removes one binding when asked
///
/// Dropping the handle leaves the binding in place.
#[derive(Debug)]
pub struct BindingHandle {
    element: ElementId,
    id: u64,
    trigger: Weak<TriggerInner>,
}

impl BindingHandle {
    /// Element this binding observes
    pub fn element(&self) -> &ElementId {
        &self.element
    }

    /// Unsubscribe this binding
    ///
    /// Returns false when the binding was already gone or replaced by a
    /// newer bind on the same element.
    pub fn unbind(self) -> bool {
        match self.trigger.upgrade() {
            Some(inner) => inner.remove(&self.element, Some(self.id)),
            None => false,
        }
    }
}

impl VisibilityTrigger {
    /// Create a trigger for `driver` fed by `source`
    pub fn new(driver: impl PageDriver + 'static, source: Arc<dyn VisibilitySource>) -> Self {
        Self {
            inner: Arc::new(TriggerInner {
                driver: Arc::new(driver),
                source,
                bindings: Mutex::new(HashMap::new()),
                disposed: AtomicBool::new(false),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Create a trigger that is disposed together with `scope`
    pub fn with_scope(
        driver: impl PageDriver + 'static,
        source: Arc<dyn VisibilitySource>,
        scope: &Scope,
    ) -> Self {
        let trigger = Self::new(driver, source);
        let owned = trigger.clone();
        scope.on_cleanup(move || owned.dispose());
        trigger
    }

    /// Bind an element
    ///
    /// `action` defaults to fetching the next page. Nothing is subscribed
    /// (and `None` is returned) when the gate is closed at bind time, the
    /// trigger is disposed, or the pager runs in a server context. Binding an
    /// element that is already bound replaces the old binding.
    pub fn bind(
        &self,
        element: impl Into<ElementId>,
        gate: impl Into<Gate>,
        action: Option<Action>,
    ) -> Option<BindingHandle> {
        let element = element.into();
        let gate = gate.into();

        if !self.inner.driver.execution_context().is_interactive() {
            debug!(element = %element, "Server context, skipping bind");
            return None;
        }
        if self.is_disposed() {
            debug!(element = %element, "Trigger disposed, skipping bind");
            return None;
        }
        if !gate.evaluate() {
            debug!(element = %element, "Gate closed at bind time, not observing");
            return None;
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let replaced = self.inner.bindings.lock()
            .insert(element.clone(), Binding { id, gate, action })
            .is_some();
        if replaced {
            self.inner.source.unobserve(&element);
        }

        let weak = Arc::downgrade(&self.inner);
        let callback: VisibilityCallback = Arc::new(move |event: VisibilityEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.handle(&event);
            }
        });
        self.inner.source.observe(&element, callback);
        debug!(element = %element, replaced, "Element bound");

        Some(BindingHandle {
            element,
            id,
            trigger: Arc::downgrade(&self.inner),
        })
    }

    /// Unsubscribe one element
    pub fn unbind(&self, element: &ElementId) -> bool {
        self.inner.remove(element, None)
    }

    /// Check if an element has an active binding
    pub fn is_bound(&self, element: &ElementId) -> bool {
        self.inner.bindings.lock().contains_key(element)
    }

    /// Elements with an active binding, sorted
    pub fn bound_elements(&self) -> Vec<ElementId> {
        let mut elements: Vec<_> = self.inner.bindings.lock().keys().cloned().collect();
        elements.sort();
        elements
    }

    /// Disconnect the source and drop every binding
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.source.disconnect();
        let count = {
            let mut bindings = self.inner.bindings.lock();
            let count = bindings.len();
            bindings.clear();
            count
        };
        debug!(bindings = count, "Visibility trigger disposed");
    }

    /// Check if the trigger has been disposed
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

impl TriggerInner {
    fn handle(&self, event: &VisibilityEvent) {
        if !event.visible || self.disposed.load(Ordering::SeqCst) {
            return;
        }

        // Clone out of the lock; the action may call back into the trigger
        let (gate, action) = {
            let bindings = self.bindings.lock();
            match bindings.get(&event.element) {
                Some(binding) => (binding.gate.clone(), binding.action.clone()),
                None => return,
            }
        };

        if !gate.evaluate() {
            debug!(element = %event.element, "Gate closed, ignoring event");
            return;
        }
        if self.driver.end_of_data() {
            debug!(element = %event.element, "End of data, ignoring event");
            return;
        }
        if self.driver.is_loading() {
            debug!(element = %event.element, "Fetch in flight, ignoring event");
            return;
        }

        debug!(element = %event.element, "Element visible, triggering");
        match action {
            Some(action) => action(),
            None => self.driver.request_next(),
        }
    }

    fn remove(&self, element: &ElementId, id: Option<u64>) -> bool {
        let removed = {
            let mut bindings = self.bindings.lock();
            match bindings.get(element) {
                Some(binding) if id.is_none() || id == Some(binding.id) => {
                    bindings.remove(element);
                    true
                }
                _ => false,
            }
        };
        if removed {
            self.source.unobserve(element);
            debug!(element = %element, "Element unbound");
        }
        removed
    }
}

impl fmt::Debug for VisibilityTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityTrigger")
            .field("bound", &self.bound_elements())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
