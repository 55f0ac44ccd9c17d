//! Visibility trigger types and traits

use crate::types::ElementId;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Visibility Source
// ============================================================================

/// One visibility change reported by a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityEvent {
    /// Element whose visibility changed
    pub element: ElementId,
    /// Whether the element is now in view
    pub visible: bool,
}

impl VisibilityEvent {
    /// Create an enter event
    pub fn enter(element: impl Into<ElementId>) -> Self {
        Self {
            element: element.into(),
            visible: true,
        }
    }

    /// Create a leave event
    pub fn leave(element: impl Into<ElementId>) -> Self {
        Self {
            element: element.into(),
            visible: false,
        }
    }
}

/// Callback a source invokes for each event on an observed element
pub type VisibilityCallback = Arc<dyn Fn(VisibilityEvent) + Send + Sync>;

/// External intersection observer
///
/// Implementations deliver events for observed elements, in order, by
/// invoking the callback registered for that element.
pub trait VisibilitySource: Send + Sync {
    /// Start observing an element
    fn observe(&self, element: &ElementId, callback: VisibilityCallback);

    /// Stop observing one element
    fn unobserve(&self, element: &ElementId);

    /// Stop observing everything
    fn disconnect(&self);
}

// ============================================================================
// Gate
// ============================================================================

/// Condition checked before a binding fires
#[derive(Clone)]
pub enum Gate {
    /// Fixed answer
    Fixed(bool),
    /// Predicate evaluated on every event
    When(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Gate {
    /// Gate that is always open
    pub fn open() -> Self {
        Self::Fixed(true)
    }

    /// Gate that is always closed
    pub fn closed() -> Self {
        Self::Fixed(false)
    }

    /// Gate backed by a predicate
    pub fn when(predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self::When(Arc::new(predicate))
    }

    /// Evaluate the gate now
    pub fn evaluate(&self) -> bool {
        match self {
            Self::Fixed(open) => *open,
            Self::When(predicate) => predicate(),
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::open()
    }
}

impl From<bool> for Gate {
    fn from(open: bool) -> Self {
        Self::Fixed(open)
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(open) => f.debug_tuple("Fixed").field(open).finish(),
            Self::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Action run when a binding fires (defaults to fetching the next page)
pub type Action = Arc<dyn Fn() + Send + Sync>;
