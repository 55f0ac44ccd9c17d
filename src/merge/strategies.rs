//! Merge policy implementations

use super::types::MergePolicy;
use std::fmt;

// ============================================================================
// Flatten
// ============================================================================

/// Default policy: concatenate the elements of every page
///
/// Only available when a page is itself a sequence (`T: AsRef<[V]>`).
/// Pages of any other shape need [`AppendPages`] or a custom policy; the
/// compiler rejects the default for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flatten;

impl<T, V> MergePolicy<T, V> for Flatten
where
    T: AsRef<[V]>,
    V: Clone,
{
    fn merge(&self, mut accumulated: Vec<V>, page: &T) -> Vec<V> {
        accumulated.extend_from_slice(page.as_ref());
        accumulated
    }
}

// ============================================================================
// Append Pages
// ============================================================================

/// Keep every raw page as one element of the view (no flattening)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendPages;

impl<T> MergePolicy<T, T> for AppendPages
where
    T: Clone,
{
    fn merge(&self, mut accumulated: Vec<T>, page: &T) -> Vec<T> {
        accumulated.push(page.clone());
        accumulated
    }
}

// ============================================================================
// Closure
// ============================================================================

/// Wraps a caller closure `(accumulated, page) -> accumulated`
#[derive(Clone)]
pub struct FnMerge<F> {
    f: F,
}

impl<F> FnMerge<F> {
    /// Create a new closure policy
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnMerge<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMerge").finish_non_exhaustive()
    }
}

impl<T, V, F> MergePolicy<T, V> for FnMerge<F>
where
    F: Fn(Vec<V>, &T) -> Vec<V> + Send + Sync,
{
    fn merge(&self, accumulated: Vec<V>, page: &T) -> Vec<V> {
        (self.f)(accumulated, page)
    }
}

/// Shorthand for [`FnMerge::new`]
pub fn merge_fn<T, V, F>(f: F) -> FnMerge<F>
where
    F: Fn(Vec<V>, &T) -> Vec<V> + Send + Sync,
{
    FnMerge::new(f)
}
