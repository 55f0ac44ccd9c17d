//! Merge policy types and traits
//!
//! Defines the core merge abstraction used by the page store.

use std::sync::Arc;

/// Core trait for merge policies
///
/// `accumulated` is the view built so far, `page` the next raw page in
/// sequence order. The returned vector becomes the new view.
pub trait MergePolicy<T, V>: Send + Sync {
    /// Combine the accumulated view with one more page
    fn merge(&self, accumulated: Vec<V>, page: &T) -> Vec<V>;
}

/// Merge policy shared between the store and its owner
pub type SharedMerge<T, V> = Arc<dyn MergePolicy<T, V>>;

impl<T, V, M> MergePolicy<T, V> for Arc<M>
where
    M: MergePolicy<T, V> + ?Sized,
{
    fn merge(&self, accumulated: Vec<V>, page: &T) -> Vec<V> {
        (**self).merge(accumulated, page)
    }
}

/// Rebuild an accumulated view from scratch
///
/// Folds `policy` over `pages` in order, starting from an empty view.
pub fn fold_pages<'a, T, V, M>(policy: &M, pages: impl IntoIterator<Item = &'a T>) -> Vec<V>
where
    T: 'a,
    M: MergePolicy<T, V> + ?Sized,
{
    pages
        .into_iter()
        .fold(Vec::new(), |accumulated, page| policy.merge(accumulated, page))
}
