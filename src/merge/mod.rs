//! Merge policy module
//!
//! Supports: one-level flatten (default), whole pages as elements, caller closures
//!
//! # Overview
//!
//! A merge policy combines the accumulated view with one more page. The page
//! store rebuilds its view by folding the policy over every surviving page,
//! starting from an empty vector, whenever the page sequence changes. A policy
//! must therefore give the same answer when replayed over the full history.

mod strategies;
mod types;

pub use strategies::{merge_fn, AppendPages, Flatten, FnMerge};
pub use types::{fold_pages, MergePolicy, SharedMerge};

#[cfg(test)]
mod tests;
