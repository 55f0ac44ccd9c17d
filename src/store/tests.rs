//! Tests for page store module

use super::*;
use crate::merge::{merge_fn, AppendPages};
use pretty_assertions::assert_eq;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_case::test_case;

fn window(n: usize) -> Option<NonZeroUsize> {
    NonZeroUsize::new(n)
}

// ============================================================================
// Append Tests
// ============================================================================

#[test]
fn test_append_flattens_in_fetch_order() {
    let mut store: PageStore<Vec<&str>, &str> = PageStore::new(None);
    store.append(vec!["a", "b"]);
    assert_eq!(store.accumulated(), &["a", "b"]);

    store.append(vec!["c", "d"]);
    assert_eq!(store.accumulated(), &["a", "b", "c", "d"]);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_unbounded_store_keeps_everything() {
    let mut store: PageStore<Vec<u32>, u32> = PageStore::new(None);
    for i in 0..50 {
        store.append(vec![i]);
    }
    assert_eq!(store.len(), 50);
    assert_eq!(store.accumulated().len(), 50);
}

#[test]
fn test_window_evicts_oldest_first() {
    let mut store: PageStore<Vec<&str>, &str> = PageStore::new(window(2));
    store.append(vec!["p1"]);
    store.append(vec!["p2"]);
    store.append(vec!["p3"]);

    assert_eq!(store.len(), 2);
    assert_eq!(store.pages_vec(), vec![vec!["p2"], vec!["p3"]]);
    assert_eq!(store.accumulated(), &["p2", "p3"]);
    assert_eq!(store.evicted(), 1);
}

#[test_case(1, 5 ; "single page window")]
#[test_case(3, 10 ; "window smaller than history")]
#[test_case(4, 4 ; "window equal to history")]
#[test_case(8, 3 ; "window larger than history")]
fn test_window_keeps_most_recent(max: usize, fetched: u32) {
    let mut store: PageStore<Vec<u32>, u32> = PageStore::new(window(max));
    for i in 0..fetched {
        store.append(vec![i]);
        assert!(store.len() <= max);
    }

    let kept = (fetched as usize).min(max);
    let expected: Vec<u32> = (fetched - kept as u32..fetched).collect();
    assert_eq!(store.len(), kept);
    assert_eq!(store.accumulated(), expected.as_slice());
}

// ============================================================================
// Reset Tests
// ============================================================================

#[test]
fn test_reset_replaces_sequence() {
    let mut store: PageStore<Vec<u32>, u32> = PageStore::new(None);
    store.append(vec![1, 2]);
    store.reset(vec![vec![9], vec![8, 7]]);

    assert_eq!(store.len(), 2);
    assert_eq!(store.accumulated(), &[9, 8, 7]);
}

#[test]
fn test_reset_respects_window() {
    let mut store: PageStore<Vec<u32>, u32> = PageStore::new(window(2));
    store.reset(vec![vec![1], vec![2], vec![3]]);

    assert_eq!(store.pages_vec(), vec![vec![2], vec![3]]);
}

#[test]
fn test_reset_to_empty() {
    let mut store: PageStore<Vec<u32>, u32> = PageStore::new(None);
    store.append(vec![1]);
    store.reset(Vec::new());

    assert!(store.is_empty());
    assert!(store.accumulated().is_empty());
}

// ============================================================================
// View Tests
// ============================================================================

#[test]
fn test_view_is_cached_until_mutation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let policy = merge_fn(move |mut acc: Vec<u32>, page: &Vec<u32>| {
        counter.fetch_add(1, Ordering::SeqCst);
        acc.extend(page);
        acc
    });

    let mut store: PageStore<Vec<u32>, u32> = PageStore::with_merge(None, Arc::new(policy));
    store.append(vec![1]);
    store.append(vec![2]);
    assert!(store.is_dirty());

    assert_eq!(store.accumulated(), &[1, 2]);
    assert_eq!(store.accumulated(), &[1, 2]);
    // One rebuild, folded over both pages
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!store.is_dirty());
}

#[test]
fn test_custom_merge_folds_full_history() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let policy = merge_fn(move |mut acc: Vec<u32>, page: &Vec<u32>| {
        counter.fetch_add(1, Ordering::SeqCst);
        acc.extend(page);
        acc
    });

    let mut store: PageStore<Vec<u32>, u32> = PageStore::with_merge(window(3), Arc::new(policy));
    for i in 0..4 {
        store.append(vec![i]);
        let _ = store.accumulated();
    }

    // 1 + 2 + 3 + 3: every read replays the surviving window from empty
    assert_eq!(calls.load(Ordering::SeqCst), 9);
    assert_eq!(store.accumulated(), &[1, 2, 3]);
}

#[test]
fn test_custom_merge_sees_trimmed_window() {
    let mut store: PageStore<Vec<&str>, Vec<&str>> =
        PageStore::with_merge(window(2), Arc::new(AppendPages));
    store.append(vec!["a"]);
    store.append(vec!["b"]);
    store.append(vec!["c"]);

    assert_eq!(store.accumulated(), &[vec!["b"], vec!["c"]]);
}

#[test]
fn test_revision_bumps_on_mutation() {
    let mut store: PageStore<Vec<u32>, u32> = PageStore::new(None);
    assert_eq!(store.revision(), 0);

    store.append(vec![1]);
    store.reset(vec![vec![2]]);
    let _ = store.accumulated();
    assert_eq!(store.revision(), 2);
}

#[test]
fn test_debug_output() {
    let store: PageStore<Vec<u32>, u32> = PageStore::new(window(4));
    let debug = format!("{store:?}");
    assert!(debug.contains("PageStore"));
    assert!(debug.contains("revision: 0"));
}
