//! Tests for merge module

use super::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

// ============================================================================
// Flatten Tests
// ============================================================================

#[test]
fn test_flatten_concatenates_one_level() {
    let pages = vec![vec!["a", "b"], vec![], vec!["c"]];
    let view: Vec<&str> = fold_pages(&Flatten, &pages);
    assert_eq!(view, vec!["a", "b", "c"]);
}

#[test]
fn test_flatten_keeps_nested_sequences() {
    let pages = vec![vec![vec![1, 2]], vec![vec![3]]];
    let view: Vec<Vec<i32>> = fold_pages(&Flatten, &pages);
    assert_eq!(view, vec![vec![1, 2], vec![3]]);
}

#[test]
fn test_flatten_empty_history() {
    let pages: Vec<Vec<u32>> = Vec::new();
    let view: Vec<u32> = fold_pages(&Flatten, &pages);
    assert!(view.is_empty());
}

// ============================================================================
// AppendPages Tests
// ============================================================================

#[test]
fn test_append_pages_keeps_raw_pages() {
    let pages = vec![vec!["a", "b"], vec!["c", "d"]];
    let view: Vec<Vec<&str>> = fold_pages(&AppendPages, &pages);
    assert_eq!(view.len(), 2);
    assert_eq!(view[0], vec!["a", "b"]);
    assert_eq!(view[1], vec!["c", "d"]);
}

#[test]
fn test_append_pages_non_sequence_page() {
    #[derive(Debug, Clone, PartialEq)]
    struct Summary {
        total: u32,
    }

    let pages = vec![Summary { total: 3 }, Summary { total: 5 }];
    let view: Vec<Summary> = fold_pages(&AppendPages, &pages);
    assert_eq!(view, pages);
}

// ============================================================================
// Closure Tests
// ============================================================================

#[test]
fn test_closure_policy() {
    let policy = merge_fn(|mut acc: Vec<u32>, page: &Vec<u32>| {
        acc.push(page.iter().sum());
        acc
    });

    let pages = vec![vec![1, 2], vec![3, 4], vec![5]];
    let view: Vec<u32> = fold_pages(&policy, &pages);
    assert_eq!(view, vec![3, 7, 5]);
}

#[test]
fn test_closure_policy_replays_deterministically() {
    let policy = merge_fn(|mut acc: Vec<String>, page: &String| {
        acc.insert(0, page.clone());
        acc
    });

    let pages = vec!["one".to_string(), "two".to_string()];
    let first: Vec<String> = fold_pages(&policy, &pages);
    let second: Vec<String> = fold_pages(&policy, &pages);
    assert_eq!(first, second);
    assert_eq!(first, vec!["two".to_string(), "one".to_string()]);
}

#[test]
fn test_shared_policy_dispatch() {
    let shared: SharedMerge<Vec<u8>, u8> = Arc::new(Flatten);
    let pages = vec![vec![1u8], vec![2, 3]];
    let view: Vec<u8> = fold_pages(&shared, &pages);
    assert_eq!(view, vec![1, 2, 3]);
}

#[test]
fn test_fn_merge_debug() {
    let policy = FnMerge::new(|acc: Vec<u8>, _page: &u8| acc);
    assert!(format!("{policy:?}").starts_with("FnMerge"));
}
