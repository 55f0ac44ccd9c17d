//! Integration tests using the simulated feed and viewport
//!
//! Tests the full end-to-end flow: fetcher → pager → page store → trigger

use clap::Parser;
use futures::future::{ready, Ready};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use solidafy_pager::cli::{Cli, Runner};
use solidafy_pager::simulate::{FeedConfig, InMemoryViewport, SimulatedFeed};
use solidafy_pager::{
    page_fetcher, AppendPages, Error, ExecutionContext, FetcherContext, Gate, PagerConfig, Pager,
    PagerOptions, Scope, VisibilityTrigger,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Page = Vec<&'static str>;

/// Fetcher over fixed pages keyed by index; ends the feed on the last page
fn fixed_pages(
    pages: Vec<Page>,
    calls: Arc<AtomicUsize>,
) -> impl Fn(usize, FetcherContext<usize>) -> Ready<solidafy_pager::Result<Page>> + Send + Sync {
    page_fetcher(move |index: usize, ctx: FetcherContext<usize>| {
        calls.fetch_add(1, Ordering::SeqCst);
        let page = pages.get(index).cloned().unwrap_or_default();
        if index + 1 >= pages.len() {
            ctx.set_end_of_data(true);
        } else {
            ctx.set_page_key(index + 1);
        }
        ready(Ok(page))
    })
}

// ============================================================================
// Controller Scenarios
// ============================================================================

#[tokio::test]
async fn test_two_pages_flatten_in_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = fixed_pages(vec![vec!["a", "b"], vec!["c", "d"]], calls.clone());
    let pager: Pager<usize, Page, &str> = Pager::new(fetcher, PagerOptions::new(0)).unwrap();

    pager.settled().await;
    assert_eq!(pager.accumulated(), vec!["a", "b"]);

    pager.fetch_next();
    pager.settled().await;
    assert_eq!(pager.accumulated(), vec!["a", "b", "c", "d"]);
    assert!(pager.end_of_data());

    // Ended feeds never reach the fetcher again
    assert!(pager.fetch_next().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_window_keeps_newest_pages() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = fixed_pages(vec![vec!["p1"], vec!["p2"], vec!["p3"]], calls);
    let pager: Pager<usize, Page, &str> =
        Pager::new(fetcher, PagerOptions::new(0).with_max_pages(2)).unwrap();

    while !pager.end_of_data() {
        pager.settled().await;
        pager.fetch_next();
    }
    pager.settled().await;

    assert_eq!(pager.pages(), vec![vec!["p2"], vec!["p3"]]);
    assert_eq!(pager.accumulated(), vec!["p2", "p3"]);
    assert_eq!(pager.stats().pages_evicted, 1);
}

#[tokio::test]
async fn test_raw_page_merge() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = fixed_pages(vec![vec!["a", "b"], vec!["c"]], calls);
    let pager: Pager<usize, Page, Page> =
        Pager::new(fetcher, PagerOptions::with_merge_policy(0, AppendPages)).unwrap();

    pager.settled().await;
    pager.fetch_next();
    pager.settled().await;

    let view = pager.accumulated();
    assert_eq!(view.len(), 2);
    assert_eq!(view, vec![vec!["a", "b"], vec!["c"]]);
}

#[tokio::test]
async fn test_rejection_calls_on_error_once() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let fetcher = page_fetcher(move |page: usize, ctx: FetcherContext<usize>| {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if call == 1 {
                return Err(Error::fetch("backend unavailable"));
            }
            ctx.set_page_key(page + 1);
            Ok(vec![page as u64])
        }
    });
    let options = PagerOptions::new(0).with_on_error(move |e: &Error| {
        sink.lock().push(e.to_string());
    });
    let pager: Pager<usize, Vec<u64>, u64> = Pager::new(fetcher, options).unwrap();

    pager.settled().await;
    pager.fetch_next();
    pager.settled().await;

    assert_eq!(errors.lock().len(), 1);
    assert!(errors.lock()[0].contains("backend unavailable"));
    assert_eq!(pager.pages(), vec![vec![0]]);
    assert!(pager.fetch_state().is_error());

    // The next call retries the same key
    pager.fetch_next();
    pager.settled().await;
    assert_eq!(pager.accumulated(), vec![0, 1]);
    assert_eq!(errors.lock().len(), 1);
}

#[test]
fn test_pager_requires_runtime() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = fixed_pages(vec![vec!["a"]], calls.clone());
    let err = Pager::<usize, Page, &str>::new(fetcher, PagerOptions::new(0)).unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Visibility Scenarios
// ============================================================================

#[tokio::test]
async fn test_infinite_scroll_over_simulated_feed() {
    let scope = Scope::new();
    let feed = SimulatedFeed::new(FeedConfig::new(42, 10));
    let pager: Pager<usize, Vec<serde_json::Value>, serde_json::Value> =
        Pager::with_scope(feed, PagerOptions::new(0).with_max_pages(3), &scope).unwrap();

    let viewport = Arc::new(InMemoryViewport::new());
    let trigger = VisibilityTrigger::with_scope(pager.clone(), viewport.clone(), &scope);
    let handle = trigger.bind("sentinel", Gate::open(), None);
    assert!(handle.is_some());

    while !pager.end_of_data() {
        pager.settled().await;
        viewport.leave("sentinel");
        viewport.enter("sentinel");
    }
    pager.settled().await;

    let items = pager.accumulated();
    assert_eq!(items.len(), 22);
    assert_eq!(items[0], json!({ "id": 20, "title": "Item 20" }));
    assert_eq!(items[21]["id"], 41);
    assert_eq!(pager.stats().fetches_succeeded, 5);

    scope.dispose();
    assert!(pager.is_disposed());
    assert!(trigger.is_disposed());
    assert_eq!(viewport.observed_count(), 0);
    assert!(!viewport.enter("sentinel"));
    assert_eq!(pager.stats().fetches_started, 5);
}

#[tokio::test]
async fn test_scope_disposal_drops_in_flight_result() {
    let scope = Scope::new();
    let feed = SimulatedFeed::new(FeedConfig::new(10, 5).with_latency(Duration::from_secs(60)));
    let pager: Pager<usize, Vec<serde_json::Value>, serde_json::Value> =
        Pager::with_scope(feed, PagerOptions::new(0), &scope).unwrap();
    assert!(pager.is_loading());

    scope.dispose();
    pager.settled().await;

    assert!(pager.pages().is_empty());
    assert_eq!(pager.page_key(), 0);
    assert!(pager.fetch_next().is_none());
}

#[tokio::test]
async fn test_server_context_never_subscribes() {
    let feed = SimulatedFeed::new(FeedConfig::new(30, 10));
    let options = PagerOptions::new(0).with_execution_context(ExecutionContext::Server);
    let pager: Pager<usize, Vec<serde_json::Value>, serde_json::Value> =
        Pager::new(feed, options).unwrap();
    pager.settled().await;

    let viewport = Arc::new(InMemoryViewport::new());
    let trigger = VisibilityTrigger::new(pager.clone(), viewport.clone());
    assert!(trigger.bind("sentinel", true, None).is_none());
    assert!(!viewport.enter("sentinel"));

    // Direct calls still work
    pager.fetch_next();
    pager.settled().await;
    assert_eq!(pager.accumulated().len(), 20);
}

// ============================================================================
// Runner Tests
// ============================================================================

#[tokio::test]
async fn test_runner_drives_feed_to_end() {
    let report = Runner::drive(FeedConfig::new(35, 10), PagerConfig::new())
        .await
        .unwrap();

    assert_eq!(report.items.len(), 35);
    assert_eq!(report.rounds, 3);
    assert!(report.stats.end_of_data);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_runner_retries_failed_page() {
    let config = PagerConfig {
        max_pages: Some(2),
        ..PagerConfig::default()
    };
    let report = Runner::drive(FeedConfig::new(50, 10).with_fail_at(2), config)
        .await
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.stats.fetches_failed, 1);
    assert_eq!(report.stats.fetches_succeeded, 5);
    assert_eq!(report.stats.pages, 2);
    assert_eq!(report.items.len(), 20);
    assert_eq!(report.items[0]["id"], 30);
}

#[tokio::test]
async fn test_runner_server_context_fetches_directly() {
    let config = PagerConfig {
        execution_context: ExecutionContext::Server,
        ..PagerConfig::default()
    };
    let report = Runner::drive(FeedConfig::new(25, 10), config).await.unwrap();

    assert_eq!(report.items.len(), 25);
    assert_eq!(report.rounds, 2);
}

#[test]
fn test_runner_rejects_zero_page_size() {
    let result = tokio_test::block_on(Runner::drive(FeedConfig::new(10, 0), PagerConfig::new()));
    assert!(matches!(
        result,
        Err(Error::InvalidConfigValue { ref field, .. }) if field == "page_size"
    ));
}

#[tokio::test]
async fn test_runner_reports_config_path() {
    let runner = Runner::new(Cli::parse_from([
        "solidafy-pager",
        "run",
        "--config",
        "/definitely/not/here.yaml",
    ]));
    let err = runner.run().await.unwrap_err();

    assert!(matches!(err, Error::Other(_)));
    let message = err.to_string();
    assert!(message.contains("Failed to load pager config '/definitely/not/here.yaml'"));
    assert!(message.contains("File not found"));
}
