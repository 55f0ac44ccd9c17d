//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PagerConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pager::{Pager, PagerOptions, PagerStats};
use crate::scope::Scope;
use crate::simulate::{FeedConfig, InMemoryViewport, SimulatedFeed};
use crate::trigger::VisibilityTrigger;
use crate::types::{JsonPage, JsonValue};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Element the runner scrolls into view
const SENTINEL: &str = "sentinel";

/// Outcome of scrolling a feed to its end
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Accumulated items left in the window
    pub items: Vec<JsonValue>,
    /// Pager summary after the last fetch
    pub stats: PagerStats,
    /// Messages of failed fetches, in order
    pub errors: Vec<String>,
    /// Visibility events (or direct fetches) issued after the first page
    pub rounds: usize,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                total,
                page_size,
                max_pages,
                fail_at,
                latency_ms,
                config,
            } => {
                let mut pager_config = match config {
                    Some(path) => PagerConfig::from_file(path).with_context(|| {
                        format!("Failed to load pager config '{}'", path.display())
                    })?,
                    None => PagerConfig::new(),
                };
                if max_pages.is_some() {
                    pager_config.max_pages = *max_pages;
                }

                let mut feed = FeedConfig::new(*total, *page_size)
                    .with_latency(Duration::from_millis(*latency_ms));
                if let Some(page) = fail_at {
                    feed = feed.with_fail_at(*page);
                }

                let report = Self::drive(feed, pager_config).await?;
                self.output_report(&report);
                Ok(())
            }
            Commands::Config { file } => {
                let config = PagerConfig::from_file(file)
                    .with_context(|| format!("Invalid config file '{}'", file.display()))?;
                info!(path = %file.display(), "Config is valid");
                self.output_message(&json!({
                    "type": "CONFIG",
                    "config": config,
                }));
                Ok(())
            }
        }
    }

    /// Scroll a simulated feed until it ends
    ///
    /// Binds a sentinel element and keeps scrolling it into view while the
    /// pager is idle. In a server context the trigger never subscribes, so
    /// the pager is driven with direct fetches instead. Failed fetches are
    /// retried by the next round.
    pub async fn drive(feed: FeedConfig, config: PagerConfig) -> Result<RunReport> {
        if feed.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be a positive integer"));
        }
        let max_rounds = feed.total / feed.page_size + 2 + usize::from(feed.fail_at.is_some());

        let scope = Scope::new();
        let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);

        let options: PagerOptions<usize, JsonPage, JsonValue> = PagerOptions::new(0)
            .with_config(config)
            .with_on_error(move |e| {
                warn!(error = %e, "Fetch failed, will retry on next round");
                sink.lock().push(e.to_string());
            });
        let pager = Pager::with_scope(SimulatedFeed::new(feed), options, &scope)?;

        let viewport = Arc::new(InMemoryViewport::new());
        let trigger = VisibilityTrigger::with_scope(pager.clone(), viewport.clone(), &scope);
        let bound = trigger.bind(SENTINEL, true, None).is_some();
        if !bound {
            debug!("Sentinel not observed, fetching directly");
        }

        let mut rounds = 0;
        loop {
            pager.settled().await;
            if pager.end_of_data() {
                break;
            }
            if rounds >= max_rounds {
                scope.dispose();
                return Err(Error::Other(format!("Feed did not end after {rounds} rounds")));
            }
            rounds += 1;
            if bound {
                viewport.enter(SENTINEL);
            } else {
                let _ = pager.fetch_next();
            }
        }

        let report = RunReport {
            items: pager.accumulated(),
            stats: pager.stats(),
            errors: errors.lock().clone(),
            rounds,
        };
        scope.dispose();

        info!(
            items = report.stats.items,
            pages = report.stats.pages,
            evicted = report.stats.pages_evicted,
            "Feed exhausted"
        );
        Ok(report)
    }

    /// Output a report as a stream of messages
    fn output_report(&self, report: &RunReport) {
        for error in &report.errors {
            self.output_message(&json!({
                "type": "LOG",
                "log": { "level": "WARN", "message": error }
            }));
        }
        for record in &report.items {
            self.output_message(&json!({
                "type": "RECORD",
                "record": record,
            }));
        }
        self.output_message(&json!({
            "type": "STATS",
            "stats": report.stats,
            "rounds": report.rounds,
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
