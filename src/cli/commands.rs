//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy pager CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scroll a simulated feed until it ends
    Run {
        /// Total number of items in the feed
        #[arg(long, default_value = "100")]
        total: usize,

        /// Items per page
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Keep at most this many pages in memory
        #[arg(long)]
        max_pages: Option<usize>,

        /// Fail the first fetch of this page (0-based)
        #[arg(long)]
        fail_at: Option<usize>,

        /// Simulated latency per fetch in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,

        /// Pager config file (YAML or JSON); flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load and validate a pager config file
    Config {
        /// Config file (YAML or JSON)
        #[arg(long)]
        file: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
