//! CLI module
//!
//! Command-line interface for driving a pager against a simulated feed.
//!
//! # Commands
//!
//! - `run` - Scroll a simulated feed to its end and print the result
//! - `config` - Load and validate a pager config file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{RunReport, Runner};
