//! Common types used throughout Solidafy Pager
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// A page made of JSON records, the shape used by the simulated feed
pub type JsonPage = Vec<JsonValue>;

// ============================================================================
// Execution Context
// ============================================================================

/// Where the pager is running
///
/// Server contexts still fetch, but never wire up visibility observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Interactive host with a viewport
    #[default]
    Interactive,
    /// Non-interactive rendering (server side)
    Server,
}

impl ExecutionContext {
    /// Check if visibility wiring is available
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

// ============================================================================
// Element Identity
// ============================================================================

/// Identifier for an element observed by a visibility source
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new element id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
