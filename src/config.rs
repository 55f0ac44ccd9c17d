//! Configuration types for pagers
//!
//! Holds the serializable part of the pager options so it can be kept in a
//! YAML or JSON file next to the application config. Closures (fetcher,
//! merge policy, error callback) are supplied in code through
//! [`PagerOptions`](crate::pager::PagerOptions).

use crate::error::{Error, Result};
use crate::types::ExecutionContext;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// Serializable pager settings
///
/// ```yaml
/// max_pages: 5
/// execution_context: interactive
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagerConfig {
    /// Keep at most this many pages in memory (unset = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// Where the pager runs
    #[serde(default)]
    pub execution_context: ExecutionContext,
}

impl PagerConfig {
    /// Create a default (unbounded, interactive) config
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the config for invalid values
    pub fn validate(&self) -> Result<()> {
        self.window().map(|_| ())
    }

    /// Window bound as a non-zero count
    pub fn window(&self) -> Result<Option<NonZeroUsize>> {
        match self.max_pages {
            None => Ok(None),
            Some(max) => NonZeroUsize::new(max)
                .map(Some)
                .ok_or_else(|| Error::invalid_value("max_pages", "must be a positive integer")),
        }
    }

    /// Parse a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }
}
