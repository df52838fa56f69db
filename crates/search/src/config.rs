//! Engine configuration.
//!
//! Loaded from TOML with per-field defaults; immutable once handed to the
//! engine.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Standard locations searched by [`SearchConfig::discover`].
const CONFIG_CANDIDATES: [&str; 3] = ["pantry.toml", ".pantry.toml", ".config/pantry.toml"];

/// Tuning knobs for one search session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this skip scoring and browse the whole catalog
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Size of the relevance window kept after scoring
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Quiet period before a submitted query executes
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Items scoring at or below this are dropped
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Maximum number of remembered queries
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Number of autocomplete suggestions emitted per search
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Key under which history is persisted
    #[serde(default = "default_history_key")]
    pub history_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_chars: default_min_query_chars(),
            max_results: default_max_results(),
            debounce_ms: default_debounce_ms(),
            fuzzy_threshold: default_fuzzy_threshold(),
            history_capacity: default_history_capacity(),
            suggestion_limit: default_suggestion_limit(),
            history_key: default_history_key(),
        }
    }
}

fn default_min_query_chars() -> usize {
    2
}

fn default_max_results() -> usize {
    50
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_fuzzy_threshold() -> f64 {
    0.6
}

fn default_history_capacity() -> usize {
    10
}

fn default_suggestion_limit() -> usize {
    5
}

fn default_history_key() -> String {
    "search_history".to_string()
}

impl SearchConfig {
    /// Debounce window as a [`Duration`].
    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from an explicit path, else the first standard location that
    /// exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::discover() {
                Some(found) => {
                    tracing::debug!(path = found, "Loading search config");
                    Self::from_file(found)
                }
                None => Ok(Self::default()),
            },
        }
    }

    /// Find a configuration file in standard locations.
    pub fn discover() -> Option<&'static str> {
        CONFIG_CANDIDATES
            .into_iter()
            .find(|candidate| Path::new(candidate).exists())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(SearchError::Config("max_results must be at least 1".into()));
        }
        if !self.fuzzy_threshold.is_finite() || self.fuzzy_threshold < 0.0 {
            return Err(SearchError::Config(format!(
                "fuzzy_threshold must be a non-negative number, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.history_capacity == 0 {
            return Err(SearchError::Config("history_capacity must be at least 1".into()));
        }
        if self.history_key.trim().is_empty() {
            return Err(SearchError::Config("history_key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchErrorCode;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.min_query_chars, 2);
        assert_eq!(config.max_results, 50);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.fuzzy_threshold, 0.6);
        assert_eq!(config.history_capacity, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SearchConfig::from_toml_str("max_results = 20\ndebounce_ms = 150\n").unwrap();
        assert_eq!(config.max_results, 20);
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.min_query_chars, 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SearchConfig::from_toml_str("max_results = 0").unwrap_err();
        assert_eq!(err.code(), SearchErrorCode::InvalidConfig);

        let err = SearchConfig::from_toml_str("fuzzy_threshold = -1.0").unwrap_err();
        assert_eq!(err.code(), SearchErrorCode::InvalidConfig);
    }

    #[test]
    fn test_malformed_toml() {
        let err = SearchConfig::from_toml_str("max_results = \"many\"").unwrap_err();
        assert_eq!(err.code(), SearchErrorCode::ConfigParse);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantry.toml");
        std::fs::write(&path, "min_query_chars = 3\n").unwrap();

        let config = SearchConfig::load(Some(&path)).unwrap();
        assert_eq!(config.min_query_chars, 3);
    }
}
