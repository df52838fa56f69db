//! Consumers of search output: the rendering layer and analytics.

use crate::item::ScoredItem;
use serde::Serialize;
use std::time::Duration;

/// Final result set of one execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Query as submitted
    pub query: String,
    /// Query after normalization and typo correction; what was scored
    pub normalized_query: String,
    pub items: Vec<ScoredItem>,
    pub count: usize,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, normalized_query: impl Into<String>, items: Vec<ScoredItem>) -> Self {
        let count = items.len();
        Self {
            query: query.into(),
            normalized_query: normalized_query.into(),
            items,
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Autocomplete entry drawn from the ranked set before filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub score: f64,
}

impl From<&ScoredItem> for Suggestion {
    fn from(scored: &ScoredItem) -> Self {
        Self {
            id: scored.item.id.clone(),
            name: scored.item.name.clone(),
            score: scored.score,
        }
    }
}

/// One completed search, as reported to analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    pub query: String,
    pub result_count: usize,
    /// False when the query was too short to score
    pub scored: bool,
    #[serde(skip)]
    pub duration: Duration,
}

/// Receives every completed result set.
pub trait ResultSink {
    fn on_results(&mut self, results: &SearchResults);

    /// Autocomplete suggestions for the same execution. Ignored by default.
    fn on_suggestions(&mut self, _suggestions: &[Suggestion]) {}
}

/// Receives one event per completed search.
pub trait AnalyticsSink {
    fn record(&mut self, event: &SearchEvent);
}
