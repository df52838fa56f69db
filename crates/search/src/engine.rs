//! Search orchestration: debounce, pipeline, history and emission.
//!
//! State machine: `Idle -> Pending -> Executing -> Idle`. [`SearchEngine::submit`]
//! (re)arms the debounce timer; [`SearchEngine::poll`] runs the pipeline once
//! the timer is due. Each execution is one synchronous pass, so nothing can
//! interleave with it.

use crate::config::SearchConfig;
use crate::filter::{apply_filters, FilterOp, FilterState};
use crate::history::SearchHistory;
use crate::item::{CatalogItem, ScoredItem};
use crate::normalize::{normalize_query, query_len};
use crate::relevance::score_catalog;
use crate::sink::{AnalyticsSink, ResultSink, SearchEvent, SearchResults, Suggestion};
use crate::sort::sort_items;
use crate::timer::{Clock, Debouncer, SystemClock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Where the orchestrator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    /// A submission is waiting for the debounce window to pass
    Pending,
    Executing,
}

/// Everything one execution produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub results: SearchResults,
    pub suggestions: Vec<Suggestion>,
}

/// The pipeline coordinator exposed to the UI.
pub struct SearchEngine<C: Clock = SystemClock> {
    config: SearchConfig,
    catalog: Arc<[CatalogItem]>,
    filters: FilterState,
    history: SearchHistory,
    debouncer: Debouncer<String, C>,
    current_query: String,
    state: EngineState,
    result_sink: Option<Box<dyn ResultSink>>,
    analytics: Option<Box<dyn AnalyticsSink>>,
}

impl SearchEngine<SystemClock> {
    /// Engine on the wall clock with in-memory history and an empty catalog.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> SearchEngine<C> {
    pub fn with_clock(config: SearchConfig, clock: C) -> Self {
        let history = SearchHistory::from_config(&config, None);
        let debouncer = Debouncer::new(config.debounce(), clock);
        Self {
            config,
            catalog: Arc::from(Vec::new()),
            filters: FilterState::default(),
            history,
            debouncer,
            current_query: String::new(),
            state: EngineState::Idle,
            result_sink: None,
            analytics: None,
        }
    }

    pub fn with_history(mut self, history: SearchHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_catalog(mut self, items: Vec<CatalogItem>) -> Self {
        self.set_catalog(items);
        self
    }

    /// Start from a given filter state instead of the defaults.
    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_result_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.result_sink = Some(sink);
        self
    }

    pub fn with_analytics(mut self, sink: Box<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    /// Replace the catalog in one step. Later executions see only the new
    /// snapshot.
    pub fn set_catalog(&mut self, items: Vec<CatalogItem>) {
        tracing::debug!(items = items.len(), "Catalog replaced");
        self.catalog = Arc::from(items);
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> Arc<[CatalogItem]> {
        Arc::clone(&self.catalog)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory {
        &mut self.history
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Most recently submitted query, as typed.
    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    /// Queue `query`, superseding any submission still inside its debounce
    /// window.
    pub fn submit(&mut self, query: &str) {
        if let Some(previous) = self.debouncer.cancel() {
            tracing::trace!(superseded = %previous, "Pending search superseded");
        }
        self.current_query = query.to_string();
        self.debouncer.schedule(self.current_query.clone());
        self.state = EngineState::Pending;
    }

    /// Time until the pending submission is due, if any.
    pub fn time_until_due(&self) -> Option<Duration> {
        self.debouncer.remaining()
    }

    /// Run the pending submission if its debounce window has passed.
    pub fn poll(&mut self) -> Option<SearchOutcome> {
        let query = self.debouncer.take_due()?;
        Some(self.execute(&query))
    }

    /// Run the pending submission now, ignoring the remaining delay.
    pub fn flush(&mut self) -> Option<SearchOutcome> {
        let query = self.debouncer.cancel()?;
        Some(self.execute(&query))
    }

    /// Run `query` immediately, discarding anything pending.
    pub fn search_now(&mut self, query: &str) -> SearchOutcome {
        self.debouncer.cancel();
        self.current_query = query.to_string();
        self.execute(query)
    }

    /// Change one filter and re-run the current query.
    pub fn toggle_filter(&mut self, op: FilterOp) {
        tracing::debug!(?op, "Filter changed");
        self.filters.apply(op);
        self.resubmit();
    }

    /// Reset every filter and re-run the current query.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.resubmit();
    }

    fn resubmit(&mut self) {
        let query = self.current_query.clone();
        self.submit(&query);
    }

    fn execute(&mut self, raw: &str) -> SearchOutcome {
        self.state = EngineState::Executing;
        let started = self.debouncer.clock().now();
        let catalog = Arc::clone(&self.catalog);
        let query = normalize_query(raw);
        let scored = query_len(&query) >= self.config.min_query_chars;

        let (mut items, suggestions) = if scored {
            // Filters narrow the relevance window; they never reach items
            // ranked below max_results.
            let ranked = score_catalog(&query, &catalog, &self.config);
            let suggestions: Vec<Suggestion> = ranked
                .iter()
                .take(self.config.suggestion_limit)
                .map(Suggestion::from)
                .collect();
            (apply_filters(ranked, &self.filters), suggestions)
        } else {
            let browse: Vec<ScoredItem> = catalog
                .iter()
                .filter(|item| self.filters.matches(item))
                .cloned()
                .map(ScoredItem::unscored)
                .collect();
            (browse, Vec::new())
        };
        sort_items(&mut items, self.filters.sort_mode);

        if !query.is_empty() {
            self.history.record(raw);
        }

        let results = SearchResults::new(raw.trim(), query.as_str(), items);
        let event = SearchEvent {
            query: results.query.clone(),
            result_count: results.count,
            scored,
            duration: self.debouncer.clock().now().saturating_sub(started),
        };

        tracing::debug!(
            query = %query,
            scored,
            filtered = !self.filters.is_unrestricted(),
            results = results.count,
            catalog = catalog.len(),
            "Search executed"
        );

        if let Some(sink) = self.result_sink.as_mut() {
            sink.on_results(&results);
            sink.on_suggestions(&suggestions);
        }
        if let Some(analytics) = self.analytics.as_mut() {
            analytics.record(&event);
        }

        self.state = if self.debouncer.is_pending() {
            EngineState::Pending
        } else {
            EngineState::Idle
        };

        SearchOutcome { results, suggestions }
    }
}
