//! WASM bindings for search utilities.

use crate::{
    parse_catalog, FilterState, ManualClock, SearchConfig, SearchEngine, SearchOutcome, SearchResults,
};
use wasm_bindgen::prelude::*;

/// Calculate Levenshtein edit distance between two strings.
#[wasm_bindgen]
pub fn edit_distance(a: &str, b: &str) -> usize {
    crate::levenshtein_distance(a, b)
}

/// Similarity in `[0, 1]` derived from edit distance.
#[wasm_bindgen]
pub fn string_similarity(a: &str, b: &str) -> f64 {
    crate::similarity(a, b)
}

/// Run one search over a JSON catalog and return the outcome as JSON.
///
/// # Arguments
/// * `query` - Search query; `undefined`/`null` is treated as empty
/// * `catalog_json` - JSON array of catalog items
/// * `filters_json` - JSON filter state; empty string for no filters
///
/// # Returns
/// JSON object with `results` (`query`, `normalizedQuery`, `items`, `count`) and `suggestions`.
/// Malformed input never throws; it yields an empty result set.
#[wasm_bindgen]
pub fn search_catalog(query: Option<String>, catalog_json: &str, filters_json: &str) -> String {
    let query = query.unwrap_or_default();
    let catalog = parse_catalog(catalog_json).unwrap_or_default();
    let filters: FilterState = if filters_json.trim().is_empty() {
        FilterState::default()
    } else {
        serde_json::from_str(filters_json).unwrap_or_default()
    };

    // No wall clock on wasm32; one-shot searches never wait on the debouncer.
    let mut engine = SearchEngine::with_clock(SearchConfig::default(), ManualClock::new())
        .with_catalog(catalog)
        .with_filters(filters);
    let outcome = engine.search_now(&query);

    serde_json::to_string(&outcome).unwrap_or_else(|_| {
        let empty = SearchOutcome {
            results: SearchResults::new(query, "", Vec::new()),
            suggestions: Vec::new(),
        };
        serde_json::to_string(&empty).unwrap_or_else(|_| "{}".to_string())
    })
}
