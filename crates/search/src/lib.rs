//! In-memory, typo-tolerant catalog search for Pantry.
//!
//! This crate provides:
//! - Levenshtein edit distance and similarity
//! - Multi-field, tiered relevance scoring
//! - Predicate filtering and stable multi-mode sorting
//! - Bounded, persisted query history
//! - A debounced search orchestrator with injectable clock and sinks
//!
//! # Example
//!
//! ```
//! use pantry_search::{CatalogItem, FilterOp, SearchConfig, SearchEngine};
//!
//! let mut engine = SearchEngine::new(SearchConfig::default()).with_catalog(vec![
//!     CatalogItem::new("1", "Spicy Sausage").with_price(50000.0),
//!     CatalogItem::new("2", "Mild Sausage").with_price(40000.0).with_in_stock(false),
//! ]);
//!
//! let outcome = engine.search_now("spicy sausag");
//! assert_eq!(outcome.results.items[0].item.id, "1");
//!
//! engine.toggle_filter(FilterOp::InStock(Some(true)));
//! let filtered = engine.flush().unwrap();
//! assert!(filtered.results.items.iter().all(|i| i.item.in_stock));
//! ```

mod config;
mod engine;
mod error;
mod filter;
mod fuzzy;
mod history;
mod item;
mod normalize;
mod relevance;
mod sink;
mod sort;
pub mod store;
pub mod timer;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::SearchConfig;
pub use engine::{EngineState, SearchEngine, SearchOutcome};
pub use error::{Result, SearchError, SearchErrorCode};
pub use filter::{apply_filters, FilterOp, FilterState, PriceRange};
pub use fuzzy::{fuzzy_match, levenshtein_distance, similarity};
pub use history::SearchHistory;
pub use item::{parse_catalog, CatalogItem, ScoredItem};
pub use normalize::normalize_query;
pub use relevance::{highlight_ranges, score_catalog, score_item, ItemScore, MatchTier};
pub use sink::{AnalyticsSink, ResultSink, SearchEvent, SearchResults, Suggestion};
pub use sort::{sort_items, sorted, SortMode};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use timer::{Clock, ManualClock, SystemClock};
