//! Bounded, deduplicated log of past queries.

use crate::config::SearchConfig;
use crate::fuzzy::fuzzy_match;
use crate::store::KeyValueStore;
use std::fmt;

/// Most-recent-first query history with optional persistence.
///
/// Persistence is best effort: a missing, failing or corrupt store only ever
/// costs the remembered queries, never a search.
pub struct SearchHistory {
    entries: Vec<String>,
    capacity: usize,
    min_query_chars: usize,
    key: String,
    store: Option<Box<dyn KeyValueStore>>,
}

impl fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHistory")
            .field("entries", &self.entries)
            .field("capacity", &self.capacity)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl SearchHistory {
    /// In-memory history that is never persisted.
    pub fn new(capacity: usize, min_query_chars: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            min_query_chars,
            key: String::new(),
            store: None,
        }
    }

    /// History backed by `store`, loading whatever was saved under `key`.
    pub fn with_store(
        store: Box<dyn KeyValueStore>,
        key: impl Into<String>,
        capacity: usize,
        min_query_chars: usize,
    ) -> Self {
        let mut history = Self {
            key: key.into(),
            store: Some(store),
            ..Self::new(capacity, min_query_chars)
        };
        history.entries = history.load();
        history
    }

    /// Build from engine configuration, persisting when a store is given.
    pub fn from_config(config: &SearchConfig, store: Option<Box<dyn KeyValueStore>>) -> Self {
        match store {
            Some(store) => Self::with_store(
                store,
                config.history_key.clone(),
                config.history_capacity,
                config.min_query_chars,
            ),
            None => Self::new(config.history_capacity, config.min_query_chars),
        }
    }

    /// Remember a query. Returns `false` when it was too short to keep.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.chars().count() < self.min_query_chars || query.is_empty() {
            return false;
        }

        self.entries.retain(|e| e != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.capacity);
        self.save();
        true
    }

    /// Entries, most recent first.
    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Past queries containing the characters of `partial` in order,
    /// most recent first.
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<&str> {
        let partial = partial.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| fuzzy_match(&e.to_lowercase(), &partial))
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    /// Forget everything, including the persisted copy.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    fn load(&self) -> Vec<String> {
        let Some(store) = &self.store else {
            return Vec::new();
        };

        let raw = match store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "History store unavailable, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(self.capacity);
                entries
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding corrupt search history");
                Vec::new()
            }
        }
    }

    fn save(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let result = serde_json::to_string(&self.entries)
            .map_err(Into::into)
            .and_then(|json| store.set(&self.key, &json));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist search history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SearchError};
    use crate::store::MemoryStore;

    struct UnavailableStore;

    impl KeyValueStore for UnavailableStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(SearchError::Store("offline".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(SearchError::Store("offline".into()))
        }

        fn remove(&self, _key: &str) -> Result<bool> {
            Err(SearchError::Store("offline".into()))
        }
    }

    #[test]
    fn test_dedup_moves_to_front() {
        let mut history = SearchHistory::new(10, 1);
        history.record("a");
        history.record("b");
        history.record("a");
        assert_eq!(history.list(), ["a", "b"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = SearchHistory::new(10, 2);
        for i in 0..15 {
            history.record(&format!("query {i:02}"));
        }

        assert_eq!(history.len(), 10);
        assert_eq!(history.list()[0], "query 14");
        assert_eq!(history.list()[9], "query 05");
    }

    #[test]
    fn test_short_queries_ignored() {
        let mut history = SearchHistory::new(10, 2);
        assert!(!history.record("a"));
        assert!(!history.record("   "));
        assert!(history.record("ab"));
        assert_eq!(history.list(), ["ab"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let mut history = SearchHistory::new(10, 2);
        history.record("Tofu");
        history.record("tofu");
        assert_eq!(history.list(), ["tofu", "Tofu"]);
    }

    #[test]
    fn test_persists_and_reloads() {
        let store = MemoryStore::new();
        let mut history = SearchHistory::with_store(Box::new(store.clone()), "h", 10, 2);
        history.record("kimchi");
        history.record("tofu");

        assert_eq!(store.get("h").unwrap().as_deref(), Some(r#"["tofu","kimchi"]"#));

        let reloaded = SearchHistory::with_store(Box::new(store), "h", 10, 2);
        assert_eq!(reloaded.list(), ["tofu", "kimchi"]);
    }

    #[test]
    fn test_reload_truncates_to_capacity() {
        let store = MemoryStore::new();
        store.set("h", r#"["a1","a2","a3","a4"]"#).unwrap();
        let history = SearchHistory::with_store(Box::new(store), "h", 2, 2);
        assert_eq!(history.list(), ["a1", "a2"]);
    }

    #[test]
    fn test_corrupt_history_discarded() {
        let store = MemoryStore::new();
        store.set("h", "{not json").unwrap();

        let mut history = SearchHistory::with_store(Box::new(store.clone()), "h", 10, 2);
        assert!(history.is_empty());

        history.record("tofu");
        assert_eq!(store.get("h").unwrap().as_deref(), Some(r#"["tofu"]"#));
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let mut history = SearchHistory::with_store(Box::new(UnavailableStore), "h", 10, 2);
        assert!(history.is_empty());
        assert!(history.record("tofu"));
        assert_eq!(history.list(), ["tofu"]);
    }

    #[test]
    fn test_suggest_subsequence() {
        let mut history = SearchHistory::new(10, 2);
        history.record("Spicy Sausage");
        history.record("green tea");
        history.record("smoked salmon");

        assert_eq!(history.suggest("ss", 5), vec!["smoked salmon", "Spicy Sausage"]);
        assert_eq!(history.suggest("ss", 1), vec!["smoked salmon"]);
        assert!(history.suggest("xyz", 5).is_empty());
    }

    #[test]
    fn test_clear_persists() {
        let store = MemoryStore::new();
        let mut history = SearchHistory::with_store(Box::new(store.clone()), "h", 10, 2);
        history.record("tofu");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(store.get("h").unwrap().as_deref(), Some("[]"));
    }
}
