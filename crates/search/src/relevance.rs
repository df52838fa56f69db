//! Relevance scoring for catalog items.
//!
//! Every populated field is classified into a match tier against the
//! normalized query; the tier multiplier times the field weight is summed
//! across fields.

use crate::config::SearchConfig;
use crate::fuzzy::similarity;
use crate::item::{CatalogItem, ScoredItem};
use std::collections::BTreeSet;
use std::ops::Range;

/// Weight of the primary display name.
pub const NAME_WEIGHT: f64 = 3.0;
/// Weight of each localized name variant.
pub const LOCALIZED_NAME_WEIGHT: f64 = 2.5;
pub const DESCRIPTION_WEIGHT: f64 = 1.5;
pub const CATEGORY_WEIGHT: f64 = 2.0;
/// Applied once, to the best-matching tag.
pub const TAG_WEIGHT: f64 = 2.0;
pub const ID_WEIGHT: f64 = 1.0;

/// Match quality of one field value against the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchTier {
    /// Field equals the query
    Exact,
    /// Field starts with the query
    StartsWith,
    /// Field contains the query
    Contains,
    /// Edit-distance similarity in `[0, 1]`
    Fuzzy(f64),
}

impl MatchTier {
    /// Classify a lowercased field value against a normalized query.
    pub fn classify(value: &str, query: &str) -> Self {
        if value == query {
            MatchTier::Exact
        } else if value.starts_with(query) {
            MatchTier::StartsWith
        } else if value.contains(query) {
            MatchTier::Contains
        } else {
            MatchTier::Fuzzy(similarity(value, query))
        }
    }

    /// Score multiplier for this tier.
    pub fn multiplier(self) -> f64 {
        match self {
            MatchTier::Exact => 10.0,
            MatchTier::StartsWith => 5.0,
            MatchTier::Contains => 3.0,
            MatchTier::Fuzzy(s) => s,
        }
    }
}

/// Score of one item, before it is paired with the item itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemScore {
    pub score: f64,
    pub matched_fields: BTreeSet<String>,
}

impl ItemScore {
    fn add_field(&mut self, field: impl Into<String>, value: &str, weight: f64, query: &str) {
        if value.is_empty() {
            return;
        }
        let value = value.to_lowercase();
        self.score += MatchTier::classify(&value, query).multiplier() * weight;
        if value.contains(query) {
            self.matched_fields.insert(field.into());
        }
    }
}

/// Score one item against a normalized (lowercased, trimmed) query.
///
/// An empty query scores zero.
pub fn score_item(query: &str, item: &CatalogItem) -> ItemScore {
    let mut result = ItemScore::default();
    if query.is_empty() {
        return result;
    }

    result.add_field("name", &item.name, NAME_WEIGHT, query);
    for (locale, name) in &item.localized_names {
        result.add_field(format!("name_{locale}"), name, LOCALIZED_NAME_WEIGHT, query);
    }
    if let Some(description) = &item.description {
        result.add_field("description", description, DESCRIPTION_WEIGHT, query);
    }
    if let Some(category) = &item.category {
        result.add_field("category", category, CATEGORY_WEIGHT, query);
    }

    let tags: Vec<String> = item
        .tags
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    if !tags.is_empty() {
        let best = tags
            .iter()
            .map(|t| MatchTier::classify(t, query).multiplier())
            .fold(0.0_f64, f64::max);
        result.score += best * TAG_WEIGHT;
        if tags.iter().any(|t| t.contains(query)) {
            result.matched_fields.insert("tags".to_string());
        }
    }

    result.add_field("id", &item.id, ID_WEIGHT, query);
    result
}

/// Score the whole catalog and keep the top of the relevance ranking.
///
/// Items scoring at or below `fuzzy_threshold` are dropped; the rest are
/// ordered by descending score (ties keep catalog order) and truncated to
/// `max_results`.
pub fn score_catalog(query: &str, catalog: &[CatalogItem], config: &SearchConfig) -> Vec<ScoredItem> {
    let threshold = config.fuzzy_threshold;
    let to_scored = |item: &CatalogItem| {
        let ItemScore { score, matched_fields } = score_item(query, item);
        (score > threshold).then(|| ScoredItem {
            item: item.clone(),
            score,
            matched_fields,
        })
    };

    #[cfg(feature = "parallel")]
    let mut scored: Vec<ScoredItem> = {
        use rayon::prelude::*;
        catalog.par_iter().filter_map(to_scored).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let mut scored: Vec<ScoredItem> = catalog.iter().filter_map(to_scored).collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(config.max_results);
    scored
}

/// Byte ranges of every case-insensitive, non-overlapping occurrence of
/// `query` in `text`.
pub fn highlight_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    let needle: Vec<char> = query.to_lowercase().chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |idx: usize| chars.get(idx).map_or(text.len(), |(b, _)| *b);
    let mut ranges = Vec::new();
    let mut i = 0;

    while i + needle.len() <= chars.len() {
        let hit = needle
            .iter()
            .enumerate()
            .all(|(k, q)| chars[i + k].1.to_lowercase().eq(std::iter::once(*q)));
        if hit {
            ranges.push(byte_at(i)..byte_at(i + needle.len()));
            i += needle.len();
        } else {
            i += 1;
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sausages() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new("1", "Spicy Sausage")
                .with_price(50000.0)
                .with_category("sausage")
                .with_rating(4.5),
            CatalogItem::new("2", "Mild Sausage")
                .with_price(40000.0)
                .with_category("sausage")
                .with_in_stock(false)
                .with_rating(3.0),
        ]
    }

    #[test]
    fn test_tier_classification() {
        assert_eq!(MatchTier::classify("hello", "hello"), MatchTier::Exact);
        assert_eq!(MatchTier::classify("hello world", "hello"), MatchTier::StartsWith);
        assert_eq!(MatchTier::classify("say hello", "hello"), MatchTier::Contains);
        assert_eq!(MatchTier::classify("hallo", "hello"), MatchTier::Fuzzy(0.8));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(MatchTier::Exact.multiplier() > MatchTier::StartsWith.multiplier());
        assert!(MatchTier::StartsWith.multiplier() > MatchTier::Contains.multiplier());
        assert!(MatchTier::Contains.multiplier() > MatchTier::Fuzzy(1.0).multiplier());
    }

    #[test]
    fn test_exact_name_beats_description_substring() {
        let by_name = CatalogItem::new("a", "Kimchi");
        let by_description = CatalogItem::new("b", "Pickles").with_description("goes well with kimchi stew");

        let name_score = score_item("kimchi", &by_name).score;
        let description_score = score_item("kimchi", &by_description).score;
        assert!(name_score > description_score, "{name_score} vs {description_score}");
    }

    #[test]
    fn test_matched_fields_are_substring_hits() {
        let item = CatalogItem::new("10", "Smoked Sausage")
            .with_description("A smoky treat")
            .with_category("sausage")
            .with_tags(["bbq", "pork sausage"]);

        let result = score_item("sausage", &item);
        let fields: Vec<&str> = result.matched_fields.iter().map(String::as_str).collect();
        assert_eq!(fields, vec!["category", "name", "tags"]);
    }

    #[test]
    fn test_best_tag_only_counts_once() {
        let one = CatalogItem::new("x", "").with_tags(["vegan"]);
        let many = CatalogItem::new("x", "").with_tags(["vegan", "vegan", "vegan"]);
        assert_eq!(score_item("vegan", &one).score, score_item("vegan", &many).score);
    }

    #[test]
    fn test_missing_fields_skipped() {
        let item = CatalogItem::new("", "");
        assert_eq!(score_item("anything", &item).score, 0.0);
    }

    #[test]
    fn test_localized_names_scored() {
        let plain = CatalogItem::new("1", "Sausage");
        let localized = CatalogItem::new("1", "Sausage").with_localized_name("ko", "소시지");
        assert!(score_item("소시지", &localized).score > score_item("소시지", &plain).score);
        assert!(score_item("소시지", &localized).matched_fields.contains("name_ko"));
    }

    #[test]
    fn test_typo_query_ranks_intended_item_first() {
        let config = SearchConfig::default();
        let results = score_catalog("spicy sausag", &sausages(), &config);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].item.id, "1");
        assert_eq!(results[1].item.id, "2");
        assert!(results[0].score > config.fuzzy_threshold);
        assert!(results[1].score < results[0].score);
    }

    #[test]
    fn test_threshold_excludes_low_scores() {
        let config = SearchConfig {
            fuzzy_threshold: 1000.0,
            ..SearchConfig::default()
        };
        assert!(score_catalog("sausage", &sausages(), &config).is_empty());
    }

    #[test]
    fn test_truncates_to_max_results() {
        let catalog: Vec<CatalogItem> = (0..20)
            .map(|i| CatalogItem::new(i.to_string(), format!("Tofu {i}")))
            .collect();
        let config = SearchConfig {
            max_results: 5,
            ..SearchConfig::default()
        };
        assert_eq!(score_catalog("tofu", &catalog, &config).len(), 5);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        // Ids share no characters with the query so every item scores the same.
        let catalog: Vec<CatalogItem> = ["x", "y", "z"]
            .iter()
            .map(|id| CatalogItem::new(*id, "Green Tea").with_category("tea"))
            .collect();
        let results = score_catalog("green tea", &catalog, &SearchConfig::default());
        let ids: Vec<&str> = results.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(score_catalog("tofu", &[], &SearchConfig::default()).is_empty());
    }

    #[test]
    fn test_highlight_ranges() {
        assert_eq!(highlight_ranges("Spicy Sausage sausage", "sausage"), vec![6..13, 14..21]);
        assert!(highlight_ranges("Tofu", "").is_empty());
        assert_eq!(highlight_ranges("Café Crème", "crème"), vec![6..12]);
    }
}
