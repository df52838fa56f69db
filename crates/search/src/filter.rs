//! Predicate filtering over catalog items.

use crate::item::CatalogItem;
use crate::sort::SortMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive price bounds. `min > max` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default = "unbounded", skip_serializing_if = "is_unbounded")]
    pub max: f64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: 0.0, max: unbounded() }
    }
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

fn unbounded() -> f64 {
    f64::INFINITY
}

fn is_unbounded(max: &f64) -> bool {
    max.is_infinite()
}

/// Active filters plus the selected sort mode.
///
/// Persists across searches within a session; only [`FilterOp`]s and
/// [`FilterState::clear`] change it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub price_range: PriceRange,
    /// Empty means any category
    pub categories: BTreeSet<String>,
    /// Empty means any tag; otherwise an item needs at least one of them
    pub tags: BTreeSet<String>,
    /// `None` means stock status is ignored
    pub in_stock: Option<bool>,
    pub min_rating: f64,
    pub sort_mode: SortMode,
}

/// A single filter change coming from the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FilterOp {
    /// Add the category if absent, remove it if present
    Category(String),
    /// Add the tag if absent, remove it if present
    Tag(String),
    Price(PriceRange),
    InStock(Option<bool>),
    /// Minimum rating
    Rating(f64),
    Sort(SortMode),
}

impl FilterState {
    /// True when `item` satisfies every active predicate.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.price_range.contains(item.price)
            && (self.categories.is_empty()
                || item.category.as_ref().is_some_and(|c| self.categories.contains(c)))
            && (self.tags.is_empty() || item.tags.iter().any(|t| self.tags.contains(t)))
            && self.in_stock.is_none_or(|wanted| item.in_stock == wanted)
            && item.rating_or_zero() >= self.min_rating
    }

    /// True when no predicate restricts the catalog.
    pub fn is_unrestricted(&self) -> bool {
        let defaults = FilterState::default();
        self.price_range == defaults.price_range
            && self.categories.is_empty()
            && self.tags.is_empty()
            && self.in_stock.is_none()
            && self.min_rating <= 0.0
    }

    /// Apply one change.
    pub fn apply(&mut self, op: FilterOp) {
        match op {
            FilterOp::Category(category) => toggle(&mut self.categories, category),
            FilterOp::Tag(tag) => toggle(&mut self.tags, tag),
            FilterOp::Price(range) => self.price_range = range,
            FilterOp::InStock(wanted) => self.in_stock = wanted,
            FilterOp::Rating(min) => self.min_rating = min,
            FilterOp::Sort(mode) => self.sort_mode = mode,
        }
    }

    /// Restore every default, including the sort mode.
    pub fn clear(&mut self) {
        *self = FilterState::default();
    }
}

fn toggle(set: &mut BTreeSet<String>, value: String) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

/// Keep the items matching `filters`, in their original order.
pub fn apply_filters<T>(items: Vec<T>, filters: &FilterState) -> Vec<T>
where
    T: AsRef<CatalogItem>,
{
    items.into_iter().filter(|i| filters.matches(i.as_ref())).collect()
}
