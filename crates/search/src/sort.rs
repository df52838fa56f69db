//! Result ordering.

use crate::item::CatalogItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// How a result set is ordered after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Keep the scorer's order
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    /// Accent- and case-insensitive name order
    Name,
    /// Most recent `created_at` first
    Newest,
    /// Highest rating first
    Rating,
}

impl SortMode {
    /// All modes, in menu order.
    pub const ALL: [SortMode; 6] = [
        SortMode::Relevance,
        SortMode::PriceAsc,
        SortMode::PriceDesc,
        SortMode::Name,
        SortMode::Newest,
        SortMode::Rating,
    ];

    /// Wire name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::PriceAsc => "price-asc",
            SortMode::PriceDesc => "price-desc",
            SortMode::Name => "name",
            SortMode::Newest => "newest",
            SortMode::Rating => "rating",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort mode '{s}'"))
    }
}

/// Sort items in place by `mode`. Stable: equal keys keep their input order.
pub fn sort_items<T: AsRef<CatalogItem>>(items: &mut [T], mode: SortMode) {
    match mode {
        SortMode::Relevance => {}
        SortMode::PriceAsc => items.sort_by(|a, b| a.as_ref().price.total_cmp(&b.as_ref().price)),
        SortMode::PriceDesc => items.sort_by(|a, b| b.as_ref().price.total_cmp(&a.as_ref().price)),
        SortMode::Name => items.sort_by(|a, b| compare_names(&a.as_ref().name, &b.as_ref().name)),
        SortMode::Newest => items.sort_by(|a, b| {
            // None < Some, so missing timestamps land last.
            b.as_ref().created_at.cmp(&a.as_ref().created_at)
        }),
        SortMode::Rating => {
            items.sort_by(|a, b| b.as_ref().rating_or_zero().total_cmp(&a.as_ref().rating_or_zero()));
        }
    }
}

/// Return a sorted copy, leaving the input untouched.
pub fn sorted<T: AsRef<CatalogItem> + Clone>(items: &[T], mode: SortMode) -> Vec<T> {
    let mut out = items.to_vec();
    sort_items(&mut out, mode);
    out
}

/// Primary key for name ordering: decomposed, combining marks stripped,
/// lowercased. "Éclair" folds to "eclair".
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

// Base letters first, then case-folded with accents, then raw.
fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}
