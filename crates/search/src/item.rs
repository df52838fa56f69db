//! Catalog data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A product in the catalog.
///
/// Owned by the catalog source; the engine never mutates items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Stable unique identifier. Accepts a JSON string or number.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Localized name variants keyed by locale (e.g. `"ko"`, `"en"`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localized_names: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Non-negative price
    #[serde(default)]
    pub price: f64,
    /// Rating between 0 and 5; missing ratings count as 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    /// Missing timestamps sort as the earliest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CatalogItem {
    /// Creates an in-stock item with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            localized_names: BTreeMap::new(),
            description: None,
            category: None,
            tags: Vec::new(),
            price: 0.0,
            rating: None,
            in_stock: true,
            created_at: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_localized_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.localized_names.insert(locale.into(), name.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Rating with missing values treated as 0.
    #[inline]
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

fn default_true() -> bool {
    true
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// A catalog item paired with its relevance for one search invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Aggregate relevance score (0 when scoring was skipped)
    #[serde(rename = "_score")]
    pub score: f64,
    /// Fields whose value contains the query, for highlighting
    #[serde(rename = "_matchedFields")]
    pub matched_fields: BTreeSet<String>,
}

impl ScoredItem {
    /// Wraps an item that was not scored (short-query browse path).
    pub fn unscored(item: CatalogItem) -> Self {
        Self {
            item,
            score: 0.0,
            matched_fields: BTreeSet::new(),
        }
    }
}

impl AsRef<CatalogItem> for ScoredItem {
    fn as_ref(&self) -> &CatalogItem {
        &self.item
    }
}

impl AsRef<CatalogItem> for CatalogItem {
    fn as_ref(&self) -> &CatalogItem {
        self
    }
}

/// Parse a catalog from a JSON array.
pub fn parse_catalog(json: &str) -> crate::Result<Vec<CatalogItem>> {
    Ok(serde_json::from_str(json)?)
}
