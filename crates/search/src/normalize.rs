//! Query normalization.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Common misspellings rewritten before scoring. Deliberately small; this is
/// spelling repair, not language understanding.
static CORRECTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("sausge", "sausage"),
        ("sasuage", "sausage"),
        ("sausauge", "sausage"),
        ("chiken", "chicken"),
        ("chikken", "chicken"),
        ("cheeze", "cheese"),
        ("chese", "cheese"),
        ("yoghurt", "yogurt"),
        ("tomatoe", "tomato"),
        ("potatoe", "potato"),
        ("brocoli", "broccoli"),
        ("bannana", "banana"),
        ("choclate", "chocolate"),
        ("expresso", "espresso"),
    ])
});

/// Lowercase, trim, collapse internal whitespace and repair known misspellings.
///
/// Word boundaries follow UAX #29, so punctuation such as the hyphen in
/// `"gluten-free"` survives untouched.
pub fn normalize_query(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for token in lowered.split_word_bounds() {
        if token.chars().all(char::is_whitespace) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push_str(CORRECTIONS.get(token).copied().unwrap_or(token));
    }

    out
}

/// Length of a normalized query in characters.
#[inline]
pub fn query_len(query: &str) -> usize {
    query.chars().count()
}
