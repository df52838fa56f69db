//! Edit distance and the similarity measure derived from it.

/// Calculate Levenshtein edit distance between two strings.
///
/// Operates on Unicode scalar values, so `"café"` and `"cafe"` are one edit
/// apart regardless of UTF-8 width.
///
/// # Arguments
/// * `a` - First string
/// * `b` - Second string
///
/// # Returns
/// Number of single-character insertions, deletions or substitutions needed
/// to transform `a` into `b`
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let cols = a_chars.len();
    let rows = b_chars.len();

    if cols == 0 { return rows; }
    if rows == 0 { return cols; }

    // Row i holds distances between the first i chars of b and every prefix of a.
    let mut prev: Vec<usize> = (0..=cols).collect();
    let mut curr = vec![0; cols + 1];

    for i in 1..=rows {
        curr[0] = i;
        for j in 1..=cols {
            curr[j] = if b_chars[i - 1] == a_chars[j - 1] {
                prev[j - 1]
            } else {
                1 + prev[j - 1].min(prev[j]).min(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[cols]
}

/// Normalized similarity in `[0, 1]`: `(max_len - distance) / max_len`.
///
/// Two empty strings are identical and score `1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Check if text contains all characters of query in order.
///
/// All query characters must appear in the text in the same order, but not
/// necessarily consecutively. Used to match partially typed input against
/// previous queries.
pub fn fuzzy_match(text: &str, query: &str) -> bool {
    let mut text_chars = text.chars();

    query
        .chars()
        .all(|query_char| text_chars.any(|c| c == query_char))
}
