//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::OwoColorize;
use pantry_search::{highlight_ranges, ScoredItem, SearchOutcome, SearchResults, Suggestion};

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Decorate every case-insensitive occurrence of `query` in `text`.
///
/// `mark` receives each matched slice and returns its decorated form, so the
/// same logic serves colored and plain output.
pub fn highlight_with(text: &str, query: &str, mark: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in highlight_ranges(text, query) {
        out.push_str(&text[last..range.start]);
        out.push_str(&mark(&text[range.clone()]));
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

/// One result line: name with highlighted query, price, category, stock.
pub fn format_item(scored: &ScoredItem, query: &str) -> String {
    let item = &scored.item;
    let name = highlight_with(&item.name, query, |m| m.bold().yellow().to_string());
    let stock = if item.in_stock {
        "in stock".green().to_string()
    } else {
        "sold out".red().to_string()
    };

    let mut line = format!("{:>6}  {}  {}", item.id.dimmed(), name, format_price(item.price));
    if let Some(category) = &item.category {
        line.push_str(&format!("  [{category}]"));
    }
    if let Some(rating) = item.rating {
        line.push_str(&format!("  ★{rating:.1}"));
    }
    line.push_str(&format!("  {stock}"));
    if scored.score > 0.0 {
        line.push_str(&format!("  {}", format!("score {:.2}", scored.score).dimmed()));
    }
    line
}

/// Print a result set under a header.
pub fn print_results(results: &SearchResults) {
    let header = if results.query.is_empty() {
        format_count(results.count, "item", "items")
    } else {
        format!(
            "{} for \"{}\"",
            format_count(results.count, "result", "results"),
            results.query
        )
    };
    Status::header(&header);
    for scored in &results.items {
        println!("{}", format_item(scored, &results.normalized_query));
    }
}

/// Print autocomplete suggestions on one line; nothing when empty.
pub fn print_suggestions(suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        return;
    }
    let names: Vec<&str> = suggestions.iter().map(|s| s.name.as_str()).collect();
    println!("{} {}", "suggestions:".dimmed(), names.join(", "));
}

/// Print a full outcome: results then suggestions.
pub fn print_outcome(outcome: &SearchOutcome) {
    print_results(&outcome.results);
    print_suggestions(&outcome.suggestions);
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a price with thousands separators, dropping a zero fraction
pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let whole = cents / 100;
    let fraction = (cents % 100).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        grouped.insert(0, '-');
    }

    if fraction == 0 {
        grouped
    } else {
        format!("{grouped}.{fraction:02}")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
