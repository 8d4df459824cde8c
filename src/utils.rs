//! Shared text utilities
//!
//! Small pure helpers used by every normalization path: HTML tag stripping
//! for synopsis text, whitespace normalization for titles, and release-year
//! extraction from loosely formatted upstream fields.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex to normalize multiple whitespaces into single space
    static ref MULTI_SPACE_REGEX: Regex = Regex::new(r"\s{2,}").unwrap();
    /// Any HTML tag, replaced by a newline so line structure survives
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").unwrap();
    /// Runs of newlines left behind by tag stripping
    static ref NEWLINE_RUN_REGEX: Regex = Regex::new(r"\n{2,}").unwrap();
    /// Runs of horizontal whitespace inside a line
    static ref SPACE_RUN_REGEX: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    /// First 4-digit run in a free-form year field
    static ref YEAR_REGEX: Regex = Regex::new(r"\d{4}").unwrap();
}

/// Normalize text: trim and collapse multiple spaces into single space
pub fn normalize_text(text: &str) -> String {
    let trimmed = text.trim();
    MULTI_SPACE_REGEX.replace_all(trimmed, " ").to_string()
}

/// Strip HTML markup from synopsis text.
///
/// Tags become newlines (so `<br>` and block elements keep their line
/// breaks), the common entities are decoded, and whitespace runs are
/// collapsed. Empty input yields an empty string.
pub fn clean_html_tags(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = TAG_REGEX.replace_all(text, "\n");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    let text = NEWLINE_RUN_REGEX.replace_all(&text, "\n");
    let text = SPACE_RUN_REGEX.replace_all(&text, " ");

    text.trim().to_string()
}

/// Extract a 4-digit release year from an upstream field.
///
/// Upstream year fields are free-form ("2023", "2023-06-01", occasionally
/// junk); the record contract is a 4-character numeral or the literal
/// "unknown", never anything else.
pub fn extract_year(raw: Option<&str>) -> String {
    raw.and_then(|v| YEAR_REGEX.find(v))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
