//! HTML detail-page scraping
//!
//! Some sources expose no structured detail endpoint, only a rendered
//! detail page. Extraction is a small ordered grammar over the raw
//! markup: a per-source stream pattern first (for providers whose pages
//! need it), then a generic prefixed-manifest pattern, then independent
//! best-effort rules for title, synopsis, cover, and year. Every rule is
//! optional — a page that matches nothing still produces a record.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{ApiSource, VideoItem};
use crate::utils::{clean_html_tags, normalize_text};

lazy_static! {
    /// Per-source stream patterns, tried before the generic one.
    ///
    /// Keyed by source key; only for providers whose pages embed more
    /// than one URL shape and need the stricter match. Patterns here are
    /// tuned against each provider's live markup — cover additions with
    /// fixture tests, the markup does change.
    static ref SOURCE_STREAM_PATTERNS: Vec<(&'static str, Regex)> = vec![(
        "ffzy",
        Regex::new(r#"\$(https?://[^"'\s]+?/\d{8}/\d+_[a-f0-9]+/index\.m3u8)"#).unwrap(),
    )];

    /// Generic delimiter-prefixed stream manifest URL
    static ref GENERIC_STREAM_REGEX: Regex =
        Regex::new(r#"\$(https?://[^"'\s]+?\.m3u8)"#).unwrap();

    /// First heading's inner text
    static ref TITLE_REGEX: Regex = Regex::new(r"<h1[^>]*>([^<]+)</h1>").unwrap();
    /// Synopsis block carrying the "sketch" marker class
    static ref SKETCH_REGEX: Regex =
        Regex::new(r#"(?s)<div[^>]*class=["']sketch["'][^>]*>(.*?)</div>"#).unwrap();
    /// First image-style URL anywhere in the page
    static ref COVER_REGEX: Regex = Regex::new(r#"https?://[^"'\s]+?\.jpg"#).unwrap();
    /// Bare 4-digit year between tag boundaries
    static ref YEAR_REGEX: Regex = Regex::new(r">(\d{4})<").unwrap();
}

/// Trim a trailing parenthetical annotation (resolution tag etc.) from a
/// matched URL. An opening paren at position zero is not an annotation.
fn strip_annotation(url: &str) -> &str {
    match url.find('(') {
        Some(idx) if idx > 0 => &url[..idx],
        _ => url,
    }
}

/// Extract the episode stream URLs from detail-page markup.
///
/// The source-specific pattern wins if it matches at all; otherwise the
/// generic pattern applies. Matches are deduplicated in first-seen order
/// with annotations trimmed.
pub fn extract_episodes(source_key: &str, html: &str) -> Vec<String> {
    let mut matches: Vec<String> = Vec::new();

    if let Some((_, pattern)) = SOURCE_STREAM_PATTERNS
        .iter()
        .find(|(key, _)| *key == source_key)
    {
        matches = pattern
            .captures_iter(html)
            .map(|caps| caps[1].to_string())
            .collect();
    }

    if matches.is_empty() {
        matches = GENERIC_STREAM_REGEX
            .captures_iter(html)
            .map(|caps| caps[1].to_string())
            .collect();
    }

    let mut seen = std::collections::HashSet::new();
    matches
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .map(|url| strip_annotation(&url).to_string())
        .collect()
}

/// Build a normalized record from detail-page markup.
///
/// Metadata rules are independent; a missing field defaults to empty
/// (year to "unknown") rather than failing the scrape.
pub fn parse_detail_page(source: &ApiSource, id: &str, html: &str) -> VideoItem {
    let episodes = extract_episodes(&source.key, html);

    let title = TITLE_REGEX
        .captures(html)
        .map(|caps| normalize_text(&caps[1]))
        .unwrap_or_default();

    let desc = SKETCH_REGEX
        .captures(html)
        .map(|caps| clean_html_tags(&caps[1]))
        .unwrap_or_default();

    let poster = COVER_REGEX
        .find(html)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let year = YEAR_REGEX
        .captures(html)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "unknown".to_string());

    VideoItem {
        id: id.to_string(),
        title,
        poster,
        episodes,
        source: source.key.clone(),
        source_name: source.name.clone(),
        class: String::new(),
        year,
        desc,
        type_name: String::new(),
        douban_id: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn source(key: &str) -> ApiSource {
        ApiSource {
            key: key.to_string(),
            name: format!("{} source", key),
            api: "http://example.com/api.php/provide/vod".to_string(),
            kind: SourceKind::Maccms,
            detail: Some("http://example.com".to_string()),
        }
    }

    const FFZY_PAGE: &str = r#"
        <h1>  Test   Drama </h1>
        <div class="sketch"><p>A story about &amp; things.</p></div>
        <img src="http://img.example.com/cover.jpg">
        <span>>2021<</span>
        <input value="第01集$https://vod.ffzy.example/20230105/4523_9ab1ffcd/index.m3u8#第02集$https://vod.ffzy.example/20230105/4599_0c2dfa11/index.m3u8">
        <input value="第01集$https://other.example/a.m3u8">
    "#;

    #[test]
    fn test_source_specific_pattern_wins() {
        let episodes = extract_episodes("ffzy", FFZY_PAGE);
        assert_eq!(
            episodes,
            vec![
                "https://vod.ffzy.example/20230105/4523_9ab1ffcd/index.m3u8",
                "https://vod.ffzy.example/20230105/4599_0c2dfa11/index.m3u8"
            ]
        );
    }

    #[test]
    fn test_generic_pattern_fallback() {
        let html = r#"<a href="x">link</a>$https://cdn.example.com/ep1.m3u8 $https://cdn.example.com/ep1.m3u8"#;
        let episodes = extract_episodes("some-other-source", html);
        assert_eq!(episodes, vec!["https://cdn.example.com/ep1.m3u8"]);
    }

    #[test]
    fn test_annotation_trimmed_from_url() {
        let html = "$https://cdn.example.com/ep1.m3u8(1080P)";
        let episodes = extract_episodes("generic", html);
        assert_eq!(episodes, vec!["https://cdn.example.com/ep1.m3u8"]);
    }

    #[test]
    fn test_strip_annotation() {
        assert_eq!(strip_annotation("https://a/b.m3u8(1080P)"), "https://a/b.m3u8");
        assert_eq!(strip_annotation("https://a/b.m3u8"), "https://a/b.m3u8");
        assert_eq!(strip_annotation("(leading"), "(leading");
    }

    #[test]
    fn test_parse_detail_page_metadata() {
        let item = parse_detail_page(&source("ffzy"), "42", FFZY_PAGE);
        assert_eq!(item.id, "42");
        assert_eq!(item.title, "Test Drama");
        assert_eq!(item.desc, "A story about & things.");
        assert_eq!(item.poster, "http://img.example.com/cover.jpg");
        assert_eq!(item.year, "2021");
        assert_eq!(item.source, "ffzy");
        assert_eq!(item.class, "");
        assert_eq!(item.douban_id, 0);
        assert_eq!(item.episodes.len(), 2);
    }

    #[test]
    fn test_page_without_streams_still_yields_record() {
        let html = "<h1>Lonely Title</h1><p>no playable links</p>";
        let item = parse_detail_page(&source("bare"), "7", html);
        assert!(item.episodes.is_empty());
        assert_eq!(item.title, "Lonely Title");
        assert_eq!(item.year, "unknown");
        assert_eq!(item.poster, "");
    }
}
