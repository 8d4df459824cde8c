//! Playlist text resolution
//!
//! Maccms providers ship episode lists as a single delimited string:
//! play-source groups (mirrors of the same title) separated by `$$$`,
//! episodes within a group separated by `#`, and each episode's name/URL
//! pair separated by `$`. Real feeds are messy — groups of uneven
//! completeness, repeated URLs, bare URLs dumped into free text — so the
//! resolvers here are deliberately tolerant: malformed input yields an
//! empty list, never an error.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Delimiter-prefixed stream manifest URL ("$https://...m3u8")
    static ref PREFIXED_STREAM_REGEX: Regex =
        Regex::new(r#"\$(https?://[^"'\s]+?\.m3u8)"#).unwrap();
    /// Bare stream manifest URL, for scanning free text
    static ref BARE_STREAM_REGEX: Regex =
        Regex::new(r#"https?://[^"'\s]+?\.m3u8"#).unwrap();
}

/// Deduplicate URLs keeping first-occurrence order
fn dedup_keep_order<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for url in urls {
        if seen.insert(url.clone()) {
            out.push(url);
        }
    }
    out
}

/// Resolve episodes from whole playlist text (listing path).
///
/// Scans every `$$$`-separated group independently for prefixed stream
/// URLs and keeps the group with the most matches; a later group must
/// yield strictly more matches to displace an earlier one, so ties go to
/// the first group examined. This is a best-effort guess at the most
/// complete mirror — replace it if the upstream format ever grows an
/// explicit default-group flag.
pub fn resolve_episodes(play_url: &str) -> Vec<String> {
    let mut best: Vec<String> = Vec::new();

    for group in play_url.split("$$$") {
        let matches: Vec<String> = PREFIXED_STREAM_REGEX
            .captures_iter(group)
            .map(|caps| caps[1].to_string())
            .collect();
        if matches.len() > best.len() {
            best = matches;
        }
    }

    dedup_keep_order(best)
}

/// Resolve episodes from the primary play-source group only (detail path).
///
/// Takes the first `$$$`-separated group and walks its `#`-separated
/// `name$url` pairs, keeping only well-formed HTTP(S) URLs.
pub fn primary_group_episodes(play_url: &str) -> Vec<String> {
    let primary = play_url.split("$$$").next().unwrap_or("");

    let urls = primary.split('#').filter_map(|episode| {
        let mut parts = episode.splitn(2, '$');
        parts.next();
        parts.next().map(str::to_string)
    });

    dedup_keep_order(
        urls.filter(|url| url.starts_with("http://") || url.starts_with("https://")),
    )
}

/// Scan free-form synopsis text for embedded stream URLs.
///
/// Fallback for detail payloads whose play-url field is unusable; any
/// leading delimiter character is stripped from the matches.
pub fn content_episodes(content: &str) -> Vec<String> {
    dedup_keep_order(
        BARE_STREAM_REGEX
            .find_iter(content)
            .map(|m| m.as_str().strip_prefix('$').unwrap_or(m.as_str()).to_string()),
    )
}
