//! Maccms API wire types
//!
//! The maccms convention is loose: fields come and go between installs,
//! and numeric fields are encoded as numbers by some providers and as
//! strings by others. Everything here defaults rather than fails.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{ApiSource, VideoItem};
use crate::utils::{clean_html_tags, extract_year, normalize_text};

use super::playlist;

/// Upstream field that is a number on some installs and a string on others
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumOrStr {
    Num(i64),
    Str(String),
}

impl NumOrStr {
    pub fn as_text(&self) -> String {
        match self {
            NumOrStr::Num(n) => n.to_string(),
            NumOrStr::Str(s) => s.clone(),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            NumOrStr::Num(n) => *n,
            NumOrStr::Str(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

/// Response envelope shared by the videolist and class endpoints
#[derive(Debug, Deserialize)]
pub struct MaccmsResponse {
    /// Upstream status, 1 = ok
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub list: Option<Vec<MaccmsItem>>,
    /// Category objects, forwarded to the caller without normalization
    #[serde(default, rename = "class")]
    pub classes: Option<Vec<Value>>,
    #[serde(default)]
    pub total: Option<NumOrStr>,
}

impl MaccmsResponse {
    pub fn total_count(&self) -> Option<u64> {
        self.total.as_ref().map(|t| t.as_i64().max(0) as u64)
    }
}

/// One title object from a videolist response
#[derive(Debug, Deserialize)]
pub struct MaccmsItem {
    #[serde(default)]
    pub vod_id: Option<NumOrStr>,
    #[serde(default)]
    pub vod_name: Option<String>,
    #[serde(default)]
    pub vod_pic: Option<String>,
    #[serde(default)]
    pub vod_play_url: Option<String>,
    #[serde(default)]
    pub vod_class: Option<String>,
    #[serde(default)]
    pub vod_year: Option<NumOrStr>,
    #[serde(default)]
    pub vod_content: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub vod_douban_id: Option<NumOrStr>,
}

impl MaccmsItem {
    /// Normalize a listing item into the canonical record.
    ///
    /// Episodes use the whole-text resolution path: every play-source
    /// group is scanned and the most complete one wins.
    pub fn to_listing_item(&self, source: &ApiSource) -> VideoItem {
        let episodes = self
            .vod_play_url
            .as_deref()
            .map(playlist::resolve_episodes)
            .unwrap_or_default();

        self.build_item(source, self.id_text(), episodes)
    }

    /// Normalize a detail item into the canonical record.
    ///
    /// Episodes come from the primary play-source group; when that group
    /// yields nothing, stream URLs embedded in the synopsis are used.
    pub fn to_detail_item(&self, source: &ApiSource, id: &str) -> VideoItem {
        let mut episodes = self
            .vod_play_url
            .as_deref()
            .map(playlist::primary_group_episodes)
            .unwrap_or_default();

        if episodes.is_empty() {
            episodes = self
                .vod_content
                .as_deref()
                .map(playlist::content_episodes)
                .unwrap_or_default();
        }

        self.build_item(source, id.to_string(), episodes)
    }

    fn id_text(&self) -> String {
        self.vod_id.as_ref().map(NumOrStr::as_text).unwrap_or_default()
    }

    fn build_item(&self, source: &ApiSource, id: String, episodes: Vec<String>) -> VideoItem {
        let year_raw = self.vod_year.as_ref().map(NumOrStr::as_text);

        VideoItem {
            id,
            title: normalize_text(self.vod_name.as_deref().unwrap_or("")),
            poster: self.vod_pic.clone().unwrap_or_default(),
            episodes,
            source: source.key.clone(),
            source_name: source.name.clone(),
            class: self.vod_class.clone().unwrap_or_default(),
            year: extract_year(year_raw.as_deref()),
            desc: clean_html_tags(self.vod_content.as_deref().unwrap_or("")),
            type_name: self.type_name.clone().unwrap_or_default(),
            douban_id: self.vod_douban_id.as_ref().map(NumOrStr::as_i64).unwrap_or(0),
        }
    }
}
