use serde::Serialize;
use serde_json::Value;

/// Normalized title record — the canonical output of every query path.
///
/// Field names follow the upstream-agnostic contract consumed by the
/// search/browse features, so this serializes without renames.
#[derive(Debug, Clone, Serialize)]
pub struct VideoItem {
    /// Upstream title identifier, stringified
    pub id: String,
    /// Display name, trimmed with whitespace runs collapsed
    pub title: String,
    /// Cover image URL, empty when unknown
    pub poster: String,
    /// Playable stream URLs, deduplicated in first-seen order
    pub episodes: Vec<String>,
    /// Key of the source that produced this record
    pub source: String,
    /// Display name of that source
    pub source_name: String,
    /// Upstream category label, empty allowed
    pub class: String,
    /// 4-digit year or the literal "unknown"
    pub year: String,
    /// Synopsis with markup stripped
    pub desc: String,
    /// Upstream free-text type label
    pub type_name: String,
    /// Douban cross-reference id, 0 when absent
    pub douban_id: i64,
}

/// Outcome of a listing query against one source.
///
/// Listing failures are data, not errors: an unreachable or misbehaving
/// source yields `success: false` with a message and the caller moves on
/// to its other sources.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<VideoItem>>,
    /// Raw category objects, forwarded from upstream unmodified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResult {
    /// Successful listing page
    pub fn listing(list: Vec<VideoItem>, total: Option<u64>) -> Self {
        Self {
            success: true,
            list: Some(list),
            categories: None,
            total,
            message: None,
        }
    }

    /// Successful categories-only response; `list` is omitted
    pub fn categories(categories: Vec<Value>) -> Self {
        Self {
            success: true,
            list: None,
            categories: Some(categories),
            total: None,
            message: None,
        }
    }

    /// Soft failure carrying a human-readable reason
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            list: None,
            categories: None,
            total: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_without_list() {
        let result = QueryResult::failure("Unsupported API type.");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unsupported API type.");
        assert!(json.get("list").is_none());
        assert!(json.get("categories").is_none());
    }

    #[test]
    fn test_categories_omits_list_field() {
        let result = QueryResult::categories(vec![serde_json::json!({"type_id": 1})]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("list").is_none());
        assert_eq!(json["categories"][0]["type_id"], 1);
    }
}
