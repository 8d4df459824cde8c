//! Maccms catalog client
//!
//! HTTP client for maccms-convention catalog providers: listing queries
//! (search, by-category, categories-only), structured detail lookups,
//! and the HTML detail-page fallback for sources without a detail API.
//!
//! Listing failures degrade to `QueryResult::failure` so one bad source
//! never breaks a caller fanning out across many; detail lookups fail
//! hard because a single-title fetch has no useful partial result.

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::models::{ApiSource, QueryResult, VideoItem};
use crate::services::catalog::{CatalogApi, ListingParams};

use super::scraper;
use super::types::MaccmsResponse;

/// Upstream "ok" sentinel in the maccms response envelope
const UPSTREAM_OK: i64 = 1;

/// Fixed header set attached to detail and scrape requests
const DETAIL_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";
const DETAIL_ACCEPT: &str = "application/json";

lazy_static! {
    static ref UPSTREAM_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "vodhub_upstream_requests_total",
        "Outbound catalog requests by source and operation",
        &["source", "op"]
    )
    .unwrap();
    static ref UPSTREAM_FAILURES: IntCounterVec = register_int_counter_vec!(
        "vodhub_upstream_failures_total",
        "Failed outbound catalog requests by source and operation",
        &["source", "op"]
    )
    .unwrap();
}

/// Maccms catalog API error types
#[derive(Debug)]
pub enum SourceError {
    /// Network/connection error (includes request timeouts)
    Network(String),
    /// Non-2xx status from the structured detail endpoint
    DetailRequest(u16),
    /// Non-2xx status from the scraped detail page
    DetailPage(u16),
    /// Detail payload with a missing or empty item array
    InvalidDetail,
    /// JSON parsing error
    Parse(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Network(e) => write!(f, "Network error: {}", e),
            SourceError::DetailRequest(code) => write!(f, "detail request failed: {}", code),
            SourceError::DetailPage(code) => write!(f, "detail page request failed: {}", code),
            SourceError::InvalidDetail => write!(f, "detail content invalid"),
            SourceError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<SourceError> for String {
    fn from(err: SourceError) -> Self {
        err.to_string()
    }
}

// ============================================================================
// Maccms catalog convention
// ============================================================================

/// The maccms catalog convention (`?ac=videolist` / `?ac=class`)
pub struct MaccmsApi;

impl CatalogApi for MaccmsApi {
    /// Mutually exclusive URL variants, by precedence: text search, then
    /// by-category, then categories-only.
    fn listing_url(&self, source: &ApiSource, params: &ListingParams) -> String {
        if let Some(query) = params.search_text() {
            format!(
                "{}?ac=videolist&wd={}&pg={}",
                source.api,
                urlencoding::encode(query),
                params.page
            )
        } else if let Some(category_id) = params.category() {
            format!(
                "{}?ac=videolist&t={}&pg={}",
                source.api, category_id, params.page
            )
        } else {
            format!("{}?ac=class", source.api)
        }
    }

    fn parse_listing(
        &self,
        source: &ApiSource,
        params: &ListingParams,
        body: &str,
    ) -> QueryResult {
        let data: MaccmsResponse = match serde_json::from_str(body) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to parse listing response from {}: {}", source.name, e);
                debug!("Response text: {}", body.chars().take(500).collect::<String>());
                return QueryResult::failure(format!("Invalid JSON response: {}", e));
            }
        };

        if data.code != UPSTREAM_OK {
            return QueryResult::failure(
                data.msg
                    .unwrap_or_else(|| "API returned an error code.".to_string()),
            );
        }

        let total = data.total_count();

        // Categories-only request: neither search text nor category id was
        // supplied, and the payload carries the category array.
        if params.search_text().is_none() && params.category().is_none() {
            if let Some(classes) = data.classes {
                return QueryResult::categories(classes);
            }
        }

        let items = match data.list {
            Some(items) if !items.is_empty() => items,
            _ => return QueryResult::listing(Vec::new(), Some(0)),
        };

        let list: Vec<VideoItem> = items
            .iter()
            .map(|item| item.to_listing_item(source))
            .collect();

        QueryResult::listing(list, total)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Catalog client shared by all request handlers (connection pooling)
pub struct MaccmsClient {
    http: Client,
    listing_timeout: Duration,
    detail_timeout: Duration,
}

impl MaccmsClient {
    /// Create a new catalog client.
    ///
    /// The timeouts are per-request deadlines: reqwest cancels the
    /// in-flight request when one expires, on every exit path, so no
    /// detached timer survives a call.
    pub fn new(user_agent: &str, listing_timeout_ms: u64, detail_timeout_ms: u64) -> Self {
        let http = Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            listing_timeout: Duration::from_millis(listing_timeout_ms),
            detail_timeout: Duration::from_millis(detail_timeout_ms),
        }
    }

    /// Run a listing query against one source.
    ///
    /// Never fails hard: unsupported provider types, HTTP errors,
    /// timeouts, and upstream error codes all come back as
    /// `success: false` with a message, and no network call is made for
    /// an unsupported type.
    pub async fn query(&self, source: &ApiSource, params: &ListingParams) -> QueryResult {
        let Some(api) = source.kind.catalog() else {
            return QueryResult::failure("Unsupported API type.");
        };

        let url = api.listing_url(source, params);
        debug!("Catalog listing request: {}", url);
        UPSTREAM_REQUESTS
            .with_label_values(&[source.key.as_str(), "listing"])
            .inc();

        let response = match self
            .http
            .get(&url)
            .timeout(self.listing_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                UPSTREAM_FAILURES
                    .with_label_values(&[source.key.as_str(), "listing"])
                    .inc();
                warn!("Listing request to {} failed: {}", source.name, e);
                let message = if e.is_timeout() {
                    format!(
                        "Request timed out after {}ms",
                        self.listing_timeout.as_millis()
                    )
                } else {
                    format!("Network or API error: {}", e)
                };
                return QueryResult::failure(message);
            }
        };

        let status = response.status();
        if !status.is_success() {
            UPSTREAM_FAILURES
                .with_label_values(&[source.key.as_str(), "listing"])
                .inc();
            return QueryResult::failure(format!(
                "Request failed with status: {}",
                status.as_u16()
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                UPSTREAM_FAILURES
                    .with_label_values(&[source.key.as_str(), "listing"])
                    .inc();
                return QueryResult::failure(format!("Network or API error: {}", e));
            }
        };

        api.parse_listing(source, params, &body)
    }

    /// Fetch the canonical record for a single title.
    ///
    /// Sources carrying an HTML-detail base URL are scraped; everything
    /// else goes through the structured detail endpoint.
    pub async fn detail(&self, source: &ApiSource, id: &str) -> Result<VideoItem, SourceError> {
        if source.uses_detail_scrape() {
            return self.scrape_detail(source, id).await;
        }

        let url = format!("{}?ac=videolist&ids={}", source.api, id);
        debug!("Catalog detail request: {}", url);
        UPSTREAM_REQUESTS
            .with_label_values(&[source.key.as_str(), "detail"])
            .inc();

        let response = self
            .http
            .get(&url)
            .header("User-Agent", DETAIL_USER_AGENT)
            .header("Accept", DETAIL_ACCEPT)
            .timeout(self.detail_timeout)
            .send()
            .await
            .map_err(|e| {
                UPSTREAM_FAILURES
                    .with_label_values(&[source.key.as_str(), "detail"])
                    .inc();
                SourceError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            UPSTREAM_FAILURES
                .with_label_values(&[source.key.as_str(), "detail"])
                .inc();
            return Err(SourceError::DetailRequest(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        parse_detail_body(source, id, &body)
    }

    /// Fetch and scrape the rendered HTML detail page for a title
    async fn scrape_detail(&self, source: &ApiSource, id: &str) -> Result<VideoItem, SourceError> {
        let base = source
            .detail
            .as_deref()
            .unwrap_or(&source.api)
            .trim_end_matches('/');
        let url = format!("{}/index.php/vod/detail/id/{}.html", base, id);
        debug!("Catalog detail-page request: {}", url);
        UPSTREAM_REQUESTS
            .with_label_values(&[source.key.as_str(), "scrape"])
            .inc();

        let response = self
            .http
            .get(&url)
            .header("User-Agent", DETAIL_USER_AGENT)
            .header("Accept", DETAIL_ACCEPT)
            .timeout(self.detail_timeout)
            .send()
            .await
            .map_err(|e| {
                UPSTREAM_FAILURES
                    .with_label_values(&[source.key.as_str(), "scrape"])
                    .inc();
                SourceError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            UPSTREAM_FAILURES
                .with_label_values(&[source.key.as_str(), "scrape"])
                .inc();
            return Err(SourceError::DetailPage(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(scraper::parse_detail_page(source, id, &html))
    }
}

/// Parse a structured detail body into the canonical record.
///
/// A missing or empty item array is fatal for a single-title lookup.
fn parse_detail_body(source: &ApiSource, id: &str, body: &str) -> Result<VideoItem, SourceError> {
    let data: MaccmsResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let item = data
        .list
        .as_ref()
        .and_then(|items| items.first())
        .ok_or(SourceError::InvalidDetail)?;

    Ok(item.to_detail_item(source, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn source() -> ApiSource {
        ApiSource {
            key: "testsrc".to_string(),
            name: "Test Source".to_string(),
            api: "http://example.com/api.php/provide/vod".to_string(),
            kind: SourceKind::Maccms,
            detail: None,
        }
    }

    fn params(query: Option<&str>, category_id: Option<&str>, page: u32) -> ListingParams {
        ListingParams {
            query: query.map(str::to_string),
            category_id: category_id.map(str::to_string),
            page,
        }
    }

    #[test]
    fn test_listing_url_search() {
        let url = MaccmsApi.listing_url(&source(), &params(Some("star wars"), None, 2));
        assert_eq!(
            url,
            "http://example.com/api.php/provide/vod?ac=videolist&wd=star%20wars&pg=2"
        );
    }

    #[test]
    fn test_listing_url_search_takes_precedence() {
        let url = MaccmsApi.listing_url(&source(), &params(Some("q"), Some("6"), 1));
        assert!(url.contains("wd=q"));
        assert!(!url.contains("t=6"));
    }

    #[test]
    fn test_listing_url_category() {
        let url = MaccmsApi.listing_url(&source(), &params(None, Some("6"), 3));
        assert_eq!(
            url,
            "http://example.com/api.php/provide/vod?ac=videolist&t=6&pg=3"
        );
    }

    #[test]
    fn test_listing_url_categories_only() {
        let url = MaccmsApi.listing_url(&source(), &params(None, None, 1));
        assert_eq!(url, "http://example.com/api.php/provide/vod?ac=class");
    }

    #[test]
    fn test_parse_listing_categories_only() {
        let body = r#"{"code":1,"class":[{"type_id":1,"type_name":"Action"}]}"#;
        let result = MaccmsApi.parse_listing(&source(), &params(None, None, 1), body);

        assert!(result.success);
        assert!(result.list.is_none());
        let categories = result.categories.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0]["type_id"], 1);
    }

    #[test]
    fn test_parse_listing_class_array_ignored_for_search() {
        let body = r#"{"code":1,"class":[{"type_id":1}],"list":[],"total":0}"#;
        let result = MaccmsApi.parse_listing(&source(), &params(Some("q"), None, 1), body);

        assert!(result.success);
        assert!(result.categories.is_none());
        assert_eq!(result.list.unwrap().len(), 0);
        assert_eq!(result.total, Some(0));
    }

    #[test]
    fn test_parse_listing_empty_list_is_success() {
        let body = r#"{"code":1,"list":[],"total":0}"#;
        let result = MaccmsApi.parse_listing(&source(), &params(Some("nothing"), None, 1), body);

        assert!(result.success);
        assert_eq!(result.list.unwrap().len(), 0);
        assert_eq!(result.total, Some(0));
        assert!(result.message.is_none());
    }

    #[test]
    fn test_parse_listing_upstream_error_code() {
        let body = r#"{"code":0,"msg":"ip banned"}"#;
        let result = MaccmsApi.parse_listing(&source(), &params(Some("q"), None, 1), body);

        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("ip banned"));
    }

    #[test]
    fn test_parse_listing_invalid_json() {
        let result =
            MaccmsApi.parse_listing(&source(), &params(Some("q"), None, 1), "<html>oops</html>");

        assert!(!result.success);
        assert!(result.message.unwrap().starts_with("Invalid JSON response"));
    }

    #[test]
    fn test_parse_listing_maps_items() {
        let body = r#"{
            "code": 1,
            "total": 1,
            "list": [{
                "vod_id": 9,
                "vod_name": "Title",
                "vod_pic": "http://img.example.com/9.jpg",
                "vod_play_url": "EP1$https://cdn.example.com/9.m3u8"
            }]
        }"#;
        let result = MaccmsApi.parse_listing(&source(), &params(Some("title"), None, 1), body);

        assert!(result.success);
        let list = result.list.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "9");
        assert_eq!(list[0].episodes, vec!["https://cdn.example.com/9.m3u8"]);
        assert_eq!(result.total, Some(1));
    }

    #[test]
    fn test_parse_detail_body_empty_list_is_invalid() {
        let err = parse_detail_body(&source(), "1", r#"{"code":1,"list":[]}"#).unwrap_err();
        assert!(matches!(err, SourceError::InvalidDetail));
        assert_eq!(err.to_string(), "detail content invalid");
    }

    #[test]
    fn test_parse_detail_body_primary_group() {
        let body = r#"{
            "code": 1,
            "list": [{
                "vod_id": 3,
                "vod_name": "Detail Title",
                "vod_play_url": "EP1$https://a.example.com/1.m3u8#EP2$https://a.example.com/2.m3u8$$$EP1$https://b.example.com/1.m3u8",
                "vod_year": "2019-01-01"
            }]
        }"#;
        let item = parse_detail_body(&source(), "3", body).unwrap();

        assert_eq!(item.id, "3");
        assert_eq!(
            item.episodes,
            vec![
                "https://a.example.com/1.m3u8",
                "https://a.example.com/2.m3u8"
            ]
        );
        assert_eq!(item.year, "2019");
    }

    #[test]
    fn test_error_display_messages() {
        assert_eq!(
            SourceError::DetailRequest(503).to_string(),
            "detail request failed: 503"
        );
        assert_eq!(
            SourceError::DetailPage(404).to_string(),
            "detail page request failed: 404"
        );
    }

    #[tokio::test]
    async fn test_unsupported_kind_fails_without_network() {
        let client = MaccmsClient::new("test-agent", 8000, 10000);
        let other = ApiSource {
            // Nothing listens here; a network attempt would surface as a
            // different message than the unsupported-type fast path.
            api: "http://127.0.0.1:9".to_string(),
            kind: SourceKind::Unknown,
            ..source()
        };

        let result = client.query(&other, &params(Some("q"), None, 1)).await;
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Unsupported API type."));
    }

    #[tokio::test]
    async fn test_listing_timeout_is_soft_failure() {
        // A listener that accepts connections but never responds, so the
        // request runs into the listing deadline.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => held.push(socket),
                    Err(_) => break,
                }
            }
        });

        let client = MaccmsClient::new("test-agent", 200, 200);
        let slow = ApiSource {
            api: format!("http://{}/api.php/provide/vod", addr),
            ..source()
        };

        let started = std::time::Instant::now();
        let result = client.query(&slow, &params(Some("q"), None, 1)).await;

        assert!(!result.success);
        assert!(result.message.unwrap().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
