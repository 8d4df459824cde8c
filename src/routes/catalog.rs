//! Catalog query routes
//!
//! Thin handlers mapping the HTTP surface onto the catalog engine: one
//! upstream request per call, no fan-out, no caching. Listing failures
//! are data (`success: false`), so /api/search always answers 200 for a
//! known source; detail failures surface as 502 because there is no
//! partial result to return.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{ApiSource, SourceKind};
use crate::services::catalog::ListingParams;
use crate::AppState;

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct SearchQuery {
    pub source: String,
    /// Free-text search, takes precedence over `t`
    pub q: Option<String>,
    /// Category id
    pub t: Option<String>,
    /// Page number, 1-based
    pub pg: Option<u32>,
}

#[derive(Deserialize)]
pub struct DetailQuery {
    pub source: String,
    pub id: String,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct SourcesResponse {
    pub total: usize,
    pub sources: Vec<SourceSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub key: String,
    pub name: String,
    pub kind: SourceKind,
    /// Whether detail lookups scrape an HTML page instead of the API
    pub scraped_detail: bool,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn lookup_source<'a>(
    state: &'a AppState,
    key: &str,
) -> Result<&'a ApiSource, (StatusCode, Json<serde_json::Value>)> {
    state.registry.get(key).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("Unknown source: {}", key)})),
        )
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/sources
pub async fn list_sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sources: Vec<SourceSummary> = state
        .registry
        .all()
        .iter()
        .map(|source| SourceSummary {
            key: source.key.clone(),
            name: source.name.clone(),
            kind: source.kind,
            scraped_detail: source.uses_detail_scrape(),
        })
        .collect();

    Json(SourcesResponse {
        total: sources.len(),
        sources,
    })
}

/// GET /api/search?source={key}&q={text}&t={category}&pg={page}
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let source = lookup_source(&state, &query.source)?;

    let params = ListingParams {
        query: query.q,
        category_id: query.t,
        page: query.pg.unwrap_or(1).clamp(1, state.config.max_page.max(1)),
    };

    let result = state.catalog.query(source, &params).await;
    Ok(Json(result))
}

/// GET /api/detail?source={key}&id={vod_id}
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetailQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let source = lookup_source(&state, &query.source)?;

    if query.id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Missing video id"})),
        ));
    }

    let item = state.catalog.detail(source, &query.id).await.map_err(|e| {
        tracing::error!("Detail lookup failed for {}/{}: {}", source.key, query.id, e);
        (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": e.to_string()})),
        )
    })?;

    Ok(Json(item))
}
