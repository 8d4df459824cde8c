//! Provider-type capability dispatch
//!
//! Each supported catalog convention supplies the same pair of
//! capabilities — build a listing URL, parse a listing body — so the
//! query path never branches on provider type. A kind without a catalog
//! implementation is reported as unsupported before any network call.

use crate::models::{ApiSource, QueryResult, SourceKind};
use crate::services::maccms::MaccmsApi;

/// Parameters of one listing query.
///
/// Presence is decided the way the upstream convention expects: an empty
/// string counts as absent, mirroring how callers hand through raw query
/// parameters.
#[derive(Debug, Clone, Default)]
pub struct ListingParams {
    pub query: Option<String>,
    pub category_id: Option<String>,
    pub page: u32,
}

impl ListingParams {
    pub fn search_text(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    pub fn category(&self) -> Option<&str> {
        self.category_id.as_deref().filter(|t| !t.is_empty())
    }
}

/// One catalog convention: URL construction plus response parsing
pub trait CatalogApi: Send + Sync {
    /// Build the upstream listing URL for these parameters
    fn listing_url(&self, source: &ApiSource, params: &ListingParams) -> String;

    /// Turn an upstream listing body into a query result
    fn parse_listing(&self, source: &ApiSource, params: &ListingParams, body: &str)
        -> QueryResult;
}

impl SourceKind {
    /// Catalog implementation for this provider type, if supported
    pub fn catalog(&self) -> Option<&'static dyn CatalogApi> {
        match self {
            SourceKind::Maccms => Some(&MaccmsApi),
            SourceKind::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maccms_kind_has_catalog() {
        assert!(SourceKind::Maccms.catalog().is_some());
        assert!(SourceKind::Unknown.catalog().is_none());
    }

    #[test]
    fn test_empty_params_count_as_absent() {
        let params = ListingParams {
            query: Some(String::new()),
            category_id: Some(String::new()),
            page: 1,
        };
        assert!(params.search_text().is_none());
        assert!(params.category().is_none());
    }
}
