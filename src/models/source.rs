use serde::{Deserialize, Serialize};

/// Provider type tag for a configured source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Maccms,
    #[serde(other)]
    Unknown,
}

impl Default for SourceKind {
    fn default() -> Self {
        Self::Maccms
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Maccms => write!(f, "maccms"),
            SourceKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// One configured upstream catalog source, as supplied by the registry.
///
/// Read-only for the whole request path. When `detail` is present the
/// source has no structured detail endpoint and single-title lookups go
/// through the HTML detail scraper against that base URL instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSource {
    /// Stable key identifying the source ("dyttzy", "ffzy", ...)
    pub key: String,
    /// Human-readable display name
    pub name: String,
    /// Base URL of the structured catalog API
    pub api: String,
    #[serde(default)]
    pub kind: SourceKind,
    /// HTML detail-page base URL for sources without a detail API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiSource {
    /// Whether detail lookups scrape an HTML page instead of the API
    pub fn uses_detail_scrape(&self) -> bool {
        self.detail.is_some()
    }
}
