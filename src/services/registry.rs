//! Source registry
//!
//! Loads the configured upstream sources from a JSON document at startup
//! and hands out read-only descriptors by key. The registry is the
//! in-process face of the site configuration store: immutable after
//! load, shared through the application state.

use anyhow::{bail, Context, Result};
use url::Url;

use crate::models::ApiSource;

/// Immutable set of configured sources, in file order
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<ApiSource>,
}

impl SourceRegistry {
    /// Load and validate the registry from a JSON file
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources file: {}", path))?;
        Self::from_json(&raw).with_context(|| format!("Invalid sources file: {}", path))
    }

    /// Parse and validate a registry document
    pub fn from_json(raw: &str) -> Result<Self> {
        let sources: Vec<ApiSource> =
            serde_json::from_str(raw).context("Failed to parse sources JSON")?;

        let mut seen = std::collections::HashSet::new();
        for source in &sources {
            if source.key.is_empty() {
                bail!("Source with empty key");
            }
            if !seen.insert(source.key.clone()) {
                bail!("Duplicate source key: {}", source.key);
            }
            validate_http_url(&source.api)
                .with_context(|| format!("Source {}: bad api URL", source.key))?;
            if let Some(detail) = &source.detail {
                validate_http_url(detail)
                    .with_context(|| format!("Source {}: bad detail URL", source.key))?;
            }
        }

        Ok(Self { sources })
    }

    /// Look up a source by its stable key
    pub fn get(&self, key: &str) -> Option<&ApiSource> {
        self.sources.iter().find(|source| source.key == key)
    }

    /// All configured sources, in file order
    pub fn all(&self) -> &[ApiSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn validate_http_url(raw: &str) -> Result<()> {
    let parsed = Url::parse(raw).with_context(|| format!("Not a URL: {}", raw))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("Unsupported URL scheme: {}", other),
    }
}
