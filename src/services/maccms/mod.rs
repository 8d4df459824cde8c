//! Maccms Catalog Integration
//!
//! This module provides integration with catalog providers following the
//! maccms JSON convention, plus the HTML detail-page fallback used by
//! sources without a structured detail endpoint.
//!
//! # Overview
//!
//! - **Client**: listing queries and single-title detail lookups
//! - **Playlist**: resolving delimited playlist text into stream URLs
//! - **Scraper**: pattern-based extraction from rendered detail pages
//!
//! # Request shapes
//!
//! ```text
//! {api}?ac=videolist&wd={query}&pg={page}    text search
//! {api}?ac=videolist&t={category}&pg={page}  by category
//! {api}?ac=class                             categories only
//! {api}?ac=videolist&ids={id}                detail
//! {detail}/index.php/vod/detail/id/{id}.html scraped detail page
//! ```

pub mod client;
pub mod playlist;
pub mod scraper;
pub mod types;

// Re-exports for convenience
pub use client::{MaccmsApi, MaccmsClient, SourceError};
