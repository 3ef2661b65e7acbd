//! Error types for the competition scraper

use football_entities::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Errors raised while fetching and reading pages
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Url, with parent: {parent_url}, and page identifier: {anchor_text}, not found")]
    UrlNotFound { parent_url: String, anchor_text: String },

    #[error("Invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid selector {selector}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Data for competition: {name} unavailable as it is not currently supported")]
    CompetitionNotSupported { name: String },

    #[error("Failed to read competition catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse competition catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("Invalid catalog entry {key}: {source}")]
    InvalidCatalogEntry {
        key: String,
        #[source]
        source: ValidationError,
    },
}

impl ScrapeError {
    pub fn not_supported(name: impl Into<String>) -> Self {
        Self::CompetitionNotSupported { name: name.into() }
    }

    pub fn url_not_found(parent_url: impl Into<String>, anchor_text: impl Into<String>) -> Self {
        Self::UrlNotFound { parent_url: parent_url.into(), anchor_text: anchor_text.into() }
    }

    /// Whether the caller can skip the item and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CompetitionNotSupported { .. } | Self::UrlNotFound { .. })
    }
}
