//! Competition reference catalog
//!
//! The catalog maps a competition key (`premier_league`) to its static
//! description. A built-in copy ships with the crate; a file named in the
//! configuration replaces it.

use crate::error::{Result, ScrapeError};
use football_entities::{Competition, CompetitionDetails};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

const BUILTIN_CATALOG: &str = include_str!("../data/competitions.json");

/// Validated competitions keyed by name
#[derive(Debug, Clone)]
pub struct CompetitionCatalog {
    competitions: BTreeMap<String, Competition>,
}

impl CompetitionCatalog {
    /// Parse a JSON object of `key -> competition details`
    ///
    /// Every entry is validated; the first invalid one fails the load.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, CompetitionDetails> = serde_json::from_str(json)?;

        let mut competitions = BTreeMap::new();
        for (key, details) in entries {
            let competition = Competition::new(details)
                .map_err(|source| ScrapeError::InvalidCatalogEntry { key: key.clone(), source })?;
            competitions.insert(key, competition);
        }

        Ok(Self { competitions })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| ScrapeError::CatalogIo { path: path.to_path_buf(), source })?;
        let catalog = Self::from_json(&json)?;
        info!("Loaded {} competitions from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Catalog from `path` when given, the built-in one otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Competition> {
        self.competitions.get(name)
    }

    /// The configured competition, or `CompetitionNotSupported`
    pub fn competition(&self, name: &str) -> Result<Competition> {
        self.get(name).cloned().ok_or_else(|| ScrapeError::not_supported(name))
    }

    /// Supported competition keys, sorted
    pub fn names(&self) -> Vec<&str> {
        self.competitions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.competitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitions.is_empty()
    }
}
