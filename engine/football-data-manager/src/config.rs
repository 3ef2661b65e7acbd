//! Configuration management for the football data manager
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! then `FOOTY__*` environment variables (`FOOTY__DATABASE__URL`,
//! `FOOTY__LOGGING__LEVEL`, ...). `DATABASE_URL` is honoured when
//! `FOOTY__DATABASE__URL` is not set.

use anyhow::{Context, Result};
use competition_scraper::ScraperConfig;
use football_store::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the environment variables read by [`load_config`]
pub const ENV_PREFIX: &str = "FOOTY";

/// Configuration file read when none is given explicitly
pub const DEFAULT_CONFIG_FILE: &str = "footy.toml";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub database: DatabaseConfig,
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// pretty, json or compact
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Load configuration from defaults, `path` (or `footy.toml` when present)
/// and the environment
pub fn load_config(path: Option<&Path>) -> Result<ManagerConfig> {
    let environment = config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true);
    let mut config = build_config(path, Some(environment))?;

    let url_var = format!("{ENV_PREFIX}__DATABASE__URL");
    if std::env::var(&url_var).is_err() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
    }

    validate_config(&config)?;
    Ok(config)
}

fn build_config(path: Option<&Path>, environment: Option<config::Environment>) -> Result<ManagerConfig> {
    let defaults = config::Config::try_from(&ManagerConfig::default())
        .context("Failed to serialize default configuration")?;

    let mut builder = config::Config::builder().add_source(defaults);
    builder = match path {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            builder.add_source(config::File::from(path).required(true))
        }
        None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
    };
    if let Some(environment) = environment {
        builder = builder.add_source(environment);
    }

    builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Failed to parse configuration")
}

/// Validate configuration
pub fn validate_config(config: &ManagerConfig) -> Result<()> {
    config.database.validate().map_err(anyhow::Error::msg).context("Invalid database configuration")?;
    config.scraper.validate().map_err(anyhow::Error::msg).context("Invalid scraper configuration")?;

    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if let Some(path) = &config.scraper.catalog_path {
        if !path.exists() {
            return Err(anyhow::anyhow!("Competition catalog not found: {:?}", path));
        }
    }

    Ok(())
}
