//! # Football Data Manager
//!
//! Ties the competition scraper to the football store: every requested
//! competition is looked up in storage (scraped and added when missing), then
//! each season page found on the site is stored with get-or-create semantics.
//!
//! ## Usage
//!
//! ```no_run
//! use football_data_manager::{load_config, FootballDataManager};
//! use football_entities::{Inclusive, Season};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config(None)?;
//!     let manager = FootballDataManager::connect(&config).await?;
//!
//!     let summary = manager
//!         .process_competitions(["premier_league"], Season::starting(2020)?, Season::current(), Inclusive::Both)
//!         .await?;
//!     println!("{} seasons stored", summary.seasons_stored);
//!
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod manager;

pub use crate::config::{load_config, validate_config, LoggingConfig, ManagerConfig};
pub use crate::logging::initialize_logging_with_config;
pub use crate::manager::{FootballDataManager, ProcessingSummary};
