//! # Competition Scraper
//!
//! Reads competition and season metadata from a football statistics site.
//!
//! ## Architecture
//!
//! - **PageFetcher**: async page source (`HttpFetcher` over reqwest, `StaticFetcher` for tests)
//! - **PageCache**: never-evicting page and link cache
//! - **CompetitionCatalog**: static description of every supported competition
//! - **FootballScraper**: link lookups, index parsing and season page discovery
//!
//! ## Usage
//!
//! ```rust
//! use competition_scraper::{CompetitionCatalog, FootballScraper, StaticFetcher};
//!
//! let scraper = FootballScraper::new(
//!     StaticFetcher::new(),
//!     CompetitionCatalog::builtin().unwrap(),
//!     "https://fbref.com",
//! );
//! let competition = scraper.scrape_competition("premier_league").unwrap();
//! assert_eq!(competition.alt_name(), "Premier League");
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod scraper;

pub use crate::cache::{PageCache, UrlKey};
pub use crate::catalog::CompetitionCatalog;
pub use crate::config::ScraperConfig;
pub use crate::error::{Result, ScrapeError};
pub use crate::fetcher::{HttpFetcher, PageFetcher, StaticFetcher};
pub use crate::scraper::{FootballScraper, GenderFilter, SeasonPage};
