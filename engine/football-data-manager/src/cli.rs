//! # Command Line Interface
//!
//! Commands for ingesting competitions and seasons and for browsing what the
//! site and the database hold.

use crate::config::ManagerConfig;
use crate::manager::{FootballDataManager, ProcessingSummary};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use competition_scraper::{FootballScraper, GenderFilter};
use football_entities::{season_range, DashStyle, Inclusive, Season};
use football_store::{FootballRepository, PgRecordStore};
use std::path::PathBuf;

/// Football statistics ingester
#[derive(Parser, Debug)]
#[command(name = "football-data-manager")]
#[command(about = "Scrape football competitions and seasons into PostgreSQL")]
pub struct Cli {
    /// Configuration file (defaults to ./footy.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configured one
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store competitions and their seasons
    Process {
        /// Competition names, e.g. premier_league
        #[arg(required = true)]
        competitions: Vec<String>,
        /// First season, e.g. 2019-2020
        #[arg(long)]
        from: Season,
        /// Last season (defaults to the current one)
        #[arg(long)]
        to: Option<Season>,
        /// Endpoints to include: left, right, both or neither
        #[arg(long, default_value = "both")]
        inclusive: Inclusive,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List competitions
    Competitions {
        #[arg(value_enum, default_value_t = CompetitionSource::Supported)]
        source: CompetitionSource,
        /// Only competitions of this country (site listing)
        #[arg(long)]
        country: Option<String>,
        /// male, female or both (site listing)
        #[arg(long, default_value = "male")]
        gender: GenderFilter,
    },
    /// List countries known to the site
    Countries,
    /// Print the seasons of a range
    Seasons {
        from: Season,
        to: Season,
        #[arg(long, default_value = "both")]
        inclusive: Inclusive,
        /// Separate the years with an en dash
        #[arg(long)]
        endash: bool,
    },
}

/// Where `competitions` reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompetitionSource {
    /// Competitions the scraper has a static description of
    Supported,
    /// Competitions already in the database
    Stored,
    /// Competitions listed on the site
    Site,
}

/// Season labels from `from` to `to`
pub fn season_labels(from: Season, to: Season, inclusive: Inclusive, dash: DashStyle) -> Result<Vec<String>> {
    let seasons = season_range(from, to, inclusive).context("Invalid season range")?;
    Ok(seasons.map(|season| season.to_string_with(dash)).collect())
}

/// CLI handler
pub struct CliHandler {
    config: ManagerConfig,
}

impl CliHandler {
    pub fn new(config: ManagerConfig) -> Self {
        Self { config }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Process { competitions, from, to, inclusive, json } => {
                let to = to.unwrap_or_else(Season::current);
                let summary = self.process(&competitions, from, to, inclusive).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    print_summary(&summary);
                }
            }
            Commands::Competitions { source, country, gender } => {
                for name in self.competitions(source, country.as_deref(), gender).await? {
                    println!("{}", name);
                }
            }
            Commands::Countries => {
                let scraper = FootballScraper::from_config(&self.config.scraper)?;
                for country in scraper.get_countries().await? {
                    println!("{}", country);
                }
            }
            Commands::Seasons { from, to, inclusive, endash } => {
                let dash = if endash { DashStyle::Endash } else { DashStyle::Dash };
                for label in season_labels(from, to, inclusive, dash)? {
                    println!("{}", label);
                }
            }
        }
        Ok(())
    }

    async fn process(
        &self,
        competitions: &[String],
        from: Season,
        to: Season,
        inclusive: Inclusive,
    ) -> Result<ProcessingSummary> {
        let manager = FootballDataManager::connect(&self.config).await?;
        let result = manager.process_competitions(competitions, from, to, inclusive).await;
        manager.shutdown().await;
        result
    }

    async fn competitions(
        &self,
        source: CompetitionSource,
        country: Option<&str>,
        gender: GenderFilter,
    ) -> Result<Vec<String>> {
        match source {
            CompetitionSource::Supported => {
                let scraper = FootballScraper::from_config(&self.config.scraper)?;
                Ok(scraper.supported_competitions().into_iter().map(str::to_string).collect())
            }
            CompetitionSource::Stored => {
                let store = PgRecordStore::connect(&self.config.database)
                    .await
                    .context("Failed to connect to database")?;
                let repository = FootballRepository::new(store);
                let stored = repository.list_competitions().await;
                repository.store().close().await;
                Ok(stored?
                    .iter()
                    .map(|competition| format!("{} ({})", competition.name(), competition.alt_name()))
                    .collect())
            }
            CompetitionSource::Site => {
                let scraper = FootballScraper::from_config(&self.config.scraper)?;
                Ok(scraper.get_competitions(country, gender).await?)
            }
        }
    }
}

fn print_summary(summary: &ProcessingSummary) {
    println!("Processed: {}", summary.processed.join(", "));
    if !summary.created.is_empty() {
        println!("Created:   {}", summary.created.join(", "));
    }
    if !summary.skipped.is_empty() {
        println!("Skipped:   {}", summary.skipped.join(", "));
    }
    println!("Seasons stored: {}, missing: {}", summary.seasons_stored, summary.seasons_missing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process() {
        let cli = Cli::try_parse_from([
            "football-data-manager",
            "process",
            "premier_league",
            "la_liga",
            "--from",
            "2019-2020",
            "--inclusive",
            "left",
        ])
        .unwrap();

        match cli.command {
            Commands::Process { competitions, from, to, inclusive, json } => {
                assert_eq!(competitions, vec!["premier_league", "la_liga"]);
                assert_eq!(from, Season::starting(2019).unwrap());
                assert_eq!(to, None);
                assert_eq!(inclusive, Inclusive::Left);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_process_requires_competitions() {
        assert!(Cli::try_parse_from(["football-data-manager", "process", "--from", "2019-2020"]).is_err());
    }

    #[test]
    fn test_invalid_season_rejected() {
        assert!(Cli::try_parse_from(["football-data-manager", "seasons", "1999-2000", "2001-2002"]).is_err());
        assert!(Cli::try_parse_from(["football-data-manager", "seasons", "2019-2021", "2021-2022"]).is_err());
    }

    #[test]
    fn test_parse_competitions_defaults() {
        let cli = Cli::try_parse_from(["football-data-manager", "-c", "footy.toml", "competitions"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("footy.toml")));

        match cli.command {
            Commands::Competitions { source, country, gender } => {
                assert_eq!(source, CompetitionSource::Supported);
                assert_eq!(country, None);
                assert_eq!(gender, GenderFilter::Male);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_site_competitions() {
        let cli = Cli::try_parse_from([
            "football-data-manager",
            "competitions",
            "site",
            "--country",
            "england",
            "--gender",
            "both",
        ])
        .unwrap();

        match cli.command {
            Commands::Competitions { source, country, gender } => {
                assert_eq!(source, CompetitionSource::Site);
                assert_eq!(country.as_deref(), Some("england"));
                assert_eq!(gender, GenderFilter::Both);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_season_labels() {
        let from = Season::starting(2020).unwrap();
        let to = Season::starting(2022).unwrap();

        assert_eq!(
            season_labels(from, to, Inclusive::Right, DashStyle::Dash).unwrap(),
            vec!["2021-2022", "2022-2023"]
        );
        assert_eq!(
            season_labels(from, from, Inclusive::Both, DashStyle::Endash).unwrap(),
            vec!["2020\u{2013}2021"]
        );
        assert!(season_labels(from, from, Inclusive::Neither, DashStyle::Dash).unwrap().is_empty());
        assert!(season_labels(to, from, Inclusive::Both, DashStyle::Dash).is_err());
    }
}
