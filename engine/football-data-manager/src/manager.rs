//! Orchestration of scraper and repository

use crate::config::ManagerConfig;
use anyhow::{Context, Result};
use competition_scraper::{FootballScraper, HttpFetcher, PageFetcher};
use football_entities::{season_range, Competition, Inclusive, Season};
use football_store::{FootballRepository, PgRecordStore, RecordStore};
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of one [`FootballDataManager::process_competitions`] run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingSummary {
    /// Competitions whose seasons were walked
    pub processed: Vec<String>,
    /// Competitions added to storage during the run
    pub created: Vec<String>,
    /// Competitions skipped as unsupported or absent from the site
    pub skipped: Vec<String>,
    pub seasons_stored: usize,
    pub seasons_missing: usize,
}

/// Drives the scraper and the repository per competition and season
pub struct FootballDataManager<S: RecordStore, F: PageFetcher> {
    scraper: FootballScraper<F>,
    repository: FootballRepository<S>,
}

impl FootballDataManager<PgRecordStore, HttpFetcher> {
    /// Connect to the configured database and site
    pub async fn connect(config: &ManagerConfig) -> Result<Self> {
        let store = PgRecordStore::connect(&config.database)
            .await
            .context("Failed to connect to database")?;
        let scraper =
            FootballScraper::from_config(&config.scraper).context("Failed to create scraper")?;

        Ok(Self::new(scraper, FootballRepository::new(store)))
    }

    pub async fn shutdown(self) {
        self.repository.store().close().await;
        info!("Football data manager shut down");
    }
}

impl<S: RecordStore, F: PageFetcher> FootballDataManager<S, F> {
    pub fn new(scraper: FootballScraper<F>, repository: FootballRepository<S>) -> Self {
        Self { scraper, repository }
    }

    pub fn scraper(&self) -> &FootballScraper<F> {
        &self.scraper
    }

    pub fn repository(&self) -> &FootballRepository<S> {
        &self.repository
    }

    /// Stored competition `name`, scraped and added when absent
    ///
    /// `Ok(None)` means the competition is not supported and was skipped.
    async fn stored_competition(
        &self,
        name: &str,
        summary: &mut ProcessingSummary,
    ) -> Result<Option<Competition>> {
        match self.repository.get_competition_by_name(name).await {
            Ok(competition) => Ok(Some(competition)),
            Err(e) if e.is_not_found() => match self.scraper.scrape_competition(name) {
                Ok(competition) => {
                    let stored = self
                        .repository
                        .add_competition(&competition)
                        .await
                        .with_context(|| format!("Failed to add competition {name}"))?;
                    summary.created.push(name.to_string());
                    Ok(Some(stored))
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping competition {}: {}", name, e);
                    Ok(None)
                }
                Err(e) => Err(e).with_context(|| format!("Failed to scrape competition {name}")),
            },
            Err(e) => Err(e).with_context(|| format!("Failed to look up competition {name}")),
        }
    }

    /// Store every named competition and its seasons from `from` to `to`
    ///
    /// Unsupported competitions and seasons without a page are skipped with
    /// a warning. Validation, mapper and storage errors abort the run.
    pub async fn process_competitions<I, N>(
        &self,
        names: I,
        from: Season,
        to: Season,
        inclusive: Inclusive,
    ) -> Result<ProcessingSummary>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let seasons = season_range(from, to, inclusive).context("Invalid season range")?;
        let mut summary = ProcessingSummary::default();

        for name in names {
            let name = name.as_ref();

            let Some(competition) = self.stored_competition(name, &mut summary).await? else {
                summary.skipped.push(name.to_string());
                continue;
            };

            let pages = match self.scraper.process_competition(name, seasons.clone()).await {
                Ok(pages) => pages,
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping competition {}: {}", name, e);
                    summary.skipped.push(name.to_string());
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to process competition {name}"))
                }
            };

            summary.seasons_missing += seasons.len() - pages.len();
            for page in &pages {
                let season = self
                    .repository
                    .get_or_create_season(&page.season)
                    .await
                    .with_context(|| format!("Failed to store season {}", page.season))?;
                info!("Stored {} season {} (id {:?})", competition.alt_name(), season, season.id());
                summary.seasons_stored += 1;
            }

            summary.processed.push(name.to_string());
        }

        info!(
            "Processed {} competitions ({} created, {} skipped), {} seasons stored, {} missing",
            summary.processed.len(),
            summary.created.len(),
            summary.skipped.len(),
            summary.seasons_stored,
            summary.seasons_missing
        );
        Ok(summary)
    }
}
