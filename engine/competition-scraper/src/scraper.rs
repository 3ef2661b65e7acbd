use crate::cache::{PageCache, UrlKey};
use crate::catalog::CompetitionCatalog;
use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::fetcher::{HttpFetcher, PageFetcher};
use football_entities::{Competition, Season};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Anchor text of the competitions index on the site root
pub const COMPETITIONS_ANCHOR: &str = "Competitions";
/// Anchor text of the countries index on the site root
pub const COUNTRIES_ANCHOR: &str = "Countries";
/// Id of the table listing a competition's seasons
pub const SEASONS_TABLE_ID: &str = "seasons";
/// Id of the table listing countries
pub const COUNTRIES_TABLE_ID: &str = "countries";

/// Which competitions `get_competitions` keeps, by the gender column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenderFilter {
    #[default]
    Male,
    Female,
    Both,
}

impl GenderFilter {
    fn accepts(&self, code: &str) -> bool {
        match self {
            GenderFilter::Male => code == "M",
            GenderFilter::Female => code == "F",
            GenderFilter::Both => code == "M" || code == "F",
        }
    }
}

impl FromStr for GenderFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "male" => Ok(GenderFilter::Male),
            "female" => Ok(GenderFilter::Female),
            "both" => Ok(GenderFilter::Both),
            other => Err(format!("Invalid gender filter: {other} (expected male, female or both)")),
        }
    }
}

impl fmt::Display for GenderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GenderFilter::Male => "male",
            GenderFilter::Female => "female",
            GenderFilter::Both => "both",
        })
    }
}

/// Page of one competition season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonPage {
    pub season: Season,
    pub url: String,
}

/// Football statistics site scraper
///
/// Pages are fetched once and kept in a [`PageCache`]; link lookups are
/// memoized the same way.
pub struct FootballScraper<F: PageFetcher> {
    fetcher: F,
    cache: PageCache,
    catalog: CompetitionCatalog,
    base_url: String,
}

impl FootballScraper<HttpFetcher> {
    /// Scraper over HTTP, with the catalog named by `config` (or the built-in one)
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        let catalog = CompetitionCatalog::load(config.catalog_path.as_deref())?;
        Ok(Self::new(fetcher, catalog, config.base_url.clone()))
    }
}

impl<F: PageFetcher> FootballScraper<F> {
    pub fn new(fetcher: F, catalog: CompetitionCatalog, base_url: impl Into<String>) -> Self {
        Self { fetcher, cache: PageCache::new(), catalog, base_url: base_url.into() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn catalog(&self) -> &CompetitionCatalog {
        &self.catalog
    }

    /// Statically configured entity for a supported competition
    pub fn scrape_competition(&self, name: &str) -> Result<Competition> {
        let competition = self.catalog.competition(name)?;
        debug!("Scraped competition {} ({})", name, competition.alt_name());
        Ok(competition)
    }

    pub fn supported_competitions(&self) -> Vec<&str> {
        self.catalog.names()
    }

    async fn page(&self, url: &str) -> Result<Arc<str>> {
        if let Some(page) = self.cache.page(url).await {
            debug!("Page cache hit: {}", url);
            return Ok(page);
        }
        let body = self.fetcher.fetch(url).await?;
        Ok(self.cache.insert_page(url, body).await)
    }

    /// Absolute url of the first anchor reading `anchor_text` on `parent_url`,
    /// searched within table `table_id` when given
    pub async fn find_url(
        &self,
        parent_url: &str,
        anchor_text: &str,
        table_id: Option<&str>,
    ) -> Result<String> {
        let key = UrlKey::new(parent_url, anchor_text, table_id);
        if let Some(url) = self.cache.url(&key).await {
            return Ok(url);
        }

        let page = self.page(parent_url).await?;
        let href = find_href(&page, anchor_text, table_id)?
            .ok_or_else(|| ScrapeError::url_not_found(parent_url, anchor_text))?;
        let url = self.absolute(&href)?;

        self.cache.insert_url(key, url.clone()).await;
        Ok(url)
    }

    fn absolute(&self, href: &str) -> Result<String> {
        let invalid = |message: String| ScrapeError::InvalidUrl { url: href.to_string(), message };
        let base = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        let url = base.join(href).map_err(|e| invalid(e.to_string()))?;
        Ok(url.to_string())
    }

    pub async fn competitions_url(&self) -> Result<String> {
        self.find_url(&self.base_url, COMPETITIONS_ANCHOR, None).await
    }

    pub async fn countries_url(&self) -> Result<String> {
        self.find_url(&self.base_url, COUNTRIES_ANCHOR, None).await
    }

    /// Page of a supported competition, found on the competitions index by
    /// its display name
    pub async fn competition_url(&self, name: &str) -> Result<String> {
        let competition = self.catalog.competition(name)?;
        let competitions_url = self.competitions_url().await?;
        self.find_url(&competitions_url, competition.alt_name(), None).await
    }

    /// Lower-cased country names from the countries table
    pub async fn get_countries(&self) -> Result<Vec<String>> {
        let url = self.countries_url().await?;
        let page = self.page(&url).await?;
        let countries = parse_countries(&page)?;
        info!("Found {} countries", countries.len());
        Ok(countries)
    }

    /// Competition names from the competitions index, filtered by gender
    /// and, when given, by country
    pub async fn get_competitions(
        &self,
        country: Option<&str>,
        gender: GenderFilter,
    ) -> Result<Vec<String>> {
        let url = self.competitions_url().await?;
        let page = self.page(&url).await?;
        let competitions = parse_competitions(&page, country, gender)?;
        info!(
            "Found {} competitions (country: {}, gender: {})",
            competitions.len(),
            country.unwrap_or("any"),
            gender
        );
        Ok(competitions)
    }

    /// Season pages of competition `name`
    ///
    /// A season whose page is missing from the competition's seasons table
    /// is logged and skipped.
    pub async fn process_competition<I>(&self, name: &str, seasons: I) -> Result<Vec<SeasonPage>>
    where
        I: IntoIterator<Item = Season>,
    {
        let competition_url = self.competition_url(name).await?;
        info!("Processing competition {} from {}", name, competition_url);

        let mut pages = Vec::new();
        for season in seasons {
            let label = season.to_string();
            match self.find_url(&competition_url, &label, Some(SEASONS_TABLE_ID)).await {
                Ok(url) => {
                    debug!("Found {} season {} at {}", name, label, url);
                    pages.push(SeasonPage { season, url });
                }
                Err(ScrapeError::UrlNotFound { .. }) => {
                    warn!("No page for {} season {}, skipping", name, label);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(pages)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// `href` of the first anchor whose text is `anchor_text`
fn find_href(html: &str, anchor_text: &str, table_id: Option<&str>) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let anchors = match table_id {
        Some(id) => selector(&format!("table[id=\"{id}\"] a"))?,
        None => selector("a")?,
    };

    Ok(document
        .select(&anchors)
        .find(|anchor| text_of(*anchor) == anchor_text)
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string))
}

fn parse_countries(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let rows = selector(&format!("table[id=\"{COUNTRIES_TABLE_ID}\"] tbody tr"))?;
    let country = selector("[data-stat=\"country\"]")?;

    Ok(document
        .select(&rows)
        .filter_map(|row| row.select(&country).next())
        .map(|cell| text_of(cell).to_lowercase())
        .filter(|name| !name.is_empty())
        .collect())
}

fn parse_competitions(
    html: &str,
    country: Option<&str>,
    gender: GenderFilter,
) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let rows = selector("tr")?;
    let gender_cell = selector("td[data-stat=\"gender\"]")?;
    let country_link = selector("td[data-stat=\"country\"] a")?;
    let name_cell = selector("th")?;
    let country = country.map(str::to_lowercase);

    let mut competitions = BTreeSet::new();
    for row in document.select(&rows) {
        let Some(code) = row.select(&gender_cell).next().map(text_of) else {
            continue;
        };
        if !gender.accepts(&code) {
            continue;
        }

        if let Some(country) = &country {
            let in_country = row
                .select(&country_link)
                .next()
                .and_then(|link| link.value().attr("href"))
                .is_some_and(|href| href.to_lowercase().contains(country.as_str()));
            if !in_country {
                continue;
            }
        }

        if let Some(name) = row.select(&name_cell).next().map(text_of) {
            if !name.is_empty() {
                competitions.insert(name);
            }
        }
    }

    Ok(competitions.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::StaticFetcher;
    use football_entities::{season_range, Inclusive};

    const BASE: &str = "https://fbref.test";

    const ROOT: &str = r#"<html><body>
        <a href="/en/comps/">Competitions</a>
        <a href="/en/countries/">Countries</a>
    </body></html>"#;

    const COMPETITIONS: &str = r#"<html><body><table id="comps_club">
        <thead><tr><th>Competition Name</th><th>Gender</th><th>Country</th></tr></thead>
        <tbody>
        <tr>
            <th data-stat="league_name"><a href="/en/comps/9/history/Premier-League-Seasons">Premier League</a></th>
            <td data-stat="gender">M</td>
            <td data-stat="country"><a href="/en/country/ENG/England-Football">eng ENG</a></td>
        </tr>
        <tr>
            <th data-stat="league_name"><a href="/en/comps/189/history/Womens-Super-League-Seasons">Women's Super League</a></th>
            <td data-stat="gender">F</td>
            <td data-stat="country"><a href="/en/country/ENG/England-Football">eng ENG</a></td>
        </tr>
        <tr>
            <th data-stat="league_name"><a href="/en/comps/12/history/La-Liga-Seasons">La Liga</a></th>
            <td data-stat="gender">M</td>
            <td data-stat="country"><a href="/en/country/ESP/Spain-Football">es ESP</a></td>
        </tr>
        </tbody>
    </table></body></html>"#;

    const PREMIER_LEAGUE_SEASONS: &str = r#"<html><body>
        <a href="/en/comps/9/2020-2021/elsewhere">2020-2021</a>
        <table id="seasons"><tbody>
            <tr><th><a href="/en/comps/9/2022-2023/2022-2023-Premier-League-Stats">2022-2023</a></th></tr>
            <tr><th><a href="/en/comps/9/2021-2022/2021-2022-Premier-League-Stats">2021-2022</a></th></tr>
        </tbody></table>
    </body></html>"#;

    const COUNTRIES: &str = r#"<html><body><table id="countries">
        <thead><tr><th data-stat="country">Country</th></tr></thead>
        <tbody>
            <tr><th data-stat="country"><a href="/en/country/ENG/England-Football">England</a></th></tr>
            <tr><th data-stat="country"><a href="/en/country/ESP/Spain-Football">Spain</a></th></tr>
        </tbody>
    </table></body></html>"#;

    fn scraper() -> FootballScraper<StaticFetcher> {
        let fetcher = StaticFetcher::new()
            .with_page(BASE, ROOT)
            .with_page(format!("{BASE}/en/comps/"), COMPETITIONS)
            .with_page(format!("{BASE}/en/countries/"), COUNTRIES)
            .with_page(format!("{BASE}/en/comps/9/history/Premier-League-Seasons"), PREMIER_LEAGUE_SEASONS);
        FootballScraper::new(fetcher, CompetitionCatalog::builtin().unwrap(), BASE)
    }

    #[test]
    fn test_scrape_competition() {
        let scraper = scraper();
        let competition = scraper.scrape_competition("premier_league").unwrap();
        assert_eq!(competition.name(), "premier_league");
        assert_eq!(competition.alt_name(), "Premier League");

        let error = scraper.scrape_competition("not_a_real_league").unwrap_err();
        assert!(matches!(error, ScrapeError::CompetitionNotSupported { .. }));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_supported_competitions_sorted() {
        let scraper = scraper();
        let supported = scraper.supported_competitions();
        assert!(supported.contains(&"premier_league"));
        assert!(supported.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_find_url_is_absolute_and_memoized() {
        let scraper = scraper();
        let first = scraper.competitions_url().await.unwrap();
        let second = scraper.competitions_url().await.unwrap();

        assert_eq!(first, format!("{BASE}/en/comps/"));
        assert_eq!(first, second);
        assert_eq!(scraper.fetcher.request_count(), 1);
        assert_eq!(scraper.cache().url_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_url_missing_anchor() {
        let error = scraper().find_url(BASE, "Players", None).await.unwrap_err();
        assert!(matches!(
            error,
            ScrapeError::UrlNotFound { ref anchor_text, .. } if anchor_text == "Players"
        ));
    }

    #[tokio::test]
    async fn test_find_url_restricted_to_table() {
        let scraper = scraper();
        let parent = format!("{BASE}/en/comps/9/history/Premier-League-Seasons");

        let anywhere = scraper.find_url(&parent, "2020-2021", None).await.unwrap();
        assert_eq!(anywhere, format!("{BASE}/en/comps/9/2020-2021/elsewhere"));

        let error = scraper.find_url(&parent, "2020-2021", Some(SEASONS_TABLE_ID)).await.unwrap_err();
        assert!(matches!(error, ScrapeError::UrlNotFound { .. }));

        // one fetch of the parent page serves every lookup
        assert_eq!(scraper.fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_competition_url() {
        let url = scraper().competition_url("premier_league").await.unwrap();
        assert_eq!(url, format!("{BASE}/en/comps/9/history/Premier-League-Seasons"));
    }

    #[tokio::test]
    async fn test_get_competitions_filters() {
        let scraper = scraper();

        let male = scraper.get_competitions(None, GenderFilter::Male).await.unwrap();
        assert_eq!(male, vec!["La Liga", "Premier League"]);

        let english = scraper.get_competitions(Some("England"), GenderFilter::Both).await.unwrap();
        assert_eq!(english, vec!["Premier League", "Women's Super League"]);

        let female_spanish = scraper.get_competitions(Some("spain"), GenderFilter::Female).await.unwrap();
        assert!(female_spanish.is_empty());
    }

    #[tokio::test]
    async fn test_get_countries() {
        let countries = scraper().get_countries().await.unwrap();
        assert_eq!(countries, vec!["england", "spain"]);
    }

    #[tokio::test]
    async fn test_process_competition_skips_missing_seasons() {
        let scraper = scraper();
        let seasons = season_range(
            Season::starting(2020).unwrap(),
            Season::starting(2022).unwrap(),
            Inclusive::Both,
        )
        .unwrap();

        let pages = scraper.process_competition("premier_league", seasons).await.unwrap();

        let found: Vec<String> = pages.iter().map(|page| page.season.to_string()).collect();
        assert_eq!(found, vec!["2021-2022", "2022-2023"]);
        assert_eq!(
            pages[1].url,
            format!("{BASE}/en/comps/9/2022-2023/2022-2023-Premier-League-Stats")
        );
    }

    #[tokio::test]
    async fn test_process_unsupported_competition() {
        let error = scraper()
            .process_competition("not_a_real_league", vec![Season::current()])
            .await
            .unwrap_err();
        assert!(matches!(error, ScrapeError::CompetitionNotSupported { .. }));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let scraper =
            FootballScraper::new(StaticFetcher::new(), CompetitionCatalog::builtin().unwrap(), BASE);
        let error = scraper.competitions_url().await.unwrap_err();
        assert!(matches!(error, ScrapeError::HttpStatus { status: 404, .. }));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_gender_filter_from_str() {
        assert_eq!("both".parse::<GenderFilter>(), Ok(GenderFilter::Both));
        assert!("mixed".parse::<GenderFilter>().is_err());
        assert_eq!(GenderFilter::default(), GenderFilter::Male);
    }
}
