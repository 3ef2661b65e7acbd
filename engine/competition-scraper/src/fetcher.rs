//! Page fetchers

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Source of raw HTML pages
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of `url`
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetcher issuing plain GET requests
pub struct HttpFetcher {
    client: Client,
    request_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client =
            Client::builder().timeout(config.timeout()).user_agent(&config.user_agent).build()?;

        Ok(Self { client, request_delay: config.request_delay() })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        info!("Fetching data from: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }

        let body = response.text().await?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

/// Fetcher serving fixed pages (for testing)
///
/// Unknown urls answer with a 404 status error.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Number of fetches served so far, misses included
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::HttpStatus { url: url.to_string(), status: 404 })
    }
}
