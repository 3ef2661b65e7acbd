//! Page and url cache
//!
//! Entries are never evicted; the cache lives as long as the scraper.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Key of a resolved link lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlKey {
    pub parent_url: String,
    pub anchor_text: String,
    pub table_id: Option<String>,
}

impl UrlKey {
    pub fn new(parent_url: &str, anchor_text: &str, table_id: Option<&str>) -> Self {
        Self {
            parent_url: parent_url.to_string(),
            anchor_text: anchor_text.to_string(),
            table_id: table_id.map(str::to_string),
        }
    }
}

/// Fetched page bodies keyed by url, plus resolved link lookups
#[derive(Debug, Default)]
pub struct PageCache {
    pages: Mutex<HashMap<String, Arc<str>>>,
    urls: Mutex<HashMap<UrlKey, String>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn page(&self, url: &str) -> Option<Arc<str>> {
        self.pages.lock().await.get(url).cloned()
    }

    /// Store `body` for `url` and return the shared copy
    pub async fn insert_page(&self, url: &str, body: String) -> Arc<str> {
        let body: Arc<str> = Arc::from(body);
        self.pages.lock().await.insert(url.to_string(), Arc::clone(&body));
        body
    }

    pub async fn url(&self, key: &UrlKey) -> Option<String> {
        self.urls.lock().await.get(key).cloned()
    }

    pub async fn insert_url(&self, key: UrlKey, url: String) {
        self.urls.lock().await.insert(key, url);
    }

    pub async fn page_count(&self) -> usize {
        self.pages.lock().await.len()
    }

    pub async fn url_count(&self) -> usize {
        self.urls.lock().await.len()
    }
}
