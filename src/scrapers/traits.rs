use crate::error::Result;
use crate::models::Apartment;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

/// Fetches a result page and returns its embedded JSON document.
/// Timeouts and cancellation surface as [`crate::ScoutError::Fetch`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<Value>;
}

/// Common trait for all apartment scrapers
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Scrape apartments from the source
    async fn scrape(&self) -> Result<Vec<Apartment>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
