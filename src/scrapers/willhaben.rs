use crate::config::ScraperConfig;
use crate::error::{Result, ScoutError};
use crate::models::Apartment;
use crate::scrapers::pagination::Paginator;
use crate::scrapers::query::QueryBuilder;
use crate::scrapers::traits::{PageFetcher, ScraperTrait};
use crate::scrapers::types::Query;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

const EMBEDDED_JSON_SELECTOR: &str = r#"script[type="application/json"]"#;

/// willhaben.at rental listings scraper
pub struct WillhabenScraper {
    client: Client,
    builder: QueryBuilder,
    query: Query,
}

impl WillhabenScraper {
    /// Create a scraper with the default configuration and an unconstrained query
    pub fn new() -> Result<Self> {
        Self::with_config(ScraperConfig::default(), Query::default())
    }

    /// Create a scraper with custom configuration and search query
    pub fn with_config(config: ScraperConfig, query: Query) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            builder: QueryBuilder::new(config.base_url),
            query,
        })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[async_trait]
impl PageFetcher for WillhabenScraper {
    async fn fetch_page(&self, url: &Url) -> Result<Value> {
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "willhaben returned an error status");
            return Err(ScoutError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        debug!(bytes = html.len(), "Downloaded result page");
        embedded_json(&html)
    }
}

#[async_trait]
impl ScraperTrait for WillhabenScraper {
    async fn scrape(&self) -> Result<Vec<Apartment>> {
        info!("Starting willhaben scrape");
        let apartments = Paginator::new(self, &self.builder)
            .fetch_apartments(&self.query)
            .await?;
        info!(apartments = apartments.len(), "Finished willhaben scrape");
        Ok(apartments)
    }

    fn source_name(&self) -> &'static str {
        "willhaben"
    }
}

/// Pull the embedded search-result JSON out of a result page
pub fn embedded_json(html: &str) -> Result<Value> {
    let selector = Selector::parse(EMBEDDED_JSON_SELECTOR)
        .map_err(|e| ScoutError::MalformedPage(format!("bad selector: {e:?}")))?;
    let document = Html::parse_document(html);
    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| ScoutError::MalformedPage("no embedded JSON script".to_string()))?;
    let text: String = script.text().collect();
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_embedded_json_script() {
        let html = r#"<html><head>
            <script>var x = 1;</script>
            <script id="__NEXT_DATA__" type="application/json">
                {"props":{"pageProps":{"searchResult":{"rowsFound":0}}}}
            </script>
            </head><body></body></html>"#;
        let value = embedded_json(html).unwrap();
        assert_eq!(
            value
                .pointer("/props/pageProps/searchResult/rowsFound")
                .and_then(Value::as_u64),
            Some(0)
        );
    }

    #[test]
    fn page_without_script_is_malformed() {
        let result = embedded_json("<html><body><p>Wartungsarbeiten</p></body></html>");
        assert!(matches!(result, Err(ScoutError::MalformedPage(_))));
    }

    #[test]
    fn invalid_json_is_reported() {
        let html = r#"<script type="application/json">{not json</script>"#;
        assert!(matches!(embedded_json(html), Err(ScoutError::Json(_))));
    }

    #[test]
    fn scraper_keeps_its_query() {
        let query = Query::new().with_price(Some(500), Some(1200));
        let scraper = WillhabenScraper::with_config(ScraperConfig::default(), query).unwrap();
        assert_eq!(scraper.query().max_price, Some(1200));
        assert_eq!(scraper.source_name(), "willhaben");
    }
}
