use crate::error::Result;
use crate::models::Apartment;
use crate::scrapers::extract::{extract_page, AdvertMap, PageResult};
use crate::scrapers::query::QueryBuilder;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::Query;
use crate::store::ApartmentStore;
use tracing::{debug, info, warn};

/// Walks the result pages of one query until a short page is seen.
///
/// The source offers no "next page" link, so a page that returned exactly as
/// many rows as requested is taken to mean more rows may follow. The walk
/// also ends once the rows returned so far reach the reported total. Pages
/// are fetched strictly one after another.
pub struct Paginator<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    builder: &'a QueryBuilder,
}

impl<'a, F: PageFetcher + ?Sized> Paginator<'a, F> {
    pub fn new(fetcher: &'a F, builder: &'a QueryBuilder) -> Self {
        Self { fetcher, builder }
    }

    /// Fetch and decode the page the query's cursor points at
    pub async fn fetch(&self, query: &Query) -> Result<PageResult> {
        let url = self.builder.build(query)?;
        debug!(page = query.page().unwrap_or(1), %url, "Fetching result page");
        let document = self.fetcher.fetch_page(&url).await?;
        extract_page(&document)
    }

    /// Fetch every page of `query` and merge the adverts by id.
    ///
    /// Any failure aborts the whole walk; adverts from earlier pages are
    /// dropped with it.
    pub async fn fetch_all(&self, query: &Query) -> Result<AdvertMap> {
        let mut query = query.clone();
        query.page = None;

        let mut page = self.fetch(&query).await?;
        let mut adverts = AdvertMap::new();
        let mut pages = 1;
        let mut fetched = 0;
        loop {
            let full = page.is_full();
            let total = page.rows_total;
            fetched += page.rows_returned;
            info!(
                page = query.page().unwrap_or(1),
                returned = page.rows_returned,
                requested = page.rows_requested,
                total,
                "Fetched result page"
            );
            adverts.merge(page.adverts);
            if !full {
                break;
            }
            if fetched >= total {
                warn!(pages, fetched, total, "Full page but total reached, stopping");
                break;
            }
            query.advance_page();
            page = self.fetch(&query).await?;
            pages += 1;
        }

        info!(pages, adverts = adverts.len(), "Retrieved all result pages");
        Ok(adverts)
    }

    /// Fetch every page of `query` and convert the adverts into apartments,
    /// ordered by id. Adverts that cannot be converted are logged and left
    /// out.
    pub async fn fetch_apartments(&self, query: &Query) -> Result<Vec<Apartment>> {
        let adverts = self.fetch_all(query).await?;

        let mut store = ApartmentStore::new();
        let rejected = store.ingest(adverts.into_values());
        if !rejected.is_empty() {
            warn!(rejected = rejected.len(), "Some adverts could not be converted");
        }
        Ok(store.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use url::Url;

    /// Replays canned pages in order and records the requested URLs
    struct FakeFetcher {
        pages: Mutex<VecDeque<Result<Value>>>,
        requested: Mutex<Vec<Url>>,
    }

    impl FakeFetcher {
        fn new(pages: Vec<Result<Value>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested_pages(&self) -> Vec<Option<String>> {
            self.requested
                .lock()
                .unwrap()
                .iter()
                .map(|url| {
                    url.query_pairs()
                        .find(|(k, _)| k == "page")
                        .map(|(_, v)| v.into_owned())
                })
                .collect()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch_page(&self, url: &Url) -> Result<Value> {
            self.requested.lock().unwrap().push(url.clone());
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ScoutError::Fetch("no more pages".to_string())))
        }
    }

    fn page(ids: &[u64], requested: u64) -> Result<Value> {
        page_of(ids, requested, 7)
    }

    fn page_of(ids: &[u64], requested: u64, total: u64) -> Result<Value> {
        let adverts: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id.to_string(), "description": format!("Wohnung {id}") }))
            .collect();
        Ok(search_result(total, requested, adverts))
    }

    fn search_result(total: u64, requested: u64, adverts: Vec<Value>) -> Value {
        json!({
            "props": { "pageProps": { "searchResult": {
                "rowsFound": total,
                "rowsReturned": adverts.len(),
                "rowsRequested": requested,
                "advertSummaryList": { "advertSummary": adverts }
            }}}
        })
    }

    fn listed(id: u64, postcode: &str) -> Value {
        let attribute = |name: &str, value: &str| json!({ "name": name, "values": [value] });
        json!({
            "id": id.to_string(),
            "description": format!("Wohnung {id}"),
            "attributes": { "attribute": [
                attribute("RENT/PER_MONTH_LETTINGS", "950.5"),
                attribute("ESTATE_SIZE", "55"),
                attribute("NUMBER_OF_ROOMS", "2"),
                attribute("POSTCODE", postcode),
                attribute("SEO_URL", format!("immobilien/d/wohnung-{id}").as_str()),
            ]}
        })
    }

    fn builder() -> QueryBuilder {
        QueryBuilder::new(Url::parse("https://example.at/search").unwrap())
    }

    #[tokio::test]
    async fn stops_after_the_first_short_page() {
        let fetcher = FakeFetcher::new(vec![
            page(&[1, 2, 3], 3),
            page(&[4, 5, 6], 3),
            page(&[7], 3),
            page(&[8], 3),
        ]);
        let builder = builder();
        let adverts = Paginator::new(&fetcher, &builder)
            .fetch_all(&Query::new())
            .await
            .unwrap();

        assert_eq!(adverts.ids().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            fetcher.requested_pages(),
            vec![None, Some("2".to_string()), Some("3".to_string())]
        );
    }

    #[tokio::test]
    async fn single_short_page_is_fetched_once() {
        let fetcher = FakeFetcher::new(vec![page(&[10, 11], 30)]);
        let builder = builder();
        let adverts = Paginator::new(&fetcher, &builder)
            .fetch_all(&Query::new())
            .await
            .unwrap();
        assert_eq!(adverts.len(), 2);
        assert_eq!(fetcher.requested_pages(), vec![None]);
    }

    #[tokio::test]
    async fn repeated_ids_across_pages_are_deduplicated() {
        let fetcher = FakeFetcher::new(vec![page(&[1, 2], 2), page(&[2], 2)]);
        let builder = builder();
        let adverts = Paginator::new(&fetcher, &builder)
            .fetch_all(&Query::new())
            .await
            .unwrap();
        assert_eq!(adverts.ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn empty_page_ends_the_walk() {
        let fetcher = FakeFetcher::new(vec![page(&[1], 1), page(&[], 0)]);
        let builder = builder();
        let adverts = Paginator::new(&fetcher, &builder)
            .fetch_all(&Query::new())
            .await
            .unwrap();
        assert_eq!(adverts.len(), 1);
        assert_eq!(fetcher.requested_pages().len(), 2);
    }

    #[tokio::test]
    async fn failure_on_a_later_page_discards_everything() {
        let fetcher = FakeFetcher::new(vec![
            page(&[1, 2], 2),
            Err(ScoutError::Fetch("request timed out".to_string())),
        ]);
        let builder = builder();
        let result = Paginator::new(&fetcher, &builder)
            .fetch_all(&Query::new())
            .await;
        assert!(matches!(result, Err(ScoutError::Fetch(_))));
    }

    #[tokio::test]
    async fn malformed_page_fails_the_walk() {
        let fetcher = FakeFetcher::new(vec![page(&[1], 1), Ok(json!({ "props": null }))]);
        let builder = builder();
        let result = Paginator::new(&fetcher, &builder)
            .fetch_all(&Query::new())
            .await;
        assert!(matches!(result, Err(ScoutError::MalformedPage(_))));
    }

    #[tokio::test]
    async fn caller_query_cursor_is_left_untouched() {
        let fetcher = FakeFetcher::new(vec![page(&[1], 1), page(&[], 1)]);
        let builder = builder();
        let query = Query::new();
        Paginator::new(&fetcher, &builder)
            .fetch_all(&query)
            .await
            .unwrap();
        assert_eq!(query.page(), None);
    }

    #[tokio::test]
    async fn stops_once_the_reported_total_is_reached() {
        let fetcher = FakeFetcher::new(vec![
            page_of(&[1, 2, 3], 3, 6),
            page_of(&[4, 5, 6], 3, 6),
            page_of(&[7, 8, 9], 3, 6),
            page_of(&[10, 11, 12], 3, 6),
        ]);
        let builder = builder();
        let adverts = Paginator::new(&fetcher, &builder)
            .fetch_all(&Query::new())
            .await
            .unwrap();

        assert_eq!(adverts.ids().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(fetcher.requested_pages(), vec![None, Some("2".to_string())]);
    }

    #[tokio::test]
    async fn fetch_apartments_converts_and_drops_unusable_adverts() {
        let fetcher = FakeFetcher::new(vec![Ok(search_result(
            3,
            30,
            vec![
                listed(2, "1070"),
                listed(1, "1150"),
                // Klosterneuburg is not a Vienna district
                listed(3, "3400"),
            ],
        ))]);
        let builder = builder();
        let apartments = Paginator::new(&fetcher, &builder)
            .fetch_apartments(&Query::new())
            .await
            .unwrap();

        let ids: Vec<u64> = apartments.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(apartments[1].district.as_ref().map(|d| d.number), Some(7));
        assert_eq!(apartments[1].price, 950.5);
        assert_eq!(apartments[1].rooms, 2.0);
        assert_eq!(
            apartments[1].url.as_str(),
            "https://www.willhaben.at/iad/immobilien/d/wohnung-2"
        );
    }

    #[tokio::test]
    async fn fetch_apartments_propagates_fetch_errors() {
        let fetcher = FakeFetcher::new(vec![]);
        let builder = builder();
        let result = Paginator::new(&fetcher, &builder)
            .fetch_apartments(&Query::new())
            .await;
        assert!(matches!(result, Err(ScoutError::Fetch(_))));
    }
}
