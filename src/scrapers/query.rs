use crate::error::Result;
use crate::models::area_id_for;
use crate::scrapers::types::{Query, RoomBucket};
use url::Url;

pub const MIN_PRICE_FIELD: &str = "PRICE_FROM";
pub const MAX_PRICE_FIELD: &str = "PRICE_TO";
pub const MIN_AREA_FIELD: &str = "ESTATE_SIZE/LIVING_AREA_FROM";
pub const MAX_AREA_FIELD: &str = "ESTATE_SIZE/LIVING_AREA_TO";
pub const ROOMS_FIELD: &str = "NO_OF_ROOMS_BUCKET";
pub const AREA_ID_FIELD: &str = "areaId";
pub const PAGE_FIELD: &str = "page";

/// Renders a [`Query`] into a search URL
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_url: Url,
}

impl QueryBuilder {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Build the request URL. Fails without producing a URL if any district
    /// has no area id.
    pub fn build(&self, query: &Query) -> Result<Url> {
        let area_ids = query
            .districts
            .iter()
            .map(area_id_for)
            .collect::<Result<Vec<_>>>()?;

        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(min) = query.min_price {
                pairs.append_pair(MIN_PRICE_FIELD, &min.to_string());
            }
            if let Some(max) = query.max_price {
                pairs.append_pair(MAX_PRICE_FIELD, &max.to_string());
            }
            if let Some(min) = query.min_area {
                pairs.append_pair(MIN_AREA_FIELD, &min.to_string());
            }
            if let Some(max) = query.max_area {
                pairs.append_pair(MAX_AREA_FIELD, &max.to_string());
            }
            if let Some(bucket) = room_bucket(query) {
                pairs.append_pair(ROOMS_FIELD, bucket.param_value());
            }
            for id in &area_ids {
                pairs.append_pair(AREA_ID_FIELD, &id.to_string());
            }
            if let Some(page) = query.page {
                pairs.append_pair(PAGE_FIELD, &page.to_string());
            }
        }
        // no constraints at all: drop the dangling '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

/// The single room bucket sent to the site. The form accepts only one value,
/// so when several flags are set the last one in this order wins.
pub fn room_bucket(query: &Query) -> Option<RoomBucket> {
    [
        (query.rooms_1, RoomBucket::One),
        (query.rooms_2, RoomBucket::Two),
        (query.rooms_3, RoomBucket::Three),
        (query.rooms_4, RoomBucket::Four),
        (query.rooms_5, RoomBucket::Five),
        (query.rooms_6_to_9, RoomBucket::SixToNine),
        (query.rooms_10_plus, RoomBucket::TenPlus),
        (query.rooms_unknown, RoomBucket::Unknown),
    ]
    .into_iter()
    .filter_map(|(enabled, bucket)| enabled.then_some(bucket))
    .last()
}
