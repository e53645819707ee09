use crate::error::{RecordError, Result, ScoutError};
use crate::models::Coordinates;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};
use url::Url;

/// Listing URLs are the SEO path appended to this base
pub const SEO_BASE_URL: &str = "https://www.willhaben.at/iad";

const SEARCH_RESULT_PATH: &str = "/props/pageProps/searchResult";

/// One listing as decoded from a result page. Only `id` and `title` are
/// guaranteed; every other field is absent when the page did not carry a
/// usable value for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Advert {
    pub id: u64,
    pub title: String,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub seller_name: Option<String>,
    pub url: Option<Url>,
    /// Monthly rent (EUR)
    pub rent: Option<f64>,
    pub private_offer: bool,
    pub location_id: Option<u64>,
    pub postcode: Option<u32>,
    /// Living area (m²)
    pub area: Option<u32>,
    pub rooms: Option<f32>,
    pub coordinates: Option<Coordinates>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Adverts keyed by id. Inserting an existing id overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvertMap(BTreeMap<u64, Advert>);

impl AdvertMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, advert: Advert) -> Option<Advert> {
        self.0.insert(advert.id, advert)
    }

    /// Merge `other` into this map; `other` wins on id collisions
    pub fn merge(&mut self, other: AdvertMap) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, id: u64) -> Option<&Advert> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.keys().copied()
    }

    pub fn into_values(self) -> impl Iterator<Item = Advert> {
        self.0.into_values()
    }
}

impl FromIterator<Advert> for AdvertMap {
    fn from_iter<I: IntoIterator<Item = Advert>>(iter: I) -> Self {
        let mut map = AdvertMap::new();
        for advert in iter {
            map.insert(advert);
        }
        map
    }
}

/// Everything decoded from a single result page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Rows matching the query across all pages
    pub rows_total: u64,
    pub rows_returned: u64,
    pub rows_requested: u64,
    pub adverts: AdvertMap,
    /// Adverts dropped because their id or title was unusable
    pub skipped: usize,
}

impl PageResult {
    /// A page as large as requested may be followed by more rows
    pub fn is_full(&self) -> bool {
        self.rows_returned > 0 && self.rows_returned == self.rows_requested
    }
}

/// Decode the embedded search-result document of one page.
///
/// A missing or mistyped count fails the page. Broken adverts are skipped and
/// broken attributes are left empty; neither affects the rest of the page.
pub fn extract_page(document: &Value) -> Result<PageResult> {
    let search_result = document
        .pointer(SEARCH_RESULT_PATH)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ScoutError::MalformedPage(format!("{SEARCH_RESULT_PATH} missing or not an object"))
        })?;

    let count = |field: &str| -> Result<u64> {
        search_result
            .get(field)
            .and_then(Value::as_u64)
            .ok_or_else(|| ScoutError::MalformedPage(format!("{field} missing or not a count")))
    };
    let rows_total = count("rowsFound")?;
    let rows_returned = count("rowsReturned")?;
    let rows_requested = count("rowsRequested")?;

    let raw_adverts: &[Value] = match search_result
        .get("advertSummaryList")
        .and_then(|list| list.get("advertSummary"))
    {
        Some(Value::Array(items)) => items.as_slice(),
        None if rows_returned == 0 => &[],
        _ => {
            return Err(ScoutError::MalformedPage(
                "advertSummaryList.advertSummary missing or not an array".to_string(),
            ))
        }
    };

    let mut adverts = AdvertMap::new();
    let mut skipped = 0;
    for raw in raw_adverts {
        match decode_advert(raw) {
            Ok(advert) => {
                adverts.insert(advert);
            }
            Err(err) => {
                warn!(error = %err, "Skipping advert");
                skipped += 1;
            }
        }
    }

    debug!(
        rows_total,
        rows_returned,
        rows_requested,
        decoded = adverts.len(),
        skipped,
        "Extracted result page"
    );

    Ok(PageResult {
        rows_total,
        rows_returned,
        rows_requested,
        adverts,
        skipped,
    })
}

/// Decode one advert summary. Fails only when the id or title is unusable.
pub fn decode_advert(raw: &Value) -> std::result::Result<Advert, RecordError> {
    let object = raw.as_object().ok_or(RecordError::NotAnObject)?;

    let id = match object.get("id") {
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| RecordError::InvalidId(s.clone()))?,
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| RecordError::InvalidId(n.to_string()))?,
        Some(other) => return Err(RecordError::InvalidId(other.to_string())),
        None => return Err(RecordError::MissingId),
    };

    let title = object
        .get("description")
        .and_then(Value::as_str)
        .ok_or(RecordError::MissingTitle(id))?
        .to_string();

    let mut advert = Advert {
        id,
        title,
        ..Advert::default()
    };

    let attributes = object
        .get("attributes")
        .and_then(|a| a.get("attribute"))
        .and_then(Value::as_array);
    let Some(attributes) = attributes else {
        debug!(id, "Advert has no attribute list");
        return Ok(advert);
    };

    for attribute in attributes {
        let Some(name) = attribute.get("name").and_then(Value::as_str) else {
            warn!(id, "Attribute without a name");
            continue;
        };
        if let Err(reason) = apply_attribute(&mut advert, name, attribute) {
            warn!(id, attribute = name, %reason, "Ignoring malformed attribute");
        }
    }

    Ok(advert)
}

/// Decode a single named attribute into `advert`. On error the field is left
/// untouched.
fn apply_attribute(
    advert: &mut Advert,
    name: &str,
    attribute: &Value,
) -> std::result::Result<(), String> {
    match name {
        "BODY_DYN" => advert.description = Some(first_value(attribute)?.to_string()),
        "ORGNAME" => advert.seller_name = Some(first_value(attribute)?.to_string()),
        "HEADING" => advert.heading = Some(first_value(attribute)?.to_string()),
        "SEO_URL" => advert.url = Some(seo_url(first_value(attribute)?)?),
        "RENT/PER_MONTH_LETTINGS" => advert.rent = Some(parse(first_value(attribute)?)?),
        "ISPRIVATE" => advert.private_offer = first_value(attribute)? == "1",
        "LOCATION_ID" => advert.location_id = Some(parse(first_value(attribute)?)?),
        "POSTCODE" => advert.postcode = Some(parse(first_value(attribute)?)?),
        "ESTATE_SIZE" => advert.area = Some(parse(first_value(attribute)?)?),
        "NUMBER_OF_ROOMS" => advert.rooms = Some(parse(first_value(attribute)?)?),
        "PUBLISHED" => {
            let millis: i64 = parse(first_value(attribute)?)?;
            let published = Utc
                .timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| format!("timestamp {millis} out of range"))?;
            advert.published_at = Some(published);
        }
        "COORDINATES" => advert.coordinates = Some(parse_coordinates(first_value(attribute)?)?),
        _ => trace!(attribute = name, "Unhandled attribute"),
    }
    Ok(())
}

fn first_value(attribute: &Value) -> std::result::Result<&str, String> {
    attribute
        .get("values")
        .and_then(Value::as_array)
        .and_then(|values| values.first())
        .and_then(Value::as_str)
        .ok_or_else(|| "first value missing or not a string".to_string())
}

fn parse<T>(raw: &str) -> std::result::Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| format!("cannot parse {raw:?}: {e}"))
}

fn seo_url(path: &str) -> std::result::Result<Url, String> {
    let joined = format!("{}/{}", SEO_BASE_URL, path.trim_start_matches('/'));
    Url::parse(&joined).map_err(|e| format!("invalid SEO path {path:?}: {e}"))
}

/// `"lon,lat"`
fn parse_coordinates(raw: &str) -> std::result::Result<Coordinates, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("coordinates {raw:?} are not a pair"))?;
    Ok(Coordinates::new(parse(x)?, parse(y)?))
}
