use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Debug, Error)]
pub enum ScoutError {
    /// Transport failure, including timed out or aborted requests.
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("HTTP error (status {status}) for {url}")]
    Http { status: u16, url: String },

    #[error("Malformed result page: {0}")]
    MalformedPage(String),

    #[error("District not mapped: {district} (number {number})")]
    DistrictNotMapped { district: String, number: u32 },

    #[error("Unknown district for postcode {0}")]
    UnknownDistrict(u32),

    #[error("Unknown district number {0}")]
    UnknownDistrictNumber(u32),

    #[error("Advert {id} is missing {field}")]
    MissingField { id: u64, field: &'static str },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ScoutError {
    fn from(err: reqwest::Error) -> Self {
        ScoutError::Fetch(err.to_string())
    }
}

/// Problems with a single advert. These are logged and the advert is skipped;
/// they never abort a page.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("advert has no id")]
    MissingId,

    #[error("advert id {0:?} is not a number")]
    InvalidId(String),

    #[error("advert {0} has no title")]
    MissingTitle(u64),

    #[error("advert is not an object")]
    NotAnObject,
}
