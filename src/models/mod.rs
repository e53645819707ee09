mod coordinates;
mod district;

pub use coordinates::{Coordinates, DistanceFormula, VincentyError, EARTH_METERS_PER_DEGREE};
pub use district::{all_districts, area_id_for, district_by_number, district_for, District};

use serde::{Deserialize, Serialize};
use url::Url;

/// Canonical apartment record, keyed by the site-assigned id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Apartment {
    pub id: u64,
    pub title: String,
    pub description: String,
    /// Living area in square meters
    pub area: f32,
    pub rooms: f32,
    /// Monthly rent (EUR)
    pub price: f32,
    pub district: Option<District>,
    /// Absent when the listing carried no coordinates
    pub location: Option<Coordinates>,
    pub url: Url,
}

/// Public transit stop, supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stop {
    pub name: String,
    pub location: Coordinates,
}

impl Stop {
    pub fn new(name: impl Into<String>, location: Coordinates) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}
