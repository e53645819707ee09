//! Vienna rental listings from willhaben.at: paginated retrieval into
//! canonical [`Apartment`] records, and composable filters over them.

pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod scrapers;
pub mod store;

pub use config::ScraperConfig;
pub use error::{RecordError, Result, ScoutError};
pub use models::{Apartment, Coordinates, DistanceFormula, District, Stop};
pub use scrapers::{Query, RoomBucket, WillhabenScraper};
pub use store::ApartmentStore;
