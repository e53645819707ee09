//! Composable predicates over [`Apartment`] records.
//!
//! A filter is a value implementing [`Filter`]. Filters are combined with
//! [`Invert`] and [`Merge`], and run over a collection with [`apply`].

use crate::models::{Apartment, DistanceFormula, District, Stop};
use std::fmt;

/// A pure predicate over an apartment
pub trait Filter: fmt::Debug + Send + Sync {
    fn matches(&self, apartment: &Apartment) -> bool;
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn matches(&self, apartment: &Apartment) -> bool {
        (**self).matches(apartment)
    }
}

impl<F: Filter + ?Sized> Filter for &F {
    fn matches(&self, apartment: &Apartment) -> bool {
        (**self).matches(apartment)
    }
}

/// Records matching `filter`, in input order. The input is not modified.
pub fn apply<F: Filter + ?Sized>(apartments: &[Apartment], filter: &F) -> Vec<Apartment> {
    apartments
        .iter()
        .filter(|apartment| filter.matches(apartment))
        .cloned()
        .collect()
}

/// Logical negation of the wrapped filter
#[derive(Debug, Clone, PartialEq)]
pub struct Invert<F>(pub F);

impl<F: Filter> Filter for Invert<F> {
    fn matches(&self, apartment: &Apartment) -> bool {
        !self.0.matches(apartment)
    }
}

pub fn invert<F: Filter>(filter: F) -> Invert<F> {
    Invert(filter)
}

/// Conjunction. An empty merge accepts everything.
#[derive(Debug, Default)]
pub struct Merge {
    filters: Vec<Box<dyn Filter>>,
}

impl Merge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for Merge {
    fn matches(&self, apartment: &Apartment) -> bool {
        self.filters.iter().all(|f| f.matches(apartment))
    }
}

pub fn merge(filters: Vec<Box<dyn Filter>>) -> Merge {
    Merge { filters }
}

/// Matches apartments located in one of the given districts. Districts
/// without a valid postcode are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictFilter {
    postcodes: Vec<u32>,
}

impl DistrictFilter {
    pub fn new(districts: &[District]) -> Self {
        Self {
            postcodes: districts.iter().filter_map(District::postcode).collect(),
        }
    }
}

impl Filter for DistrictFilter {
    fn matches(&self, apartment: &Apartment) -> bool {
        apartment
            .district
            .as_ref()
            .and_then(District::postcode)
            .is_some_and(|postcode| self.postcodes.contains(&postcode))
    }
}

/// Which numeric field a [`RangeFilter`] looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Rooms,
    Price,
    Area,
}

impl RangeField {
    fn value(self, apartment: &Apartment) -> f32 {
        match self {
            RangeField::Rooms => apartment.rooms,
            RangeField::Price => apartment.price,
            RangeField::Area => apartment.area,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bounds {
    Any,
    AtLeast(f32),
    AtMost(f32),
    Between(f32, f32),
}

/// Inclusive range over rooms, price or area.
///
/// A bound of zero means "no bound on that side", so a genuine minimum of
/// zero cannot be expressed and behaves as unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    field: RangeField,
    bounds: Bounds,
}

impl RangeFilter {
    pub fn new(field: RangeField, min: f32, max: f32) -> Self {
        let bounds = match (min == 0.0, max == 0.0) {
            (true, true) => Bounds::Any,
            (true, false) => Bounds::AtMost(max),
            (false, true) => Bounds::AtLeast(min),
            (false, false) => Bounds::Between(min, max),
        };
        Self { field, bounds }
    }

    pub fn rooms(min: u32, max: u32) -> Self {
        Self::new(RangeField::Rooms, min as f32, max as f32)
    }

    pub fn price(min: f32, max: f32) -> Self {
        Self::new(RangeField::Price, min, max)
    }

    pub fn area(min: f32, max: f32) -> Self {
        Self::new(RangeField::Area, min, max)
    }
}

impl Filter for RangeFilter {
    fn matches(&self, apartment: &Apartment) -> bool {
        let value = self.field.value(apartment);
        match self.bounds {
            Bounds::Any => true,
            Bounds::AtLeast(min) => value >= min,
            Bounds::AtMost(max) => value <= max,
            Bounds::Between(min, max) => value >= min && value <= max,
        }
    }
}

/// Matches apartments whose description contains any keyword, ignoring case.
/// No keywords matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Filter for KeywordFilter {
    fn matches(&self, apartment: &Apartment) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let description = apartment.description.to_lowercase();
        self.keywords.iter().any(|k| description.contains(k.as_str()))
    }
}

/// Matches apartments within `max_distance` meters of at least one stop.
/// Apartments without a location never match.
#[derive(Debug, Clone, PartialEq)]
pub struct StopProximityFilter {
    stops: Vec<Stop>,
    max_distance: f64,
    formula: DistanceFormula,
}

impl StopProximityFilter {
    pub fn new(stops: Vec<Stop>, max_distance: f64) -> Self {
        Self {
            stops,
            max_distance,
            formula: DistanceFormula::default(),
        }
    }

    pub fn with_formula(mut self, formula: DistanceFormula) -> Self {
        self.formula = formula;
        self
    }
}

impl Filter for StopProximityFilter {
    fn matches(&self, apartment: &Apartment) -> bool {
        let Some(location) = apartment.location.as_ref() else {
            return false;
        };
        self.stops
            .iter()
            .any(|stop| stop.location.distance(location, self.formula) <= self.max_distance)
    }
}
