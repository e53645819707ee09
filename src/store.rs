use crate::error::{Result, ScoutError};
use crate::models::{district_for, Apartment};
use crate::scrapers::Advert;
use std::collections::BTreeMap;
use tracing::{debug, warn};

impl TryFrom<Advert> for Apartment {
    type Error = ScoutError;

    /// Fails with [`ScoutError::UnknownDistrict`] when the postcode is not a
    /// Vienna district, and with [`ScoutError::MissingField`] when rent, area
    /// or URL were not decoded.
    fn try_from(advert: Advert) -> Result<Self> {
        let id = advert.id;
        let district = advert.postcode.map(district_for).transpose()?;
        let price = advert
            .rent
            .ok_or(ScoutError::MissingField { id, field: "rent" })?;
        let area = advert
            .area
            .ok_or(ScoutError::MissingField { id, field: "area" })?;
        let url = advert
            .url
            .ok_or(ScoutError::MissingField { id, field: "url" })?;

        Ok(Apartment {
            id,
            title: advert.title,
            description: advert.description.unwrap_or_default(),
            area: area as f32,
            rooms: advert.rooms.unwrap_or(0.0),
            price: price as f32,
            district,
            location: advert.coordinates,
            url,
        })
    }
}

/// Apartments keyed by id. Ingesting an id that is already stored replaces
/// the stored record.
#[derive(Debug, Default, Clone)]
pub struct ApartmentStore {
    apartments: BTreeMap<u64, Apartment>,
}

impl ApartmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert and store adverts. Adverts that cannot be converted are
    /// returned with their error; the rest are still stored.
    pub fn ingest<I>(&mut self, adverts: I) -> Vec<(u64, ScoutError)>
    where
        I: IntoIterator<Item = Advert>,
    {
        let mut rejected = Vec::new();
        for advert in adverts {
            let id = advert.id;
            match Apartment::try_from(advert) {
                Ok(apartment) => {
                    self.apartments.insert(id, apartment);
                }
                Err(err) => {
                    warn!(id, error = %err, "Rejected advert");
                    rejected.push((id, err));
                }
            }
        }
        debug!(stored = self.apartments.len(), rejected = rejected.len(), "Ingested adverts");
        rejected
    }

    pub fn insert(&mut self, apartment: Apartment) -> Option<Apartment> {
        self.apartments.insert(apartment.id, apartment)
    }

    pub fn get(&self, id: u64) -> Option<&Apartment> {
        self.apartments.get(&id)
    }

    /// Copy of every stored apartment, ordered by id
    pub fn snapshot(&self) -> Vec<Apartment> {
        self.apartments.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.apartments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apartments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use url::Url;

    fn advert(id: u64, postcode: Option<u32>) -> Advert {
        Advert {
            id,
            title: format!("Wohnung {id}"),
            description: Some("Altbau mit Balkon".to_string()),
            url: Some(Url::parse(&format!("https://www.willhaben.at/iad/{id}")).unwrap()),
            rent: Some(950.0),
            area: Some(55),
            rooms: Some(2.0),
            postcode,
            coordinates: Some(Coordinates::new(16.35, 48.2)),
            ..Advert::default()
        }
    }

    #[test]
    fn converts_advert_with_district() {
        let apartment = Apartment::try_from(advert(1, Some(1070))).unwrap();
        assert_eq!(apartment.district.as_ref().map(|d| d.number), Some(7));
        assert_eq!(apartment.price, 950.0);
        assert_eq!(apartment.area, 55.0);
        assert_eq!(apartment.rooms, 2.0);
    }

    #[test]
    fn unknown_postcode_is_a_typed_error() {
        let result = Apartment::try_from(advert(1, Some(4020)));
        assert!(matches!(result, Err(ScoutError::UnknownDistrict(4020))));
    }

    #[test]
    fn missing_postcode_means_no_district() {
        let apartment = Apartment::try_from(advert(1, None)).unwrap();
        assert!(apartment.district.is_none());
    }

    #[test]
    fn missing_rent_is_reported() {
        let mut raw = advert(3, Some(1010));
        raw.rent = None;
        assert!(matches!(
            Apartment::try_from(raw),
            Err(ScoutError::MissingField { id: 3, field: "rent" })
        ));
    }

    #[test]
    fn ingest_keeps_going_past_bad_adverts_and_overwrites_ids() {
        let mut store = ApartmentStore::new();
        let rejected = store.ingest(vec![advert(2, Some(1020)), advert(1, Some(9999))]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, 1);
        assert_eq!(store.len(), 1);

        let mut updated = advert(2, Some(1020));
        updated.title = "Neu".to_string();
        store.ingest(vec![updated, advert(5, None)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).unwrap().title, "Neu");
        let ids: Vec<_> = store.snapshot().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }
}
