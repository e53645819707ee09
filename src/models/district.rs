use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// A Vienna district. The postcode is derived from the number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct District {
    pub name: String,
    /// Informal names
    pub aliases: Vec<String>,
    pub number: u32,
}

impl District {
    /// `1000 + number * 10`, or `None` when that does not fit a `u32`
    pub fn postcode(&self) -> Option<u32> {
        self.number.checked_mul(10)?.checked_add(1000)
    }
}

// (number, name, aliases); 0 is the whole city
const DISTRICTS: [(u32, &str, &[&str]); 24] = [
    (0, "Ganz Wien", &["Iwaroi", "Gåunze Stådt"]),
    (1, "Innere Stadt", &["I-Town", "Disneyland"]),
    (2, "Leopoldstadt", &["Leo"]),
    (3, "Landstraße", &[]),
    (4, "Wieden", &[]),
    (5, "Margareten", &["Little Berlin"]),
    (6, "Mariahilf", &["MaHüf"]),
    (7, "Neubau", &["Bobostan"]),
    (8, "Josefstadt", &["Moneytown", "Bürgistan"]),
    (9, "Alsergrund", &[]),
    (10, "Favoriten", &["Little Istanbul", "X"]),
    (11, "Simmering", &[]),
    (12, "Meidling", &["MeidLing", "Big L"]),
    (13, "Hietzing", &[]),
    (14, "Penzing", &[]),
    (15, "Rudolfsheim-Fünfhaus", &["Rudolfscrime", "RH5H"]),
    (16, "Ottakring", &["OTK"]),
    (17, "Hernals", &[]),
    (18, "Währing", &[]),
    (19, "Döbling", &[]),
    (20, "Brigittenau", &["Brighettonau"]),
    (21, "Floridsdorf", &["Flodorf", "Flowtown", "Flodo"]),
    (22, "Donaustadt", &["DC", "Donau City"]),
    (23, "Liesing", &["Mietkauf"]),
];

// willhaben area ids, indexed by district number
const AREA_IDS: [u64; 24] = [
    900, 117223, 117224, 117225, 117226, 117227, 117228, 117229, 117230, 117231, 117232, 117233,
    117234, 117235, 117236, 117237, 117238, 117239, 117240, 117241, 117242, 117243, 117244,
    117245,
];

/// Look up a district by number. Returns an owned copy.
pub fn district_by_number(number: u32) -> Result<District> {
    DISTRICTS
        .iter()
        .find(|(n, _, _)| *n == number)
        .map(|(number, name, aliases)| District {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            number: *number,
        })
        .ok_or(ScoutError::UnknownDistrictNumber(number))
}

/// Look up the district for a postcode
pub fn district_for(postcode: u32) -> Result<District> {
    if postcode < 1000 || postcode % 10 != 0 {
        return Err(ScoutError::UnknownDistrict(postcode));
    }
    district_by_number((postcode - 1000) / 10)
        .map_err(|_| ScoutError::UnknownDistrict(postcode))
}

pub fn all_districts() -> Vec<District> {
    DISTRICTS
        .iter()
        .filter_map(|(number, _, _)| district_by_number(*number).ok())
        .collect()
}

/// The source site's area id for a district
pub fn area_id_for(district: &District) -> Result<u64> {
    let known = district
        .postcode()
        .and_then(|postcode| district_for(postcode).ok())
        .is_some_and(|d| d.number == district.number);
    known
        .then(|| AREA_IDS.get(district.number as usize).copied())
        .flatten()
        .ok_or_else(|| ScoutError::DistrictNotMapped {
            district: district.name.clone(),
            number: district.number,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcode_round_trip_for_every_district() {
        for number in 0..=23 {
            let district = district_by_number(number).unwrap();
            let postcode = district.postcode().unwrap();
            assert_eq!(district_for(postcode).unwrap().number, number);
        }
    }

    #[test]
    fn postcode_is_derived_from_number() {
        assert_eq!(district_by_number(0).unwrap().postcode(), Some(1000));
        assert_eq!(district_by_number(7).unwrap().postcode(), Some(1070));
        assert_eq!(district_by_number(23).unwrap().postcode(), Some(1230));
    }

    #[test]
    fn unknown_postcodes_are_typed_errors() {
        assert!(matches!(district_for(1240), Err(ScoutError::UnknownDistrict(1240))));
        assert!(matches!(district_for(1015), Err(ScoutError::UnknownDistrict(1015))));
        assert!(matches!(district_for(999), Err(ScoutError::UnknownDistrict(999))));
        assert!(matches!(
            district_by_number(24),
            Err(ScoutError::UnknownDistrictNumber(24))
        ));
    }

    #[test]
    fn area_ids_follow_the_district_table() {
        assert_eq!(area_id_for(&district_by_number(0).unwrap()).unwrap(), 900);
        assert_eq!(area_id_for(&district_by_number(1).unwrap()).unwrap(), 117223);
        assert_eq!(area_id_for(&district_by_number(23).unwrap()).unwrap(), 117245);
    }

    #[test]
    fn unmapped_district_fails() {
        let bogus = District {
            name: "Klosterneuburg".to_string(),
            aliases: vec![],
            number: 40,
        };
        assert!(matches!(
            area_id_for(&bogus),
            Err(ScoutError::DistrictNotMapped { number: 40, .. })
        ));
    }

    #[test]
    fn huge_district_number_has_no_postcode_and_is_not_mapped() {
        let bogus = District {
            name: "Overflow".to_string(),
            aliases: vec![],
            number: u32::MAX,
        };
        assert_eq!(bogus.postcode(), None);
        // wraps to 1070 without checked arithmetic
        let wrapping = District {
            number: 2_147_483_655,
            ..bogus.clone()
        };
        assert_eq!(wrapping.postcode(), None);
        assert!(matches!(
            area_id_for(&bogus),
            Err(ScoutError::DistrictNotMapped { number: u32::MAX, .. })
        ));
        assert!(area_id_for(&wrapping).is_err());
    }

    #[test]
    fn all_districts_lists_the_whole_table() {
        let districts = all_districts();
        assert_eq!(districts.len(), 24);
        assert_eq!(districts[15].name, "Rudolfsheim-Fünfhaus");
        assert_eq!(districts[21].aliases, vec!["Flodorf", "Flowtown", "Flodo"]);
    }
}
