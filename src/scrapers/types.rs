use crate::models::District;
use serde::{Deserialize, Serialize};

/// Room-count category understood by the search form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomBucket {
    One,
    Two,
    Three,
    Four,
    Five,
    SixToNine,
    TenPlus,
    Unknown,
}

impl RoomBucket {
    /// Value of the `NO_OF_ROOMS_BUCKET` parameter
    pub fn param_value(self) -> &'static str {
        match self {
            RoomBucket::One => "1X1",
            RoomBucket::Two => "2X2",
            RoomBucket::Three => "3X3",
            RoomBucket::Four => "4X4",
            RoomBucket::Five => "5X5",
            RoomBucket::SixToNine => "6X9",
            RoomBucket::TenPlus => "10X",
            RoomBucket::Unknown => "0X0",
        }
    }
}

/// Search parameters for one logical query.
///
/// Every constraint is optional; an unset constraint produces no URL
/// parameter. The page cursor is only advanced by the paginator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub districts: Vec<District>,
    /// Minimum monthly rent (EUR)
    pub min_price: Option<i64>,
    /// Maximum monthly rent (EUR)
    pub max_price: Option<i64>,
    /// Minimum living area (m²)
    pub min_area: Option<u32>,
    /// Maximum living area (m²)
    pub max_area: Option<u32>,
    pub rooms_1: bool,
    pub rooms_2: bool,
    pub rooms_3: bool,
    pub rooms_4: bool,
    pub rooms_5: bool,
    pub rooms_6_to_9: bool,
    pub rooms_10_plus: bool,
    pub rooms_unknown: bool,
    #[serde(skip)]
    pub(crate) page: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_area(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_area = min;
        self.max_area = max;
        self
    }

    pub fn with_districts(mut self, districts: Vec<District>) -> Self {
        self.districts = districts;
        self
    }

    /// Enable one room bucket flag
    pub fn with_rooms(mut self, bucket: RoomBucket) -> Self {
        match bucket {
            RoomBucket::One => self.rooms_1 = true,
            RoomBucket::Two => self.rooms_2 = true,
            RoomBucket::Three => self.rooms_3 = true,
            RoomBucket::Four => self.rooms_4 = true,
            RoomBucket::Five => self.rooms_5 = true,
            RoomBucket::SixToNine => self.rooms_6_to_9 = true,
            RoomBucket::TenPlus => self.rooms_10_plus = true,
            RoomBucket::Unknown => self.rooms_unknown = true,
        }
        self
    }

    /// Current page cursor; `None` means the first page
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Move the cursor to the next page: 2 after the first page, then +1
    pub(crate) fn advance_page(&mut self) -> u32 {
        let next = self.page.map_or(2, |p| p + 1);
        self.page = Some(next);
        next
    }
}
