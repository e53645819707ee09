pub mod extract;
pub mod pagination;
pub mod query;
pub mod traits;
pub mod types;
pub mod willhaben;

pub use extract::{extract_page, Advert, AdvertMap, PageResult};
pub use pagination::Paginator;
pub use query::QueryBuilder;
pub use traits::{PageFetcher, ScraperTrait};
pub use types::{Query, RoomBucket};
pub use willhaben::WillhabenScraper;
