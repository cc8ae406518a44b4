//! Data models for station data.
//!
//! - `StationRecord`: a station as served by the remote API, with the column
//!   names the map and table pages expect.
//! - `ScrapedStation`: a station as written by the scraper, the loader's input.

pub mod scraped;
pub mod station;

pub use scraped::ScrapedStation;
pub use station::StationRecord;
