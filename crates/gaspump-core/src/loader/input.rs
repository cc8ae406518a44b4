//! Reading the scraper's output file.
//!
//! The whole file is validated before any database work starts, so a
//! malformed file never opens a transaction.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::models::ScrapedStation;

use super::LoaderError;

pub fn load_scraped_stations(path: &Path) -> Result<Vec<ScrapedStation>, LoaderError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stations = parse_scraped_stations(&contents)?;
    debug!(path = %path.display(), count = stations.len(), "Scraped stations read");
    Ok(stations)
}

/// Parse a JSON document that must be an array of station objects.
pub fn parse_scraped_stations(contents: &str) -> Result<Vec<ScrapedStation>, LoaderError> {
    let items = match serde_json::from_str(contents)? {
        Value::Array(items) => items,
        _ => return Err(LoaderError::NotAnArray),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(LoaderError::InvalidRecord {
                    index,
                    reason: "not an object".to_string(),
                });
            }
            serde_json::from_value(item).map_err(|e| LoaderError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
