use serde::{Deserialize, Serialize};

/// A gas station as served by the station API.
///
/// Field names on the wire are the capitalised column names the map and
/// table pages read verbatim. Every column is optional: the API does not
/// guarantee any of them, and a missing value must not fail the whole fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(rename = "Station", default)]
    pub station: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "Municipality", default)]
    pub municipality: Option<String>,
    #[serde(rename = "Operator", default)]
    pub operator: Option<String>,
    #[serde(rename = "Province", default)]
    pub province: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
}

impl StationRecord {
    /// Both coordinates, if the record has them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn has_address(&self, address: &str) -> bool {
        self.address.as_deref() == Some(address)
    }
}
