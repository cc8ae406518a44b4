use serde::{Deserialize, Deserializer, Serialize};

/// A station record as written by the scraper.
///
/// Only the fields the loader persists are modelled; anything else the
/// scraper emits is ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrapedStation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    /// Composite "Region - Locality" label.
    #[serde(default)]
    pub city: Option<String>,
}

impl ScrapedStation {
    /// Name and address, when both are present and non-empty.
    ///
    /// Together with the operator id these form the station's natural key;
    /// a record without them cannot be persisted.
    pub fn natural_key(&self) -> Option<(&str, &str)> {
        let name = self.name.as_deref().filter(|s| !s.is_empty())?;
        let address = self.address.as_deref().filter(|s| !s.is_empty())?;
        Some((name, address))
    }
}

/// Coordinates arrive either as JSON numbers or as numeric strings.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate {:?}", s))),
    }
}
