//! Parsing of the scraper's composite city label.

/// Municipality and province names extracted from a city label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CityParts {
    pub municipality: Option<String>,
    pub province: Option<String>,
}

/// Split a `"Region - Locality"` label into municipality and province.
///
/// Parts are hyphen-separated, trimmed, and empty parts are dropped. The last
/// part is the municipality and the first is the province; with a single part
/// it serves as both. Middle parts of labels like `"A - B - C"` are discarded.
pub fn parse_city(city: Option<&str>) -> CityParts {
    let parts: Vec<&str> = city
        .unwrap_or_default()
        .split('-')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    match (parts.first(), parts.last()) {
        (Some(first), Some(last)) => CityParts {
            municipality: Some(last.to_string()),
            province: Some(first.to_string()),
        },
        _ => CityParts::default(),
    }
}
