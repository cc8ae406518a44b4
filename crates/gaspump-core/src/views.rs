//! Data shaping for the map and table pages.
//!
//! Pure functions over station records: dropdown options, the municipality
//! filter, where the map should centre, and the plain-text rendering used when
//! rows are copied to the clipboard.

use crate::models::StationRecord;

/// Zoom with nothing to show.
pub const EMPTY_ZOOM: u8 = 2;
/// Zoom for the whole station set.
pub const OVERVIEW_ZOOM: u8 = 5;
/// Zoom when centred on a selected address.
pub const SELECTED_ZOOM: u8 = 12;

/// Where the map should look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFocus {
    /// (latitude, longitude), or None to let the map fit the data.
    pub center: Option<(f64, f64)>,
    pub zoom: u8,
}

/// Distinct non-empty addresses in first-seen order.
pub fn address_options(records: &[StationRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.address.as_deref()))
}

/// Distinct non-empty municipalities in first-seen order.
pub fn municipality_options(records: &[StationRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.municipality.as_deref()))
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values.flatten().filter(|v| !v.is_empty()) {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Records in the selected municipality, or all records with no selection.
pub fn filter_by_municipality(records: &[StationRecord], selected: Option<&str>) -> Vec<StationRecord> {
    match selected {
        Some(municipality) => records
            .iter()
            .filter(|r| r.municipality.as_deref() == Some(municipality))
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}

/// Map view for the current data and address selection.
///
/// An address that is not in the data (or has no coordinates) is treated as
/// no selection.
pub fn map_focus(records: &[StationRecord], selected_address: Option<&str>) -> MapFocus {
    if records.is_empty() {
        return MapFocus {
            center: None,
            zoom: EMPTY_ZOOM,
        };
    }

    let selected = selected_address.and_then(|address| {
        records
            .iter()
            .find(|r| r.has_address(address))
            .and_then(StationRecord::coordinates)
    });

    match selected {
        Some(center) => MapFocus {
            center: Some(center),
            zoom: SELECTED_ZOOM,
        },
        None => MapFocus {
            center: None,
            zoom: OVERVIEW_ZOOM,
        },
    }
}

const ROW_COLUMNS: [&str; 5] = ["Station", "Address", "Municipality", "Latitude", "Longitude"];

/// Render rows as a fixed-width text table.
pub fn render_rows(records: &[StationRecord]) -> String {
    if records.is_empty() {
        return "No selections".to_string();
    }

    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.station.clone().unwrap_or_default(),
                r.address.clone().unwrap_or_default(),
                r.municipality.clone().unwrap_or_default(),
                r.latitude.map(|v| v.to_string()).unwrap_or_default(),
                r.longitude.map(|v| v.to_string()).unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = ROW_COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(&ROW_COLUMNS)];
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_line(&cells));
    }
    lines.join("\n")
}
