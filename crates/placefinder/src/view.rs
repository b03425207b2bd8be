//! Read-only snapshot handed to the presentation surface.
use crate::classify::PlaceCategory;

/// One rendered result line.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub id: u64,
    pub label: String,
    pub category: PlaceCategory,
    /// Capitalised category, e.g. "Village"
    pub badge: &'static str,
    pub distance_km: Option<f64>,
    /// e.g. "850m away" or "12km away"
    pub distance: Option<String>,
}

/// Everything the widget needs to draw itself.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsView {
    /// Current input text
    pub query: String,
    /// Spinner flag: a search is scheduled or in flight
    pub loading: bool,
    /// Dropdown open (before accounting for loading and emptiness)
    pub visible: bool,
    pub rows: Vec<ResultRow>,
    /// Rows are ordered by distance from the user
    pub sorted_by_distance: bool,
    /// Draw the result list
    pub show_list: bool,
    /// Draw the "no locations found" panel
    pub show_no_results: bool,
}

/// Formats a distance for display: metres below one kilometre, whole
/// kilometres above.
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m away", (km * 1000.0).round() as u64)
    } else {
        format!("{}km away", km.round() as u64)
    }
}
