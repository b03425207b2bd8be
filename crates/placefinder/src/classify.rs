//! Candidate filtering and label composition.
//!
//! The provider's `featureType=settlement` restriction is loose: roads named
//! after towns and whole administrative boundaries still come back. This
//! module keeps only genuine populated places whose names contain the typed
//! text, and builds a short "Place, Parent, Country" label for each.
use std::fmt;

use itertools::Itertools;
use placefinder_geocoding::{Address, Coordinate, RawCandidate};
use tracing::debug;

use crate::rank;

/// OSM classes that never describe a settlement, whatever their type says.
const EXCLUDED_CLASSES: [&str; 2] = ["highway", "road"];

/// Parent names containing these are administrative artifacts, not places.
const ADMINISTRATIVE_MARKERS: [&str; 3] = ["ward", "municipality", "metropolitan"];

/// The place types shown to the user.
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceCategory {
    City,
    Town,
    Suburb,
    Village,
    Hamlet,
}

impl PlaceCategory {
    pub const ALL: [Self; 5] = [
        Self::City,
        Self::Town,
        Self::Suburb,
        Self::Village,
        Self::Hamlet,
    ];

    /// Maps a provider `type` onto a category, or `None` if it is not shown.
    #[must_use]
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "city" => Some(Self::City),
            "town" => Some(Self::Town),
            "suburb" => Some(Self::Suburb),
            "village" => Some(Self::Village),
            "hamlet" => Some(Self::Hamlet),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Town => "town",
            Self::Suburb => "suburb",
            Self::Village => "village",
            Self::Hamlet => "hamlet",
        }
    }

    /// Capitalised name used for badges.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::City => "City",
            Self::Town => "Town",
            Self::Suburb => "Suburb",
            Self::Village => "Village",
            Self::Hamlet => "Hamlet",
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate that passed filtering, with its composed label.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedResult {
    /// Provider place id
    pub id: u64,
    pub label: String,
    pub category: PlaceCategory,
    /// The untouched provider record, handed back on selection
    pub raw: RawCandidate,
}

/// Address fields with empty strings treated as missing.
struct AddressParts<'a> {
    city: Option<&'a str>,
    town: Option<&'a str>,
    suburb: Option<&'a str>,
    village: Option<&'a str>,
    hamlet: Option<&'a str>,
    county: Option<&'a str>,
    state: Option<&'a str>,
    country: Option<&'a str>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl<'a> AddressParts<'a> {
    fn new(address: &'a Address) -> Self {
        Self {
            city: present(address.city.as_ref()),
            town: present(address.town.as_ref()),
            suburb: present(address.suburb.as_ref()),
            village: present(address.village.as_ref()),
            hamlet: present(address.hamlet.as_ref()),
            county: present(address.county.as_ref()),
            state: present(address.state.as_ref()),
            country: present(address.country.as_ref()),
        }
    }

    /// City, else town, else village.
    fn resolved_city(&self) -> Option<&'a str> {
        self.city.or(self.town).or(self.village)
    }

    fn matches(&self, needle: &str) -> bool {
        [
            self.suburb,
            self.resolved_city(),
            self.town,
            self.village,
            self.hamlet,
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }

    fn label(&self, category: PlaceCategory) -> String {
        let city = self.resolved_city();
        let parts = match category {
            PlaceCategory::Suburb => {
                let parent = normalize_parent(self.city)
                    .or_else(|| normalize_parent(self.town))
                    .or_else(|| normalize_parent(self.county))
                    .or_else(|| normalize_parent(self.state))
                    // Resolved city is checked too, so "Ward 12" never shows as a parent.
                    .or_else(|| normalize_parent(city));
                [self.suburb.or(city), parent, self.country]
            }
            PlaceCategory::Town => [self.town.or(city).or(self.village), None, self.country],
            PlaceCategory::Village | PlaceCategory::Hamlet => {
                let parent = normalize_parent(self.city)
                    .or_else(|| normalize_parent(self.town))
                    .or_else(|| normalize_parent(self.county));
                [self.village.or(self.hamlet).or(city), parent, self.country]
            }
            PlaceCategory::City => [city.or(self.suburb).or(self.village), None, self.country],
        };
        parts.into_iter().flatten().join(", ")
    }
}

fn normalize_parent(value: Option<&str>) -> Option<&str> {
    value.filter(|v| {
        let lower = v.to_lowercase();
        !ADMINISTRATIVE_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
    })
}

/// Runs one candidate through the filters.
///
/// `needle` must already be trimmed and lower-cased.
#[must_use]
pub fn process_candidate(candidate: RawCandidate, needle: &str) -> Option<ProcessedResult> {
    if EXCLUDED_CLASSES.contains(&candidate.class.as_str()) {
        debug!(place_id = candidate.place_id, class = %candidate.class, "Dropping road candidate");
        return None;
    }
    let Some(category) = PlaceCategory::from_kind(&candidate.kind) else {
        debug!(place_id = candidate.place_id, kind = %candidate.kind, "Dropping non-settlement candidate");
        return None;
    };

    let parts = AddressParts::new(&candidate.address);
    if parts.country.is_none() {
        debug!(place_id = candidate.place_id, "Dropping candidate without country");
        return None;
    }
    if !parts.matches(needle) {
        debug!(place_id = candidate.place_id, needle, "Dropping candidate not matching query");
        return None;
    }

    let label = parts.label(category);
    Some(ProcessedResult {
        id: candidate.place_id,
        label,
        category,
        raw: candidate,
    })
}

/// Filters and labels the provider's candidates for `query`.
///
/// Results keep provider order unless `near` is given, in which case they are
/// ranked nearest first.
pub fn process(
    candidates: impl IntoIterator<Item = RawCandidate>,
    query: &str,
    near: Option<Coordinate>,
) -> Vec<ProcessedResult> {
    let needle = query.trim().to_lowercase();
    let results: Vec<ProcessedResult> = candidates
        .into_iter()
        .filter_map(|candidate| process_candidate(candidate, &needle))
        .collect();

    match near {
        Some(origin) => rank::rank(results, origin),
        None => results,
    }
}
