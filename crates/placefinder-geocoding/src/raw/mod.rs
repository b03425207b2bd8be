use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "http_client")]
pub mod fetch;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Structured address parts as returned with `addressdetails=1`.
///
/// Every field is optional; the provider only fills the levels that exist
/// for a given place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub suburb: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

/// A single place record from the provider, before any filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Provider-unique place identifier
    pub place_id: u64,
    /// Provider's own full display string
    pub display_name: String,
    /// Place type, e.g. "city", "village", "administrative"
    #[serde(rename = "type")]
    pub kind: String,
    /// Broad OSM class, e.g. "place", "boundary", "highway"
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub address: Address,
    /// Latitude as sent by the provider (decimal string)
    pub lat: String,
    /// Longitude as sent by the provider (decimal string)
    pub lon: String,
}

impl RawCandidate {
    /// Parses the provider's decimal strings into a [`Coordinate`].
    ///
    /// Returns `None` if either component is not a finite number.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lon = self.lon.trim().parse::<f64>().ok()?;
        (lat.is_finite() && lon.is_finite()).then_some(Coordinate { lat, lon })
    }
}

impl fmt::Display for RawCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawCandidate {{ place_id: {}, type: \"{}\", name: \"{}\" }}",
            self.place_id, self.kind, self.display_name
        )
    }
}
