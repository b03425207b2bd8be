//! Geocoding provider access for placefinder.
//!
//! This crate holds the wire model returned by the Nominatim search endpoint
//! ([`RawCandidate`], [`Address`]), the [`Geocoder`] seam the autocomplete
//! controller fetches through, and (behind the default `http_client`
//! feature) the reqwest-backed [`NominatimClient`].
use futures::future::BoxFuture;

pub mod raw;

pub use raw::{Address, Coordinate, RawCandidate};
#[cfg(feature = "http_client")]
pub use raw::fetch::{ClientConfig, NOMINATIM_SEARCH_URL, NominatimClient};
#[cfg(feature = "http_client")]
pub use reqwest::StatusCode;

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum GeocodeError {
        #[cfg(feature = "http_client")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[cfg(feature = "http_client")]
        #[error("Provider responded with status {0}")]
        Status(reqwest::StatusCode),
        #[error("Malformed provider response: {0}")]
        Decode(#[from] serde_json::Error),
        #[error("Client identification requires a non-empty {0}")]
        MissingIdentification(&'static str),
    }

    pub type Result<T> = std::result::Result<T, GeocodeError>;
}

pub use error::{GeocodeError, Result};

/// A source of raw place candidates for a typed query.
///
/// Implementations must treat `near` as a hint only; callers re-rank the
/// returned candidates themselves.
pub trait Geocoder: Send + Sync + 'static {
    fn search<'a>(
        &'a self,
        text: &'a str,
        near: Option<Coordinate>,
    ) -> BoxFuture<'a, Result<Vec<RawCandidate>>>;
}

impl<G: Geocoder + ?Sized> Geocoder for std::sync::Arc<G> {
    fn search<'a>(
        &'a self,
        text: &'a str,
        near: Option<Coordinate>,
    ) -> BoxFuture<'a, Result<Vec<RawCandidate>>> {
        (**self).search(text, near)
    }
}
