//! Where the user is, for distance ranking.
//!
//! The device position is preferred. If it is denied or unavailable the
//! caller's fallback coordinate is used, and without either the session
//! simply does not rank.
use futures::future::{self, BoxFuture};
use placefinder_geocoding::Coordinate;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    Denied,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// A device positioning service.
pub trait LocationSource: Send + Sync + 'static {
    fn current_position(&self) -> BoxFuture<'_, Result<Coordinate, LocationError>>;
}

/// For hosts with no positioning support at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceLocation;

impl LocationSource for NoDeviceLocation {
    fn current_position(&self) -> BoxFuture<'_, Result<Coordinate, LocationError>> {
        Box::pin(future::ready(Err(LocationError::Unavailable(
            "no positioning device".to_string(),
        ))))
    }
}

/// A source that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

impl LocationSource for FixedLocation {
    fn current_position(&self) -> BoxFuture<'_, Result<Coordinate, LocationError>> {
        Box::pin(future::ready(Ok(self.0)))
    }
}

/// Resolves the coordinate used for ranking.
pub async fn resolve_user_location<S>(source: &S, fallback: Option<Coordinate>) -> Option<Coordinate>
where
    S: LocationSource + ?Sized,
{
    match source.current_position().await {
        Ok(position) => {
            debug!(%position, "Using device location");
            Some(position)
        }
        Err(err) => {
            match &err {
                LocationError::Denied => warn!(%err, "Device location denied"),
                LocationError::Unavailable(_) => info!(%err, "Device location not available"),
            }
            if let Some(fallback) = fallback {
                debug!(%fallback, "Using caller-supplied location");
            }
            fallback
        }
    }
}
