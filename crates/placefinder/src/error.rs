use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacefinderError {
    #[error("Geocoding error: {0}")]
    Geocode(#[from] placefinder_geocoding::GeocodeError),
    #[error("Location error: {0}")]
    Location(#[from] crate::location::LocationError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Autocomplete session has shut down")]
    SessionClosed,
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),
}

pub type Result<T> = std::result::Result<T, PlacefinderError>;
