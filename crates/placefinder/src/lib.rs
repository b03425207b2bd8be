//! Placefinder - debounced place autocomplete over a public geocoder
//!
//! Placefinder turns a stream of keystrokes into a short, clean list of
//! populated places. Queries are debounced, sent to the Nominatim search
//! endpoint, filtered down to cities, towns, suburbs, villages and hamlets,
//! given a readable label, and ranked by distance from the user when their
//! position is known.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use placefinder::{Autocomplete, AutocompleteConfigBuilder, geocoding::ClientConfig};
//!
//! # async fn run() -> Result<(), placefinder::error::PlacefinderError> {
//! let client = ClientConfig::new("MyTravelApp", "maps@example.org");
//! let config = AutocompleteConfigBuilder::new()
//!     .fallback_location(51.5074, -0.1278)?
//!     .build();
//!
//! let mut session = Autocomplete::with_nominatim(client, config)?;
//! session.input("Lond")?;
//!
//! let mut view = session.subscribe();
//! let view = view
//!     .wait_for(|v| v.show_list || v.show_no_results)
//!     .await
//!     .map_err(|_| placefinder::error::PlacefinderError::SessionClosed)?
//!     .clone();
//! for row in &view.rows {
//!     println!("{} [{}] {}", row.label, row.badge, row.distance.as_deref().unwrap_or(""));
//! }
//!
//! session.select(0)?;
//! if let Some(place) = session.next_selection().await {
//!     println!("Picked {}", place.display_name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! - **Debounce**: at most one provider call per quiet interval; queries
//!   shorter than two characters never reach the network.
//! - **Classification**: roads and non-settlement types are dropped, the
//!   typed text must appear in one of the place-name fields, and labels are
//!   composed per place category.
//! - **Ranking**: great-circle distance from the user's position, nearest
//!   first, ties kept in provider order.
//! - **Stale guard**: every request is tagged, and answers to superseded
//!   queries are thrown away.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod classify;
mod config;
pub mod error;
mod location;
mod rank;
mod session;
mod view;

pub use classify::{PlaceCategory, ProcessedResult, process, process_candidate};
pub use config::{AutocompleteConfig, AutocompleteConfigBuilder};
pub use location::{
    FixedLocation, LocationError, LocationSource, NoDeviceLocation, resolve_user_location,
};
pub use placefinder_geocoding as geocoding;
pub use placefinder_geocoding::{Address, Coordinate, Geocoder, RawCandidate};
pub use rank::{EARTH_RADIUS_KM, distance_km, haversine_km, rank};
pub use session::{Autocomplete, Command, FetchTicket, QueryState, SessionEvent};
pub use view::{ResultRow, ResultsView, format_distance};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for placefinder.
///
/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` when set, or by
/// `level` otherwise. HTTP client internals are held at `warn`. Safe to call
/// more than once; only the first call installs anything.
///
/// # Examples
///
/// ```rust
/// use placefinder::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), placefinder::error::PlacefinderError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::PlacefinderError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}
