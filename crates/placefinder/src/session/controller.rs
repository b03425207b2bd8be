use std::sync::Arc;

use futures::{
    StreamExt,
    future::BoxFuture,
    stream::FuturesUnordered,
};
use placefinder_geocoding::{Geocoder, RawCandidate};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, instrument, warn};

use super::{Command, FetchTicket, QueryState, SessionEvent};
use crate::{
    config::AutocompleteConfig,
    error::{PlacefinderError, Result},
    location::{LocationSource, NoDeviceLocation, resolve_user_location},
    view::ResultsView,
};

type Pending = FuturesUnordered<BoxFuture<'static, SessionEvent>>;

/// Handle to a running autocomplete session.
///
/// The session runs as one task owning its [`QueryState`]; this handle
/// feeds it input and observes its output. Dropping the handle (or calling
/// [`Autocomplete::shutdown`]) stops the task, cancelling the debounce timer
/// and any request still in flight.
///
/// # Examples
///
/// ```rust,no_run
/// use placefinder::{Autocomplete, AutocompleteConfig, geocoding::{ClientConfig, NominatimClient}};
///
/// # async fn run() -> Result<(), placefinder::error::PlacefinderError> {
/// let client = NominatimClient::new(ClientConfig::new("MyTravelApp", "maps@example.org"))?;
/// let session = Autocomplete::spawn(client, AutocompleteConfig::default());
///
/// session.input("Ber")?;
/// session.input("Berl")?;
/// let view = session.view();
/// assert!(view.loading);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Autocomplete {
    events: mpsc::UnboundedSender<SessionEvent>,
    view: watch::Receiver<ResultsView>,
    selections: mpsc::UnboundedReceiver<RawCandidate>,
    task: JoinHandle<()>,
}

impl Autocomplete {
    /// Starts a session without device positioning; the configured fallback
    /// location, if any, is used for ranking.
    pub fn spawn<G: Geocoder>(geocoder: G, config: AutocompleteConfig) -> Self {
        Self::spawn_with_location(geocoder, NoDeviceLocation, config)
    }

    /// Starts a session that asks `location` for the user's position.
    pub fn spawn_with_location<G, L>(geocoder: G, location: L, config: AutocompleteConfig) -> Self
    where
        G: Geocoder,
        L: LocationSource,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (selections_tx, selections_rx) = mpsc::unbounded_channel();
        let state = QueryState::new(config.min_query_chars);
        let (view_tx, view_rx) = watch::channel(state.view());

        let mut pending: Pending = FuturesUnordered::new();
        let source: Arc<dyn LocationSource> = Arc::new(location);
        let fallback = config.fallback_location;
        pending.push(Box::pin(async move {
            SessionEvent::LocationResolved(resolve_user_location(source.as_ref(), fallback).await)
        }));

        let mut actor = SessionActor {
            state,
            config,
            geocoder: Arc::new(geocoder),
            timer: None,
            pending,
            view: view_tx,
            selections: selections_tx,
        };
        if let Some(text) = actor.config.initial_text.clone() {
            actor.dispatch(SessionEvent::TextChanged(text));
        }

        let task = tokio::spawn(actor.run(events_rx));
        Self {
            events: events_tx,
            view: view_rx,
            selections: selections_rx,
            task,
        }
    }

    /// Builds a Nominatim client and starts a session on it.
    #[cfg(feature = "http_client")]
    pub fn with_nominatim(
        client: placefinder_geocoding::ClientConfig,
        config: AutocompleteConfig,
    ) -> Result<Self> {
        let client = placefinder_geocoding::NominatimClient::new(client)?;
        Ok(Self::spawn(client, config))
    }

    fn send(&self, event: SessionEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| PlacefinderError::SessionClosed)
    }

    /// Reports the full current input text.
    pub fn input(&self, text: impl Into<String>) -> Result<()> {
        self.send(SessionEvent::TextChanged(text.into()))
    }

    pub fn focus(&self) -> Result<()> {
        self.send(SessionEvent::Focused)
    }

    /// Focus moved outside the widget.
    pub fn dismiss(&self) -> Result<()> {
        self.send(SessionEvent::Dismissed)
    }

    /// Picks the row at `index` of the current view.
    pub fn select(&self, index: usize) -> Result<()> {
        self.send(SessionEvent::Selected(index))
    }

    /// Latest snapshot.
    #[must_use]
    pub fn view(&self) -> ResultsView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified whenever the snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResultsView> {
        self.view.clone()
    }

    /// Waits for the next picked record. Returns `None` once the session
    /// has stopped.
    pub async fn next_selection(&mut self) -> Option<RawCandidate> {
        self.selections.recv().await
    }

    /// Stops the session.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Autocomplete {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct SessionActor {
    state: QueryState,
    config: AutocompleteConfig,
    geocoder: Arc<dyn Geocoder>,
    /// Debounce deadline and the generation it belongs to
    timer: Option<(Instant, u64)>,
    /// In-flight requests and location resolution
    pending: Pending,
    view: watch::Sender<ResultsView>,
    selections: mpsc::UnboundedSender<RawCandidate>,
}

impl SessionActor {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        loop {
            let deadline = self.timer.map_or_else(Instant::now, |(at, _)| at);
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        debug!("Session handle dropped, stopping");
                        break;
                    }
                },
                () = sleep_until(deadline), if self.timer.is_some() => {
                    if let Some((_, generation)) = self.timer.take() {
                        self.dispatch(SessionEvent::FetchStarted { generation });
                    }
                },
                Some(event) = self.pending.next(), if !self.pending.is_empty() => {
                    self.dispatch(event);
                },
            }
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        match self.state.apply(event) {
            Command::None => {}
            Command::Schedule { generation } => {
                self.timer = Some((Instant::now() + self.config.debounce, generation));
            }
            Command::CancelPending => self.timer = None,
            Command::Fetch(ticket) => self.fetch(ticket),
            Command::Select(raw) => {
                self.timer = None;
                if self.selections.send(raw).is_err() {
                    debug!("Selection receiver dropped");
                }
            }
        }

        let snapshot = self.state.view();
        self.view.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    #[instrument(name = "Schedule fetch", skip_all, fields(generation = ticket.generation, query = %ticket.query))]
    fn fetch(&mut self, ticket: FetchTicket) {
        let geocoder = Arc::clone(&self.geocoder);
        self.pending.push(Box::pin(async move {
            let FetchTicket {
                generation,
                query,
                near,
            } = ticket;
            match geocoder.search(&query, near).await {
                Ok(candidates) => {
                    debug!(generation, count = candidates.len(), "Fetch settled");
                    SessionEvent::FetchSucceeded {
                        generation,
                        query,
                        candidates,
                    }
                }
                Err(err) => {
                    warn!(generation, %err, "Geocoding request failed");
                    SessionEvent::FetchFailed { generation, query }
                }
            }
        }));
    }
}
