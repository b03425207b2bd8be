//! Autocomplete session state.
//!
//! [`QueryState`] is a plain state machine: every input, timer expiry and
//! provider answer is a [`SessionEvent`], and applying an event returns the
//! single [`Command`] the driver must carry out. The async driver lives in
//! [`controller`]; everything here is synchronous and deterministic.
use std::mem;

use placefinder_geocoding::{Coordinate, RawCandidate};
use tracing::debug;

use crate::{
    classify::{ProcessedResult, process},
    rank::{distance_km, rank},
    view::{ResultRow, ResultsView, format_distance},
};

mod controller;

pub use controller::Autocomplete;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The input text changed
    TextChanged(String),
    /// The debounce timer for `generation` expired
    FetchStarted { generation: u64 },
    FetchSucceeded {
        generation: u64,
        query: String,
        candidates: Vec<RawCandidate>,
    },
    FetchFailed { generation: u64, query: String },
    /// Location resolution finished; `None` means ranking stays off
    LocationResolved(Option<Coordinate>),
    /// The input regained focus
    Focused,
    /// The user picked the result at this index
    Selected(usize),
    /// Focus moved outside the widget
    Dismissed,
}

/// A request issued to the provider, tagged for the stale-response check.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: String,
    pub near: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    /// Replace any pending timer with one for `generation`
    Schedule { generation: u64 },
    /// Drop the pending timer
    CancelPending,
    Fetch(FetchTicket),
    /// Drop the pending timer and hand the record to the embedder
    Select(RawCandidate),
}

/// State of one input session.
#[derive(Debug, Clone)]
pub struct QueryState {
    text: String,
    loading: bool,
    visible: bool,
    results: Vec<ProcessedResult>,
    generation: u64,
    pending: Option<u64>,
    location: Option<Coordinate>,
    min_query_chars: usize,
}

impl QueryState {
    #[must_use]
    pub fn new(min_query_chars: usize) -> Self {
        Self {
            text: String::new(),
            loading: false,
            visible: false,
            results: Vec::new(),
            generation: 0,
            pending: None,
            location: None,
            min_query_chars,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn results(&self) -> &[ProcessedResult] {
        &self.results
    }

    #[must_use]
    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn query_is_searchable(&self) -> bool {
        self.text.trim().chars().count() >= self.min_query_chars
    }

    fn is_current(&self, generation: u64, query: &str) -> bool {
        generation == self.generation && query == self.text.trim()
    }

    pub fn apply(&mut self, event: SessionEvent) -> Command {
        match event {
            SessionEvent::TextChanged(text) => {
                self.text = text;
                self.generation += 1;
                if self.query_is_searchable() {
                    self.loading = true;
                    self.pending = Some(self.generation);
                    Command::Schedule {
                        generation: self.generation,
                    }
                } else {
                    self.results.clear();
                    self.visible = false;
                    self.loading = false;
                    self.pending = None;
                    Command::CancelPending
                }
            }
            SessionEvent::FetchStarted { generation } => {
                if self.pending != Some(generation) || generation != self.generation {
                    debug!(generation, current = self.generation, "Ignoring superseded timer");
                    return Command::None;
                }
                self.pending = None;
                Command::Fetch(FetchTicket {
                    generation,
                    query: self.text.trim().to_string(),
                    near: self.location,
                })
            }
            SessionEvent::FetchSucceeded {
                generation,
                query,
                candidates,
            } => {
                if !self.is_current(generation, &query) {
                    debug!(generation, query, "Discarding stale response");
                    return Command::None;
                }
                self.results = process(candidates, &self.text, self.location);
                debug!(generation, count = self.results.len(), "Results updated");
                self.loading = false;
                self.visible = true;
                Command::None
            }
            SessionEvent::FetchFailed { generation, query } => {
                if !self.is_current(generation, &query) {
                    debug!(generation, query, "Discarding stale failure");
                    return Command::None;
                }
                self.results.clear();
                self.loading = false;
                self.visible = true;
                Command::None
            }
            SessionEvent::LocationResolved(location) => {
                if self.location.is_some() {
                    return Command::None;
                }
                self.location = location;
                if let Some(origin) = location {
                    self.results = rank(mem::take(&mut self.results), origin);
                }
                Command::None
            }
            SessionEvent::Focused => {
                if !self.results.is_empty() {
                    self.visible = true;
                }
                Command::None
            }
            SessionEvent::Selected(index) => {
                if index >= self.results.len() {
                    debug!(index, available = self.results.len(), "Selection out of range");
                    return Command::None;
                }
                let chosen = self.results.swap_remove(index);
                self.text = chosen.label;
                self.generation += 1;
                self.results.clear();
                self.pending = None;
                self.loading = false;
                self.visible = false;
                Command::Select(chosen.raw)
            }
            SessionEvent::Dismissed => {
                self.visible = false;
                Command::None
            }
        }
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> ResultsView {
        let rows: Vec<ResultRow> = self
            .results
            .iter()
            .map(|result| {
                let distance_km = self.location.and_then(|origin| distance_km(result, origin));
                ResultRow {
                    id: result.id,
                    label: result.label.clone(),
                    category: result.category,
                    badge: result.category.display_name(),
                    distance_km,
                    distance: distance_km.map(format_distance),
                }
            })
            .collect();

        let settled = self.visible && !self.loading;
        ResultsView {
            query: self.text.clone(),
            loading: self.loading,
            visible: self.visible,
            show_list: settled && !rows.is_empty(),
            show_no_results: settled && rows.is_empty() && self.query_is_searchable(),
            sorted_by_distance: self.location.is_some(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use placefinder_geocoding::Address;

    use super::*;

    fn town(id: u64, name: &str, lon: &str) -> RawCandidate {
        RawCandidate {
            place_id: id,
            display_name: name.to_string(),
            kind: "town".to_string(),
            class: "place".to_string(),
            address: Address {
                town: Some(name.to_string()),
                country: Some("France".to_string()),
                ..Address::default()
            },
            lat: "0".to_string(),
            lon: lon.to_string(),
        }
    }

    /// Types `text` and runs the timer, returning the issued ticket.
    fn type_and_fire(state: &mut QueryState, text: &str) -> FetchTicket {
        let Command::Schedule { generation } = state.apply(SessionEvent::TextChanged(text.into()))
        else {
            panic!("expected a scheduled fetch for {text:?}");
        };
        match state.apply(SessionEvent::FetchStarted { generation }) {
            Command::Fetch(ticket) => ticket,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    fn succeed(state: &mut QueryState, ticket: &FetchTicket, candidates: Vec<RawCandidate>) {
        state.apply(SessionEvent::FetchSucceeded {
            generation: ticket.generation,
            query: ticket.query.clone(),
            candidates,
        });
    }

    #[test]
    fn test_short_query_cancels_and_clears() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "Paris");
        succeed(&mut state, &ticket, vec![town(1, "Paris", "0")]);
        assert_eq!(state.results().len(), 1);

        for short in ["", "p", " p ", "   "] {
            assert_eq!(
                state.apply(SessionEvent::TextChanged(short.into())),
                Command::CancelPending
            );
            assert!(state.results().is_empty());
            assert!(!state.is_visible());
            assert!(!state.is_loading());

            let view = state.view();
            assert!(!view.show_list);
            assert!(!view.show_no_results);
        }
    }

    #[test]
    fn test_loading_set_on_schedule() {
        let mut state = QueryState::new(2);
        let command = state.apply(SessionEvent::TextChanged("pa".into()));
        assert_eq!(command, Command::Schedule { generation: 1 });
        assert!(state.is_loading());
        assert!(!state.view().show_list);
    }

    #[test]
    fn test_superseded_timer_does_not_fetch() {
        let mut state = QueryState::new(2);
        state.apply(SessionEvent::TextChanged("par".into()));
        let second = state.apply(SessionEvent::TextChanged("pari".into()));
        assert_eq!(second, Command::Schedule { generation: 2 });

        assert_eq!(
            state.apply(SessionEvent::FetchStarted { generation: 1 }),
            Command::None
        );
        match state.apply(SessionEvent::FetchStarted { generation: 2 }) {
            Command::Fetch(ticket) => assert_eq!(ticket.query, "pari"),
            other => panic!("expected fetch, got {other:?}"),
        }
        assert_eq!(
            state.apply(SessionEvent::FetchStarted { generation: 2 }),
            Command::None,
            "A timer fires at most once"
        );
    }

    #[test]
    fn test_fetch_query_is_trimmed() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "  Lyon ");
        assert_eq!(ticket.query, "Lyon");
        assert_eq!(state.text(), "  Lyon ");
    }

    #[test]
    fn test_success_shows_results() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "par");
        succeed(&mut state, &ticket, vec![town(1, "Paris", "0"), town(2, "Lyon", "0")]);

        assert!(!state.is_loading());
        let view = state.view();
        assert!(view.show_list);
        assert!(!view.show_no_results);
        assert!(!view.sorted_by_distance);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].label, "Paris, France");
        assert_eq!(view.rows[0].badge, "Town");
        assert!(view.rows[0].distance.is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = QueryState::new(2);
        let old = type_and_fire(&mut state, "par");
        let new = type_and_fire(&mut state, "pari");

        succeed(&mut state, &new, vec![town(2, "Paris", "0")]);
        succeed(&mut state, &old, vec![town(1, "Parthenay", "0")]);

        let ids: Vec<u64> = state.results().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);

        state.apply(SessionEvent::FetchFailed {
            generation: old.generation,
            query: old.query,
        });
        assert_eq!(state.results().len(), 1, "Stale failure must not clear results");
    }

    #[test]
    fn test_response_for_other_query_text_is_discarded() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "par");
        state.apply(SessionEvent::FetchSucceeded {
            generation: ticket.generation,
            query: "lyon".to_string(),
            candidates: vec![town(1, "Paris", "0")],
        });
        assert!(state.results().is_empty());
        assert!(state.is_loading());
    }

    #[test]
    fn test_failure_shows_no_results() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "Paris");
        state.apply(SessionEvent::FetchFailed {
            generation: ticket.generation,
            query: ticket.query,
        });

        assert!(!state.is_loading());
        let view = state.view();
        assert!(view.rows.is_empty());
        assert!(!view.show_list);
        assert!(view.show_no_results);
    }

    #[test]
    fn test_selection_emits_raw_and_hides() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "par");
        let paris = town(1, "Paris", "0");
        succeed(&mut state, &ticket, vec![paris.clone(), town(2, "Parthenay", "0")]);

        assert_eq!(state.apply(SessionEvent::Selected(5)), Command::None);
        assert_eq!(state.apply(SessionEvent::Selected(0)), Command::Select(paris));
        assert_eq!(state.text(), "Paris, France");
        assert!(state.results().is_empty());
        assert!(!state.is_visible());

        // A late answer to the pre-selection query is ignored.
        succeed(&mut state, &ticket, vec![town(3, "Paris", "0")]);
        assert!(state.results().is_empty());
    }

    #[test]
    fn test_dismiss_and_focus() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "par");
        succeed(&mut state, &ticket, vec![town(1, "Paris", "0")]);

        state.apply(SessionEvent::Dismissed);
        assert!(!state.view().show_list);
        state.apply(SessionEvent::Focused);
        assert!(state.view().show_list);

        state.apply(SessionEvent::TextChanged("p".into()));
        state.apply(SessionEvent::Focused);
        assert!(!state.is_visible(), "Focus with no results keeps the list closed");
    }

    #[test]
    fn test_location_ranks_and_sticks() {
        let mut state = QueryState::new(2);
        let ticket = type_and_fire(&mut state, "par");
        succeed(
            &mut state,
            &ticket,
            vec![town(1, "Paris", "2"), town(2, "Parthenay", "1")],
        );
        assert_eq!(state.results()[0].id, 1);

        state.apply(SessionEvent::LocationResolved(Some(Coordinate::new(0.0, 0.0))));
        assert_eq!(state.results()[0].id, 2, "Known location re-ranks current results");

        state.apply(SessionEvent::LocationResolved(Some(Coordinate::new(0.0, 5.0))));
        assert_eq!(state.location(), Some(Coordinate::new(0.0, 0.0)));

        let view = state.view();
        assert!(view.sorted_by_distance);
        assert_eq!(view.rows[0].distance.as_deref(), Some("111km away"));

        let ticket = type_and_fire(&mut state, "part");
        assert_eq!(ticket.near, Some(Coordinate::new(0.0, 0.0)));
    }
}
