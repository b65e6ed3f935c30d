//! Search-result interaction state.
//!
//! Keystrokes feed [`SearchState::set_query`]; once the debounce window
//! passes, [`SearchState::poll`] opens a new pending session and hands back a
//! [`SearchTicket`] for the caller to dispatch. Responses come back through
//! [`SearchState::resolve`] and are applied only if their generation is still
//! current.

use crate::core::config::SearchConfig;
use crate::core::geo::NamedLocation;
use crate::core::timer::Debounce;
use crate::runtime::{Generation, GenerationCounter};
use crate::search::service::SearchError;
use crate::{MapError, Result};
use instant::Instant;
use lru::LruCache;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Pending,
    Success,
    Cancelled,
    Failed,
}

impl SearchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Cancelled | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    pub query: String,
    pub status: SearchStatus,
    pub results: Vec<NamedLocation>,
    pub generation: Option<Generation>,
}

impl SearchSession {
    fn idle() -> Self {
        Self {
            query: String::new(),
            status: SearchStatus::Idle,
            results: Vec::new(),
            generation: None,
        }
    }
}

/// A debounced query ready to be sent to the geocoder
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: Generation,
    pub query: String,
}

pub struct SearchState {
    config: SearchConfig,
    debounce: Debounce,
    generations: GenerationCounter,
    session: SearchSession,
    queued_query: Option<String>,
    selection: Option<NamedLocation>,
    cache: Option<LruCache<String, Vec<NamedLocation>>>,
}

impl SearchState {
    pub fn new(config: SearchConfig) -> Self {
        let cache = NonZeroUsize::new(config.cache_capacity).map(LruCache::new);
        Self {
            debounce: Debounce::new(config.debounce()),
            config,
            generations: GenerationCounter::new(),
            session: SearchSession::idle(),
            queued_query: None,
            selection: None,
            cache,
        }
    }

    /// Feed the current contents of the search field
    pub fn set_query(&mut self, query: &str, now: Instant) {
        let query = query.trim();

        if query.is_empty() {
            self.debounce.cancel();
            self.queued_query = None;
            self.generations.invalidate();
            if self.session.status != SearchStatus::Idle {
                log::debug!("search cleared while {:?}", self.session.status);
            }
            self.session = SearchSession::idle();
            return;
        }

        let unchanged = self.queued_query.as_deref() == Some(query)
            || (self.queued_query.is_none()
                && self.session.query == query
                && matches!(
                    self.session.status,
                    SearchStatus::Pending | SearchStatus::Success
                ));
        if unchanged {
            return;
        }

        if self.session.status == SearchStatus::Pending {
            log::debug!("search {:?} superseded by {:?}", self.session.query, query);
            self.session.status = SearchStatus::Cancelled;
            self.generations.invalidate();
        }

        self.queued_query = Some(query.to_string());
        self.debounce.restart(now);
    }

    /// Start the queued query once the debounce window has passed
    pub fn poll(&mut self, now: Instant) -> Option<SearchTicket> {
        if !self.debounce.fire(now) {
            return None;
        }
        let query = self.queued_query.take()?;
        let generation = self.generations.next();

        if let Some(results) = self.cached(&query) {
            log::debug!("search {:?} answered from cache", query);
            self.generations.invalidate();
            self.session = SearchSession {
                query,
                status: SearchStatus::Success,
                results,
                generation: Some(generation),
            };
            return None;
        }

        log::debug!("search {:?} dispatched as {:?}", query, generation);
        self.session = SearchSession {
            query: query.clone(),
            status: SearchStatus::Pending,
            results: Vec::new(),
            generation: Some(generation),
        };
        Some(SearchTicket { generation, query })
    }

    /// Apply a geocoder response; returns false for stale responses
    pub fn resolve(
        &mut self,
        ticket: &SearchTicket,
        outcome: std::result::Result<Vec<NamedLocation>, SearchError>,
    ) -> bool {
        if !self.generations.is_current(ticket.generation)
            || self.session.generation != Some(ticket.generation)
        {
            log::debug!(
                "dropping stale search response for {:?} ({:?})",
                ticket.query,
                ticket.generation
            );
            return false;
        }
        self.generations.invalidate();

        match outcome {
            Ok(mut results) => {
                let received = results.len();
                results.retain(|location| location.point.is_valid());
                if results.len() < received {
                    log::warn!(
                        "search {:?}: dropped {} results with invalid coordinates",
                        ticket.query,
                        received - results.len()
                    );
                }
                results.truncate(self.config.max_results);
                if let Some(cache) = self.cache.as_mut() {
                    cache.put(cache_key(&ticket.query), results.clone());
                }
                self.session.results = results;
                self.session.status = SearchStatus::Success;
            }
            Err(err) => {
                log::warn!("search {:?} failed: {}", ticket.query, err);
                self.session.results.clear();
                self.session.status = SearchStatus::Failed;
            }
        }
        true
    }

    /// Back to idle, abandoning any queued or in-flight query; the cache is kept
    pub fn reset(&mut self) {
        self.debounce.cancel();
        self.queued_query = None;
        self.generations.invalidate();
        self.session = SearchSession::idle();
    }

    /// Result at `index`, without selecting it
    pub fn peek(&self, index: usize) -> Result<NamedLocation> {
        let location = self
            .session
            .results
            .get(index)
            .cloned()
            .ok_or(MapError::InvalidIndex {
                index,
                len: self.session.results.len(),
            })?;
        location.point.validate()?;
        Ok(location)
    }

    /// Pick one of the current results; the result list is cleared
    pub fn select(&mut self, index: usize) -> Result<NamedLocation> {
        let location = self.peek(index)?;
        self.session.results.clear();
        self.selection = Some(location.clone());
        Ok(location)
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn status(&self) -> SearchStatus {
        self.session.status
    }

    pub fn results(&self) -> &[NamedLocation] {
        &self.session.results
    }

    pub fn selection(&self) -> Option<&NamedLocation> {
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// A query is waiting for its debounce window
    pub fn is_debouncing(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    fn cached(&mut self, query: &str) -> Option<Vec<NamedLocation>> {
        self.cache.as_mut()?.get(&cache_key(query)).cloned()
    }
}

fn cache_key(query: &str) -> String {
    query.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use std::time::Duration;

    fn place(name: &str, lat: f64, lng: f64) -> NamedLocation {
        NamedLocation::new(name, LatLng::new(lat, lng))
    }

    fn state() -> SearchState {
        SearchState::new(SearchConfig::default())
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_debounce_delays_dispatch() {
        let start = Instant::now();
        let mut search = state();

        search.set_query("Par", start);
        search.set_query("Paris", ms(start, 200));
        assert_eq!(search.poll(ms(start, 300)), None);
        assert_eq!(search.status(), SearchStatus::Idle);

        let ticket = search.poll(ms(start, 500)).unwrap();
        assert_eq!(ticket.query, "Paris");
        assert_eq!(search.status(), SearchStatus::Pending);
    }

    #[test]
    fn test_success_truncates_results() {
        let start = Instant::now();
        let mut search = SearchState::new(SearchConfig {
            max_results: 2,
            ..SearchConfig::default()
        });
        search.set_query("Dhaka", start);
        let ticket = search.poll(ms(start, 300)).unwrap();

        let applied = search.resolve(
            &ticket,
            Ok(vec![
                place("Dhaka", 23.8, 90.4),
                place("Dhaka Division", 23.9, 90.3),
                place("Old Dhaka", 23.7, 90.4),
            ]),
        );
        assert!(applied);
        assert_eq!(search.status(), SearchStatus::Success);
        assert_eq!(search.results().len(), 2);
    }

    #[test]
    fn test_newer_query_supersedes_older() {
        let start = Instant::now();
        let mut search = state();

        search.set_query("Paris", start);
        let paris = search.poll(ms(start, 300)).unwrap();

        search.set_query("London", ms(start, 310));
        assert_eq!(search.status(), SearchStatus::Cancelled);
        let london = search.poll(ms(start, 610)).unwrap();
        assert!(london.generation > paris.generation);

        assert!(search.resolve(&london, Ok(vec![place("London", 51.5, -0.12)])));
        assert!(!search.resolve(&paris, Ok(vec![place("Paris", 48.85, 2.35)])));

        assert_eq!(search.session().query, "London");
        assert_eq!(search.results(), &[place("London", 51.5, -0.12)]);
    }

    #[test]
    fn test_stale_response_dropped_even_if_it_arrives_first() {
        let start = Instant::now();
        let mut search = state();

        search.set_query("Paris", start);
        let paris = search.poll(ms(start, 300)).unwrap();
        search.set_query("London", ms(start, 310));

        assert!(!search.resolve(&paris, Ok(vec![place("Paris", 48.85, 2.35)])));
        assert!(search.results().is_empty());

        let london = search.poll(ms(start, 610)).unwrap();
        assert!(search.resolve(&london, Ok(vec![place("London", 51.5, -0.12)])));
        assert_eq!(search.results()[0].name, "London");
    }

    #[test]
    fn test_clearing_query_mid_flight_forces_idle() {
        let start = Instant::now();
        let mut search = state();

        search.set_query("Sylhet", start);
        let ticket = search.poll(ms(start, 300)).unwrap();
        assert_eq!(search.status(), SearchStatus::Pending);

        search.set_query("   ", ms(start, 350));
        assert_eq!(search.status(), SearchStatus::Idle);
        assert!(search.results().is_empty());

        assert!(!search.resolve(&ticket, Ok(vec![place("Sylhet", 24.9, 91.8)])));
        assert_eq!(search.status(), SearchStatus::Idle);
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_clearing_query_cancels_debounce() {
        let start = Instant::now();
        let mut search = state();
        search.set_query("Rome", start);
        search.set_query("", ms(start, 100));
        assert!(!search.is_debouncing());
        assert_eq!(search.poll(ms(start, 1000)), None);
    }

    #[test]
    fn test_reset_orphans_in_flight_query() {
        let start = Instant::now();
        let mut search = state();
        search.set_query("Khulna", start);
        let ticket = search.poll(ms(start, 300)).unwrap();
        search.set_query("Rajshahi", ms(start, 350));

        search.reset();
        assert_eq!(search.status(), SearchStatus::Idle);
        assert!(!search.is_debouncing());
        assert!(!search.resolve(&ticket, Ok(vec![place("Khulna", 22.8, 89.55)])));
        assert!(search.results().is_empty());
        assert_eq!(search.poll(ms(start, 2000)), None);
    }

    #[test]
    fn test_failure_surfaces_as_status() {
        let start = Instant::now();
        let mut search = state();
        search.set_query("Nowhere", start);
        let ticket = search.poll(ms(start, 300)).unwrap();

        assert!(search.resolve(&ticket, Err(SearchError::Unreachable("timeout".into()))));
        assert_eq!(search.status(), SearchStatus::Failed);
        assert!(search.results().is_empty());

        // terminal states only leave through a new query
        search.set_query("Somewhere", ms(start, 400));
        assert!(search.poll(ms(start, 700)).is_some());
        assert_eq!(search.status(), SearchStatus::Pending);
    }

    #[test]
    fn test_repeat_query_served_from_cache() {
        let start = Instant::now();
        let mut search = state();
        search.set_query("Bandarban", start);
        let ticket = search.poll(ms(start, 300)).unwrap();
        search.resolve(&ticket, Ok(vec![place("Bandarban", 22.19, 92.21)]));

        search.set_query("Cox's Bazar", ms(start, 400));
        let other = search.poll(ms(start, 700)).unwrap();
        search.resolve(&other, Ok(vec![place("Cox's Bazar", 21.42, 92.0)]));

        search.set_query("bandarban", ms(start, 800));
        assert_eq!(search.poll(ms(start, 1100)), None);
        assert_eq!(search.status(), SearchStatus::Success);
        assert_eq!(search.results()[0].name, "Bandarban");
    }

    #[test]
    fn test_out_of_range_results_are_discarded() {
        let start = Instant::now();
        let mut search = state();
        search.set_query("Pole", start);
        let ticket = search.poll(ms(start, 300)).unwrap();

        assert!(search.resolve(
            &ticket,
            Ok(vec![place("Beyond", 95.0, 0.0), place("North Pole", 90.0, 0.0)])
        ));
        assert_eq!(search.results(), &[place("North Pole", 90.0, 0.0)]);
    }

    #[test]
    fn test_select_records_and_clears_results() {
        let start = Instant::now();
        let mut search = state();
        search.set_query("Kyoto", start);
        let ticket = search.poll(ms(start, 300)).unwrap();
        search.resolve(&ticket, Ok(vec![place("Kyoto", 35.01, 135.77)]));

        assert!(matches!(
            search.select(3),
            Err(MapError::InvalidIndex { index: 3, len: 1 })
        ));
        let chosen = search.select(0).unwrap();
        assert_eq!(chosen.name, "Kyoto");
        assert_eq!(search.selection(), Some(&chosen));
        assert!(search.results().is_empty());
    }
}
