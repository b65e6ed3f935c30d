//! Decides when a route has to be (re)calculated.
//!
//! The orchestrator never talks to the network itself. Every input returns
//! the [`RouteRequest`] that should be dispatched, if any, and completed
//! requests come back through [`DirectionsOrchestrator::resolve`].

use crate::core::geo::{LatLng, NamedLocation};
use crate::routing::service::{RouteError, RouteRequest, RouteResult};
use crate::runtime::{Generation, GenerationCounter};
use crate::waypoints::WaypointList;
use crate::Result;
use std::sync::Arc;

/// What became of a completed route request
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Applied(Arc<RouteResult>),
    /// The previous route stays on the map
    Failed(RouteError),
    /// Superseded while in flight; dropped
    Stale,
}

#[derive(Debug, Default)]
pub struct DirectionsOrchestrator {
    enabled: bool,
    start: Option<LatLng>,
    destination: Option<NamedLocation>,
    waypoints: Vec<LatLng>,
    generations: GenerationCounter,
    in_flight: Option<RouteRequest>,
    active_route: Option<Arc<RouteResult>>,
    last_failure: Option<RouteError>,
}

impl DirectionsOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directions mode toggle. Turning it off drops the route but keeps waypoints.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<RouteRequest> {
        if self.enabled == enabled {
            return None;
        }
        self.enabled = enabled;
        log::debug!("directions {}", if enabled { "enabled" } else { "disabled" });

        if enabled {
            self.issue()
        } else {
            self.drop_route();
            None
        }
    }

    pub fn set_start(&mut self, start: Option<LatLng>) -> Result<Option<RouteRequest>> {
        if let Some(point) = &start {
            point.validate()?;
        }
        if self.start == start {
            return Ok(None);
        }
        self.start = start;
        Ok(self.reevaluate())
    }

    pub fn set_destination(
        &mut self,
        destination: Option<NamedLocation>,
    ) -> Result<Option<RouteRequest>> {
        if let Some(location) = &destination {
            location.point.validate()?;
        }
        if self.destination == destination {
            return Ok(None);
        }
        self.destination = destination;
        Ok(self.reevaluate())
    }

    /// Snapshot the waypoint order; re-issues at once while enabled
    pub fn waypoints_changed(&mut self, waypoints: &WaypointList) -> Option<RouteRequest> {
        let points = waypoints.points();
        if points == self.waypoints {
            return None;
        }
        self.waypoints = points;
        self.issue()
    }

    /// Apply a routing response; only the newest request may change state
    pub fn resolve(
        &mut self,
        generation: Generation,
        outcome: std::result::Result<RouteResult, RouteError>,
    ) -> RouteOutcome {
        if !self.generations.is_current(generation) {
            log::debug!("dropping stale route response {:?}", generation);
            return RouteOutcome::Stale;
        }
        self.generations.invalidate();
        self.in_flight = None;

        match outcome {
            Ok(route) => {
                log::info!(
                    "route {:?} calculated: {:.1} km, {:.0} min",
                    generation,
                    route.distance_km(),
                    route.duration_minutes()
                );
                let route = Arc::new(route);
                self.active_route = Some(route.clone());
                self.last_failure = None;
                RouteOutcome::Applied(route)
            }
            Err(err) => {
                log::warn!("route {:?} failed: {}", generation, err);
                self.last_failure = Some(err.clone());
                RouteOutcome::Failed(err)
            }
        }
    }

    /// Forget the outstanding request; its response will be treated as stale
    pub fn invalidate_in_flight(&mut self) {
        if let Some(request) = self.in_flight.take() {
            log::debug!("route request {:?} abandoned", request.generation);
        }
        self.generations.invalidate();
    }

    /// Fresh request for the current inputs, if directions can route
    pub fn refresh(&mut self) -> Option<RouteRequest> {
        self.issue()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start(&self) -> Option<LatLng> {
        self.start
    }

    pub fn destination(&self) -> Option<&NamedLocation> {
        self.destination.as_ref()
    }

    pub fn in_flight(&self) -> Option<&RouteRequest> {
        self.in_flight.as_ref()
    }

    pub fn active_route(&self) -> Option<&Arc<RouteResult>> {
        self.active_route.as_ref()
    }

    pub fn last_failure(&self) -> Option<&RouteError> {
        self.last_failure.as_ref()
    }

    /// Directions are on and both ends are known
    pub fn can_route(&self) -> bool {
        self.enabled && self.start.is_some() && self.destination.is_some()
    }

    fn reevaluate(&mut self) -> Option<RouteRequest> {
        if self.enabled && !self.can_route() {
            // an end point disappeared; whatever is drawn no longer applies
            self.drop_route();
            return None;
        }
        self.issue()
    }

    fn issue(&mut self) -> Option<RouteRequest> {
        if !self.can_route() {
            return None;
        }
        let start = self.start?;
        let destination = self.destination.as_ref()?.point;

        let request = RouteRequest {
            generation: self.generations.next(),
            start,
            waypoints: self.waypoints.clone(),
            destination,
        };
        log::debug!(
            "route request {:?} with {} stops",
            request.generation,
            request.waypoints.len() + 2
        );
        self.in_flight = Some(request.clone());
        Some(request)
    }

    fn drop_route(&mut self) {
        self.generations.invalidate();
        self.in_flight = None;
        self.active_route = None;
        self.last_failure = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapError;

    fn destination() -> NamedLocation {
        NamedLocation::new("Destination", LatLng::new(10.0, 10.0))
    }

    fn straight_route(stops: &[LatLng]) -> RouteResult {
        RouteResult::new(stops.to_vec(), 1_000.0, 60.0)
    }

    fn ready() -> DirectionsOrchestrator {
        let mut directions = DirectionsOrchestrator::new();
        assert_eq!(directions.set_start(Some(LatLng::new(0.0, 0.0))).unwrap(), None);
        assert_eq!(directions.set_destination(Some(destination())).unwrap(), None);
        directions
    }

    #[test]
    fn test_enable_issues_exactly_one_request() {
        let mut directions = ready();
        let request = directions.set_enabled(true).unwrap();
        assert_eq!(
            request.stops(),
            vec![LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)]
        );
        assert_eq!(directions.set_enabled(true), None);
        assert_eq!(directions.in_flight(), Some(&request));
    }

    #[test]
    fn test_no_request_without_both_ends() {
        let mut directions = DirectionsOrchestrator::new();
        assert_eq!(directions.set_enabled(true), None);
        assert_eq!(directions.set_destination(Some(destination())).unwrap(), None);
        assert!(directions.set_start(Some(LatLng::new(0.0, 0.0))).unwrap().is_some());
    }

    #[test]
    fn test_waypoint_change_reissues_in_order() {
        let mut directions = ready();
        let first = directions.set_enabled(true).unwrap();

        let mut waypoints = WaypointList::new();
        waypoints
            .add(NamedLocation::new("mid", LatLng::new(5.0, 5.0)))
            .unwrap();
        let second = directions.waypoints_changed(&waypoints).unwrap();

        assert!(second.generation > first.generation);
        assert_eq!(
            second.stops(),
            vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(5.0, 5.0),
                LatLng::new(10.0, 10.0)
            ]
        );
        // the superseded response is never applied
        assert_eq!(
            directions.resolve(first.generation, Ok(straight_route(&first.stops()))),
            RouteOutcome::Stale
        );
    }

    #[test]
    fn test_waypoints_tracked_while_disabled() {
        let mut directions = ready();
        let mut waypoints = WaypointList::new();
        waypoints
            .add(NamedLocation::new("mid", LatLng::new(5.0, 5.0)))
            .unwrap();
        assert_eq!(directions.waypoints_changed(&waypoints), None);

        let request = directions.set_enabled(true).unwrap();
        assert_eq!(request.waypoints, vec![LatLng::new(5.0, 5.0)]);
    }

    #[test]
    fn test_failure_keeps_last_good_route() {
        let mut directions = ready();
        let request = directions.set_enabled(true).unwrap();
        let applied = directions.resolve(request.generation, Ok(straight_route(&request.stops())));
        let RouteOutcome::Applied(good) = applied else {
            panic!("expected applied route");
        };

        let retry = directions
            .set_destination(Some(NamedLocation::new("Island", LatLng::new(12.0, 12.0))))
            .unwrap()
            .unwrap();
        let outcome = directions.resolve(retry.generation, Err(RouteError::NoRoute("water".into())));

        assert_eq!(outcome, RouteOutcome::Failed(RouteError::NoRoute("water".into())));
        assert!(Arc::ptr_eq(directions.active_route().unwrap(), &good));
        assert!(directions.last_failure().is_some());
    }

    #[test]
    fn test_disable_clears_route_and_invalidates() {
        let mut directions = ready();
        let request = directions.set_enabled(true).unwrap();
        directions.set_enabled(false);

        assert_eq!(
            directions.resolve(request.generation, Ok(straight_route(&request.stops()))),
            RouteOutcome::Stale
        );
        assert!(directions.active_route().is_none());
        assert!(directions.in_flight().is_none());
    }

    #[test]
    fn test_invalidated_request_resolves_stale() {
        let mut directions = ready();
        let request = directions.set_enabled(true).unwrap();
        directions.invalidate_in_flight();
        assert!(directions.in_flight().is_none());
        assert_eq!(
            directions.resolve(request.generation, Ok(straight_route(&request.stops()))),
            RouteOutcome::Stale
        );

        let fresh = directions.refresh().unwrap();
        assert!(fresh.generation > request.generation);
        assert!(matches!(
            directions.resolve(fresh.generation, Ok(straight_route(&fresh.stops()))),
            RouteOutcome::Applied(_)
        ));
        assert_eq!(DirectionsOrchestrator::new().refresh(), None);
    }

    #[test]
    fn test_removing_destination_drops_route() {
        let mut directions = ready();
        let request = directions.set_enabled(true).unwrap();
        directions.resolve(request.generation, Ok(straight_route(&request.stops())));
        assert!(directions.active_route().is_some());

        assert_eq!(directions.set_destination(None).unwrap(), None);
        assert!(directions.active_route().is_none());
    }

    #[test]
    fn test_invalid_input_rejected_before_request() {
        let mut directions = ready();
        directions.set_enabled(true);
        let before = directions.in_flight().cloned();

        assert!(matches!(
            directions.set_start(Some(LatLng::new(120.0, 0.0))),
            Err(MapError::InvalidCoordinates(_))
        ));
        assert_eq!(directions.in_flight().cloned(), before);
        assert_eq!(directions.start(), Some(LatLng::new(0.0, 0.0)));
    }
}
