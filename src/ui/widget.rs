//! The map interaction controller a host embeds.
//!
//! `MapWidget` ties search, waypoints, directions and the view controller
//! together. Host input goes in through plain method calls, service calls are
//! spawned on the configured [`TaskSpawner`], and their completions are
//! picked up on the next [`MapWidget::update`].
//!
//! ```no_run
//! use roamance_map::prelude::*;
//!
//! # fn frame(surface: &mut RecordingSurface) -> roamance_map::Result<()> {
//! let mut widget = MapWidget::builder()
//!     .with_profile(WidgetProfile::Balanced)
//!     .build()?;
//! widget.on_route_calculated(|route| println!("{:.1} km", route.distance_km()));
//! widget.mount(Instant::now());
//!
//! widget.set_user_location(Some(LatLng::new(23.8103, 90.4125)))?;
//! widget.set_destination(Some(NamedLocation::checked("Sylhet", 24.8949, 91.8687)?))?;
//! widget.set_directions(true);
//!
//! widget.update(Instant::now());
//! widget.render(surface);
//! # Ok(())
//! # }
//! ```

use crate::core::builder::MapWidgetBuilder;
use crate::core::config::WidgetConfig;
use crate::core::geo::{LatLng, NamedLocation};
use crate::core::view::{MapViewController, MapViewState, RecenterOrigin};
use crate::input::{EventManager, MapEvent};
use crate::layers::marker::Marker;
use crate::routing::orchestrator::{DirectionsOrchestrator, RouteOutcome};
use crate::routing::service::{RouteError, RouteRequest, RouteResult, RouteService};
use crate::runtime::{Generation, TaskHandle, TaskSpawner};
use crate::search::service::{GeocodingService, SearchError};
use crate::search::session::{SearchSession, SearchState, SearchStatus, SearchTicket};
use crate::tiles::{ColorScheme, TileLayerSource, TileStyle};
use crate::ui::surface::RenderSurface;
use crate::waypoints::{Waypoint, WaypointId, WaypointList};
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use instant::Instant;
use std::sync::Arc;

/// Finished service call travelling back to the widget
enum Completion {
    Search {
        ticket: SearchTicket,
        outcome: std::result::Result<Vec<NamedLocation>, SearchError>,
    },
    Route {
        generation: Generation,
        outcome: std::result::Result<RouteResult, RouteError>,
    },
}

pub struct MapWidget {
    config: WidgetConfig,
    geocoder: Arc<dyn GeocodingService>,
    router: Arc<dyn RouteService>,
    spawner: Arc<dyn TaskSpawner>,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
    tasks: Vec<Box<dyn TaskHandle>>,
    search: SearchState,
    reported_search_status: SearchStatus,
    waypoints: WaypointList,
    directions: DirectionsOrchestrator,
    view: MapViewController,
    events: EventManager,
    user_location: Option<LatLng>,
    custom_start: Option<NamedLocation>,
    tile_style: TileStyle,
    color_scheme: ColorScheme,
    mounted: bool,
}

impl MapWidget {
    pub fn builder() -> MapWidgetBuilder {
        MapWidgetBuilder::new()
    }

    pub(crate) fn from_parts(
        config: WidgetConfig,
        center: LatLng,
        tile_style: TileStyle,
        color_scheme: ColorScheme,
        geocoder: Arc<dyn GeocodingService>,
        router: Arc<dyn RouteService>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        let (completion_tx, completion_rx) = unbounded();
        let view = MapViewController::new(
            &config,
            center,
            TileLayerSource::new(tile_style, color_scheme),
        );

        Self {
            search: SearchState::new(config.search.clone()),
            config,
            geocoder,
            router,
            spawner,
            completion_tx,
            completion_rx,
            tasks: Vec::new(),
            reported_search_status: SearchStatus::Idle,
            waypoints: WaypointList::new(),
            directions: DirectionsOrchestrator::new(),
            view,
            events: EventManager::new(),
            user_location: None,
            custom_start: None,
            tile_style,
            color_scheme,
            mounted: false,
        }
    }

    /// Attach to the host; announces `MapReady` and arms the survey if configured
    pub fn mount(&mut self, now: Instant) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        if self.config.survey.enabled {
            self.view.arm_survey(now);
        }
        self.refresh_markers();
        log::info!("map widget mounted");
        self.events.emit(MapEvent::MapReady);

        // requests abandoned on unmount, or held back while detached
        let request = self.directions.refresh();
        self.dispatch_route(request);
    }

    /// Detach from the host; outstanding responses are discarded
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.view.stop_survey();
        self.search.reset();
        self.directions.invalidate_in_flight();
        let dropped = self.completion_rx.try_iter().count();
        log::info!("map widget unmounted, {} completions dropped", dropped);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // ---- search ----

    /// Feed the search field; the geocoder is queried once typing settles
    pub fn set_search_query(&mut self, query: &str, now: Instant) {
        self.search.set_query(query, now);
        self.report_search_status();
    }

    /// Choose a search result: it becomes the destination and the camera flies there
    pub fn select_search_result(&mut self, index: usize, now: Instant) -> Result<NamedLocation> {
        let location = self.search.peek(index)?;
        self.set_destination(Some(location.clone()))?;
        self.search.select(index)?;
        self.view.recenter(
            location.point,
            Some(self.config.camera.selection_zoom),
            RecenterOrigin::User,
            true,
            now,
        )?;
        self.events.emit(MapEvent::LocationSelected {
            point: location.point,
            name: location.name.clone(),
        });
        Ok(location)
    }

    // ---- route inputs ----

    pub fn set_destination(&mut self, destination: Option<NamedLocation>) -> Result<()> {
        let request = self.directions.set_destination(destination)?;
        self.dispatch_route(request);
        self.sync_route();
        self.refresh_markers();
        Ok(())
    }

    pub fn set_user_location(&mut self, location: Option<LatLng>) -> Result<()> {
        if let Some(point) = &location {
            point.validate()?;
        }
        self.user_location = location;
        self.update_start()
    }

    /// Route from a chosen place instead of the user's location; `None` reverts
    pub fn set_custom_start(&mut self, start: Option<NamedLocation>) -> Result<()> {
        if let Some(location) = &start {
            location.point.validate()?;
        }
        self.custom_start = start;
        self.update_start()
    }

    pub fn set_directions(&mut self, enabled: bool) {
        let request = self.directions.set_enabled(enabled);
        self.dispatch_route(request);
        self.sync_route();
    }

    // ---- waypoints ----

    pub fn add_waypoint(&mut self, location: NamedLocation) -> Result<Waypoint> {
        let waypoint = self.waypoints.add(location)?;
        self.waypoints_updated();
        Ok(waypoint)
    }

    pub fn remove_waypoint(&mut self, id: WaypointId) -> Result<Waypoint> {
        let waypoint = self.waypoints.remove(id)?;
        self.waypoints_updated();
        Ok(waypoint)
    }

    pub fn reorder_waypoint(&mut self, id: WaypointId, new_index: usize) -> Result<()> {
        self.waypoints.reorder(id, new_index)?;
        self.waypoints_updated();
        Ok(())
    }

    pub fn clear_waypoints(&mut self) -> bool {
        let cleared = self.waypoints.clear();
        if cleared {
            self.waypoints_updated();
        }
        cleared
    }

    // ---- camera ----

    /// Fly back to the user's position; false when it is unknown
    pub fn recenter_on_user(&mut self, now: Instant) -> Result<bool> {
        let Some(point) = self.user_location else {
            return Ok(false);
        };
        self.view.recenter(
            point,
            Some(self.config.camera.initial_zoom),
            RecenterOrigin::User,
            true,
            now,
        )?;
        Ok(true)
    }

    /// Camera move reported by the host, e.g. after the user dragged the map
    pub fn user_moved_map(&mut self, center: LatLng, zoom: f64, now: Instant) -> Result<()> {
        self.view
            .recenter(center, Some(zoom), RecenterOrigin::User, false, now)
    }

    pub fn zoom_in(&mut self, now: Instant) -> Result<()> {
        self.view.zoom_in(now)
    }

    pub fn zoom_out(&mut self, now: Instant) -> Result<()> {
        self.view.zoom_out(now)
    }

    pub fn rearm_survey(&mut self, now: Instant) -> bool {
        self.view.rearm_survey(now)
    }

    pub fn set_tile_style(&mut self, style: TileStyle) {
        self.tile_style = style;
        self.view
            .set_tile_source(TileLayerSource::new(self.tile_style, self.color_scheme));
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
        self.view
            .set_tile_source(TileLayerSource::new(self.tile_style, self.color_scheme));
    }

    /// Show or hide the live traffic overlay
    pub fn set_traffic(&mut self, visible: bool) -> bool {
        self.view.set_traffic(visible)
    }

    // ---- frame ----

    /// Run timers, apply finished service calls and fire host callbacks
    pub fn update(&mut self, now: Instant) -> Vec<MapEvent> {
        if !self.mounted {
            return Vec::new();
        }

        if let Some(ticket) = self.search.poll(now) {
            self.dispatch_search(ticket);
        }

        while let Ok(completion) = self.completion_rx.try_recv() {
            match completion {
                Completion::Search { ticket, outcome } => {
                    self.search.resolve(&ticket, outcome);
                }
                Completion::Route {
                    generation,
                    outcome,
                } => self.apply_route(generation, outcome, now),
            }
        }
        self.report_search_status();

        self.view.advance(now);
        if let Some((center, zoom)) = self.view.take_view_change() {
            self.events.emit(MapEvent::ViewChanged { center, zoom });
        }

        self.refresh_markers();
        self.tasks.retain(|task| !task.is_finished());
        self.events.process_events()
    }

    /// Send everything that changed since the last call to the surface
    pub fn render(&mut self, surface: &mut dyn RenderSurface) -> usize {
        let commands = self.view.drain_commands();
        let count = commands.len();
        for command in commands {
            surface.apply(command);
        }
        count
    }

    // ---- callbacks ----

    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.events.on(event_type, callback);
    }

    pub fn on_route_calculated<F>(&mut self, callback: F)
    where
        F: Fn(&Arc<RouteResult>) + Send + Sync + 'static,
    {
        self.events.on_route_calculated(callback);
    }

    pub fn on_location_selected<F>(&mut self, callback: F)
    where
        F: Fn(LatLng, &str) + Send + Sync + 'static,
    {
        self.events.on_location_selected(callback);
    }

    pub fn on_map_ready<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events.on_map_ready(callback);
    }

    // ---- accessors ----

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn view_state(&self) -> &MapViewState {
        self.view.state()
    }

    pub fn view(&self) -> &MapViewController {
        &self.view
    }

    pub fn search_session(&self) -> &SearchSession {
        self.search.session()
    }

    pub fn waypoints(&self) -> &WaypointList {
        &self.waypoints
    }

    pub fn directions(&self) -> &DirectionsOrchestrator {
        &self.directions
    }

    pub fn active_route(&self) -> Option<&Arc<RouteResult>> {
        self.view.state().active_route.as_ref()
    }

    /// Last routing failure, cleared by the next successful route
    pub fn route_failure(&self) -> Option<&RouteError> {
        self.directions.last_failure()
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.user_location
    }

    pub fn custom_start(&self) -> Option<&NamedLocation> {
        self.custom_start.as_ref()
    }

    /// Service calls spawned but not yet known to be finished
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    // ---- internals ----

    fn update_start(&mut self) -> Result<()> {
        let start = self
            .custom_start
            .as_ref()
            .map(|location| location.point)
            .or(self.user_location);
        let request = self.directions.set_start(start)?;
        self.dispatch_route(request);
        self.sync_route();
        self.refresh_markers();
        Ok(())
    }

    fn waypoints_updated(&mut self) {
        for change in self.waypoints.drain_changes() {
            log::debug!("waypoints: {:?}", change);
        }
        let request = self.directions.waypoints_changed(&self.waypoints);
        self.dispatch_route(request);
        self.refresh_markers();
    }

    fn dispatch_search(&mut self, ticket: SearchTicket) {
        let geocoder = self.geocoder.clone();
        let tx = self.completion_tx.clone();
        let handle = self.spawner.spawn_boxed(Box::pin(async move {
            let outcome = geocoder.search(&ticket.query).await;
            if tx.send(Completion::Search { ticket, outcome }).is_err() {
                log::debug!("widget dropped before search completed");
            }
        }));
        self.tasks.push(handle);
    }

    fn dispatch_route(&mut self, request: Option<RouteRequest>) {
        let Some(request) = request else {
            return;
        };
        if !self.mounted {
            // re-issued by the next mount
            self.directions.invalidate_in_flight();
            return;
        }
        let router = self.router.clone();
        let tx = self.completion_tx.clone();
        let handle = self.spawner.spawn_boxed(Box::pin(async move {
            let stops = request.stops();
            let outcome = router.route(&stops).await;
            let completion = Completion::Route {
                generation: request.generation,
                outcome,
            };
            if tx.send(completion).is_err() {
                log::debug!("widget dropped before route completed");
            }
        }));
        self.tasks.push(handle);
    }

    fn apply_route(
        &mut self,
        generation: Generation,
        outcome: std::result::Result<RouteResult, RouteError>,
        now: Instant,
    ) {
        match self.directions.resolve(generation, outcome) {
            RouteOutcome::Applied(route) => {
                self.view.set_route(Some(route.clone()));
                if self.config.camera.follow_route {
                    if let Err(err) = self.view.fit_route(now) {
                        log::warn!("could not fit route into view: {}", err);
                    }
                }
                self.events.emit(MapEvent::RouteCalculated(route));
            }
            RouteOutcome::Failed(err) => {
                self.events.emit(MapEvent::RouteFailed {
                    message: err.user_message().to_string(),
                });
            }
            RouteOutcome::Stale => {}
        }
    }

    fn sync_route(&mut self) {
        self.view.set_route(self.directions.active_route().cloned());
    }

    fn report_search_status(&mut self) {
        let status = self.search.status();
        if status != self.reported_search_status {
            self.reported_search_status = status;
            self.events.emit(MapEvent::SearchUpdated { status });
        }
    }

    fn refresh_markers(&mut self) {
        let mut desired = Vec::new();

        if let Some(destination) = self.directions.destination() {
            desired.push(Marker::destination(destination));
        }
        if let Some(point) = self.user_location {
            desired.push(Marker::user_location(point));
        }
        if let Some(location) = &self.custom_start {
            desired.push(Marker::start_point(location));
        }
        desired.extend(self.waypoints.iter().map(|waypoint| Marker::waypoint(&waypoint)));

        let session = self.search.session();
        if let Some(generation) = session.generation {
            desired.extend(
                session
                    .results
                    .iter()
                    .enumerate()
                    .map(|(index, location)| Marker::search_result(generation, index, location)),
            );
        }

        let diff = self.view.sync_markers(&desired);
        if !diff.is_empty() {
            log::debug!(
                "markers: +{} ~{} -{}",
                diff.added.len(),
                diff.updated.len(),
                diff.removed.len()
            );
        }
    }
}
