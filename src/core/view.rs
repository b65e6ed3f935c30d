//! Camera, route and marker state observed by the rendering surface.
//!
//! [`MapViewController`] is the only writer of [`MapViewState`]. Every change
//! it makes is also queued as a [`RenderCommand`] so the host surface can be
//! brought up to date with [`MapViewController::drain_commands`].

use crate::animation::transitions::FlyTo;
use crate::core::config::{CameraConfig, SurveyConfig, WidgetConfig};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::core::timer::IntervalTimer;
use crate::layers::manager::{MarkerChange, MarkerDiff, MarkerSet};
use crate::layers::marker::{Marker, MarkerKey};
use crate::routing::service::RouteResult;
use crate::tiles::TileLayerSource;
use crate::ui::surface::RenderCommand;
use crate::Result;
use instant::Instant;
use std::sync::Arc;

/// Who asked for a camera move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecenterOrigin {
    /// Direct user action; suspends the auto-survey
    User,
    Programmatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyState {
    /// Never armed, or stopped on unmount
    Off,
    Armed,
    /// Stopped by a user recenter; only [`MapViewController::rearm_survey`] resumes it
    Suspended,
}

#[derive(Debug, Clone)]
pub struct MapViewState {
    pub center: LatLng,
    pub zoom: f64,
    /// Where a running fly-to will settle
    pub target: Option<(LatLng, f64)>,
    pub active_route: Option<Arc<RouteResult>>,
    pub markers: MarkerSet,
    pub tile_source: TileLayerSource,
    pub show_traffic: bool,
}

pub struct MapViewController {
    camera: CameraConfig,
    survey_config: SurveyConfig,
    state: MapViewState,
    transition: Option<FlyTo>,
    survey: SurveyState,
    survey_timer: IntervalTimer,
    outbox: Vec<RenderCommand>,
    view_changed: bool,
}

impl MapViewController {
    pub fn new(config: &WidgetConfig, center: LatLng, tile_source: TileLayerSource) -> Self {
        let zoom = config.camera.clamp_zoom(config.camera.initial_zoom);
        Self {
            camera: config.camera.clone(),
            survey_config: config.survey.clone(),
            state: MapViewState {
                center,
                zoom,
                target: None,
                active_route: None,
                markers: MarkerSet::new(),
                tile_source,
                show_traffic: false,
            },
            transition: None,
            survey: SurveyState::Off,
            survey_timer: IntervalTimer::new(config.survey.interval()),
            outbox: vec![
                RenderCommand::SetTileStyle(tile_source),
                RenderCommand::Recenter { center, zoom },
            ],
            view_changed: false,
        }
    }

    pub fn state(&self) -> &MapViewState {
        &self.state
    }

    pub fn center(&self) -> LatLng {
        self.state.center
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn survey_state(&self) -> SurveyState {
        self.survey
    }

    /// Move the camera to `point`; `zoom` of `None` keeps the current zoom
    pub fn recenter(
        &mut self,
        point: LatLng,
        zoom: Option<f64>,
        origin: RecenterOrigin,
        animated: bool,
        now: Instant,
    ) -> Result<()> {
        point.validate()?;
        let zoom = self.camera.clamp_zoom(zoom.unwrap_or_else(|| self.settled_zoom()));

        if origin == RecenterOrigin::User {
            self.suspend_survey();
        }
        if let Some(mut previous) = self.transition.take() {
            previous.cancel();
        }

        let duration = self.camera.fly_to_duration();
        if animated && !duration.is_zero() {
            log::debug!(
                "fly-to {:.4},{:.4} z{:.1} ({:?})",
                point.lat,
                point.lng,
                zoom,
                origin
            );
            self.transition = Some(FlyTo::new(
                self.state.center,
                self.state.zoom,
                point,
                zoom,
                now,
                duration,
                self.camera.fly_to_easing,
            ));
            self.state.target = Some((point, zoom));
        } else {
            self.state.target = None;
            self.set_camera(point, zoom);
        }
        Ok(())
    }

    pub fn zoom_in(&mut self, now: Instant) -> Result<()> {
        let zoom = self.settled_zoom() + self.camera.zoom_delta;
        self.recenter(self.settled_center(), Some(zoom), RecenterOrigin::User, false, now)
    }

    pub fn zoom_out(&mut self, now: Instant) -> Result<()> {
        let zoom = self.settled_zoom() - self.camera.zoom_delta;
        self.recenter(self.settled_center(), Some(zoom), RecenterOrigin::User, false, now)
    }

    /// Fly to the active route so all of it is in view
    pub fn fit_route(&mut self, now: Instant) -> Result<bool> {
        let Some(bounds) = self.state.active_route.as_ref().and_then(|route| route.bounds())
        else {
            return Ok(false);
        };
        let zoom = zoom_for_bounds(&bounds);
        self.recenter(
            bounds.center(),
            Some(zoom),
            RecenterOrigin::Programmatic,
            true,
            now,
        )?;
        Ok(true)
    }

    /// Replace the drawn route; returns false when nothing changed
    pub fn set_route(&mut self, route: Option<Arc<RouteResult>>) -> bool {
        let unchanged = match (&self.state.active_route, &route) {
            (None, None) => true,
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            _ => false,
        };
        if unchanged {
            return false;
        }

        match &route {
            Some(route) => log::debug!(
                "drawing route: {:.1} km, {} points",
                route.distance_km(),
                route.geometry.len()
            ),
            None => log::debug!("route cleared"),
        }
        self.state.active_route = route.clone();
        self.outbox.push(RenderCommand::SetRoute(route));
        true
    }

    /// Add or update one marker; re-adding an identical marker does nothing
    pub fn add_marker(&mut self, marker: Marker) -> bool {
        match self.state.markers.upsert(marker) {
            Some(MarkerChange::Added(marker)) => {
                self.outbox.push(RenderCommand::AddMarker(marker));
                true
            }
            Some(MarkerChange::Updated(marker)) => {
                self.outbox.push(RenderCommand::UpdateMarker(marker));
                true
            }
            None => false,
        }
    }

    pub fn remove_marker(&mut self, key: &MarkerKey) -> bool {
        if self.state.markers.remove(key).is_some() {
            self.outbox.push(RenderCommand::RemoveMarker(*key));
            true
        } else {
            false
        }
    }

    /// Make the marker layer match `desired` exactly
    pub fn sync_markers(&mut self, desired: &[Marker]) -> MarkerDiff {
        let diff = self.state.markers.reconcile(desired);
        if diff.is_empty() {
            return diff;
        }

        self.state.markers.apply(&diff);
        self.outbox
            .extend(diff.removed.iter().copied().map(RenderCommand::RemoveMarker));
        self.outbox
            .extend(diff.added.iter().cloned().map(RenderCommand::AddMarker));
        self.outbox
            .extend(diff.updated.iter().cloned().map(RenderCommand::UpdateMarker));
        diff
    }

    pub fn set_tile_source(&mut self, source: TileLayerSource) -> bool {
        if self.state.tile_source == source {
            return false;
        }
        self.state.tile_source = source;
        self.outbox.push(RenderCommand::SetTileStyle(source));
        true
    }

    pub fn set_traffic(&mut self, visible: bool) -> bool {
        if self.state.show_traffic == visible {
            return false;
        }
        log::debug!("traffic overlay {}", if visible { "on" } else { "off" });
        self.state.show_traffic = visible;
        self.outbox.push(RenderCommand::SetTrafficOverlay(visible));
        true
    }

    /// Start rotating after the configured start delay
    pub fn arm_survey(&mut self, now: Instant) {
        self.survey = SurveyState::Armed;
        self.survey_timer.start(now, self.survey_config.start_delay());
        log::debug!("survey armed");
    }

    /// Resume a suspended survey; the first step follows one interval later
    pub fn rearm_survey(&mut self, now: Instant) -> bool {
        if self.survey == SurveyState::Armed {
            return false;
        }
        self.survey = SurveyState::Armed;
        self.survey_timer.start(now, self.survey_config.interval());
        log::debug!("survey re-armed");
        true
    }

    pub fn suspend_survey(&mut self) {
        if self.survey == SurveyState::Armed {
            log::debug!("survey suspended");
            self.survey = SurveyState::Suspended;
            self.survey_timer.stop();
        }
    }

    pub fn stop_survey(&mut self) {
        self.survey = SurveyState::Off;
        self.survey_timer.stop();
    }

    /// Step the fly-to and the survey up to `now`
    pub fn advance(&mut self, now: Instant) {
        if let Some(transition) = self.transition.as_mut() {
            let frame = transition.sample(now);
            let finished = transition.is_finished();
            // the fly-to arc may back out past the zoom range
            let zoom = self.camera.clamp_zoom(frame.zoom);
            self.set_camera(frame.center, zoom);
            if finished {
                self.transition = None;
                self.state.target = None;
            }
        }

        if self.survey != SurveyState::Armed {
            return;
        }
        let ticks = self.survey_timer.due_ticks(now);
        // ticks that fall while a route is shown or the camera is flying are skipped
        if ticks == 0 || self.state.active_route.is_some() || self.transition.is_some() {
            return;
        }

        let step = self.survey_config.step_degrees * ticks as f64;
        let center = LatLng::new(
            self.survey_config.latitude,
            LatLng::wrap_lng(self.state.center.lng + step),
        );
        self.set_camera(center, self.state.zoom);
    }

    pub fn drain_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Camera position if it moved since the last call
    pub fn take_view_change(&mut self) -> Option<(LatLng, f64)> {
        if std::mem::take(&mut self.view_changed) {
            Some((self.state.center, self.state.zoom))
        } else {
            None
        }
    }

    fn settled_center(&self) -> LatLng {
        self.state.target.map_or(self.state.center, |(center, _)| center)
    }

    fn settled_zoom(&self) -> f64 {
        self.state.target.map_or(self.state.zoom, |(_, zoom)| zoom)
    }

    fn set_camera(&mut self, center: LatLng, zoom: f64) {
        if center == self.state.center && zoom == self.state.zoom {
            return;
        }
        self.state.center = center;
        self.state.zoom = zoom;
        self.view_changed = true;

        // only the latest camera position matters to the surface
        if let Some(RenderCommand::Recenter { .. }) = self.outbox.last() {
            self.outbox.pop();
        }
        self.outbox.push(RenderCommand::Recenter { center, zoom });
    }
}

/// Rough web-mercator zoom that fits `bounds` on a typical viewport
fn zoom_for_bounds(bounds: &LatLngBounds) -> f64 {
    let lat_span = bounds.lat_span().abs();
    let lng_span = bounds.lng_span();
    let span = lat_span.max(lng_span).max(1e-6);
    ((360.0 / span).log2() - 0.5).floor()
}
