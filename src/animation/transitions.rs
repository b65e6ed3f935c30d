use crate::animation::interpolation::{EasingType, Interpolation};
use crate::core::geo::LatLng;
use instant::Instant;
use std::time::Duration;

/// State of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionState {
    Running,
    Completed,
    Cancelled,
}

/// One frame of a camera transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub center: LatLng,
    pub zoom: f64,
    pub progress: f64,
}

/// Smooth fly-to camera animation.
///
/// The zoom follows a shallow arc: it backs out while travelling and settles
/// on the target zoom, the further the hop the higher the arc.
#[derive(Debug, Clone)]
pub struct FlyTo {
    start_center: LatLng,
    start_zoom: f64,
    target_center: LatLng,
    target_zoom: f64,
    started_at: Instant,
    duration: Duration,
    easing: EasingType,
    arc_height: f64,
    state: TransitionState,
}

impl FlyTo {
    pub fn new(
        start_center: LatLng,
        start_zoom: f64,
        target_center: LatLng,
        target_zoom: f64,
        started_at: Instant,
        duration: Duration,
        easing: EasingType,
    ) -> Self {
        let distance_km = start_center.distance_to(&target_center) / 1000.0;
        let arc_height = if distance_km > 1.0 {
            distance_km.log10().clamp(0.0, 4.0)
        } else {
            0.0
        };

        Self {
            start_center,
            start_zoom,
            target_center,
            target_zoom,
            started_at,
            duration,
            easing,
            arc_height,
            state: TransitionState::Running,
        }
    }

    pub fn target(&self) -> (LatLng, f64) {
        (self.target_center, self.target_zoom)
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            TransitionState::Completed | TransitionState::Cancelled
        )
    }

    pub fn cancel(&mut self) {
        if self.state == TransitionState::Running {
            self.state = TransitionState::Cancelled;
        }
    }

    /// Get the progress (0.0 to 1.0) at `now`
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Sample the camera at `now`; completes the transition once progress hits 1
    pub fn sample(&mut self, now: Instant) -> CameraFrame {
        let progress = self.progress(now);
        if progress >= 1.0 {
            self.state = TransitionState::Completed;
            return CameraFrame {
                center: self.target_center,
                zoom: self.target_zoom,
                progress: 1.0,
            };
        }

        let eased = self.easing.apply(progress);
        let center = Interpolation::lat_lng(&self.start_center, &self.target_center, eased);
        // 4t(1-t) peaks at the midpoint and vanishes at both ends
        let arc = 4.0 * eased * (1.0 - eased) * self.arc_height;
        let zoom = Interpolation::linear(self.start_zoom, self.target_zoom, eased) - arc;

        CameraFrame {
            center,
            zoom,
            progress,
        }
    }
}
