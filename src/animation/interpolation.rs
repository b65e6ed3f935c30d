use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Easing curves available to camera transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingType {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Smooth,
}

impl EasingType {
    /// Apply easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::EaseIn => t * t * t,
            EasingType::EaseOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            EasingType::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            // Smooth step (3t^2 - 2t^3)
            EasingType::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

impl Default for EasingType {
    fn default() -> Self {
        Self::EaseInOut
    }
}

/// Linear interpolation helpers
pub struct Interpolation;

impl Interpolation {
    pub fn linear(start: f64, end: f64, t: f64) -> f64 {
        start + (end - start) * t
    }

    /// Interpolates along the shorter way around the antimeridian
    pub fn lat_lng(start: &LatLng, end: &LatLng, t: f64) -> LatLng {
        let mut delta_lng = end.lng - start.lng;
        if delta_lng > 180.0 {
            delta_lng -= 360.0;
        } else if delta_lng < -180.0 {
            delta_lng += 360.0;
        }

        LatLng::new(
            Self::linear(start.lat, end.lat, t),
            LatLng::wrap_lng(start.lng + delta_lng * t),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingType::Linear,
            EasingType::EaseIn,
            EasingType::EaseOut,
            EasingType::EaseInOut,
            EasingType::Smooth,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-9, "{:?}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{:?}", easing);
        }
        assert_eq!(EasingType::EaseInOut.apply(0.5), 0.5);
        assert_eq!(EasingType::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_lat_lng_takes_short_way_round() {
        let start = LatLng::new(0.0, 170.0);
        let end = LatLng::new(10.0, -170.0);
        let mid = Interpolation::lat_lng(&start, &end, 0.5);
        assert!((mid.lat - 5.0).abs() < 1e-9);
        assert!((mid.lng.abs() - 180.0).abs() < 1e-9);
    }
}
