//! Configuration system for widget behavior tuning
//!
//! This module provides a hierarchical configuration system that allows hosts
//! to configure the camera, search, auto-survey and routing services through
//! presets or custom configurations. Configurations are plain serde structs so
//! they can also be loaded from JSON.

use crate::animation::EasingType;
use crate::core::constants::*;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetProfile {
    /// Interactive journal map
    Balanced,
    /// Landing page showcase: slow survey rotation, long fly-to
    Showcase,
    /// Reduced motion: no camera animation, no survey
    ReducedMotion,
    Custom(WidgetConfig),
}

impl WidgetProfile {
    pub fn resolve(&self) -> WidgetConfig {
        match self {
            Self::Balanced => WidgetConfig::default(),
            Self::Showcase => WidgetConfig {
                camera: CameraConfig {
                    initial_zoom: 2.0,
                    fly_to_duration_ms: FLY_TO_DURATION_MS,
                    fly_to_easing: EasingType::Smooth,
                    ..CameraConfig::default()
                },
                survey: SurveyConfig {
                    enabled: true,
                    ..SurveyConfig::default()
                },
                ..WidgetConfig::default()
            },
            Self::ReducedMotion => WidgetConfig {
                camera: CameraConfig {
                    fly_to_duration_ms: 0,
                    fly_to_easing: EasingType::Linear,
                    ..CameraConfig::default()
                },
                survey: SurveyConfig {
                    enabled: false,
                    ..SurveyConfig::default()
                },
                ..WidgetConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for WidgetProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub camera: CameraConfig,
    pub search: SearchConfig,
    pub survey: SurveyConfig,
    pub services: ServiceConfig,
}

impl WidgetConfig {
    /// Parse a (possibly partial) JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WidgetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        if !(camera.min_zoom <= camera.initial_zoom && camera.initial_zoom <= camera.max_zoom) {
            return Err(MapError::Config(format!(
                "initial zoom {} outside [{}, {}]",
                camera.initial_zoom, camera.min_zoom, camera.max_zoom
            )));
        }
        if camera.zoom_delta <= 0.0 {
            return Err(MapError::Config("zoom_delta must be positive".into()));
        }
        if self.search.max_results == 0 {
            return Err(MapError::Config("search.max_results must be at least 1".into()));
        }
        if self.survey.interval_ms == 0 {
            return Err(MapError::Config("survey.interval_ms must be non-zero".into()));
        }
        if !(-90.0..=90.0).contains(&self.survey.latitude) {
            return Err(MapError::Config(format!(
                "survey latitude {} out of range",
                self.survey.latitude
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_delta: f64,
    pub fly_to_duration_ms: u64,
    pub fly_to_easing: EasingType,
    /// Zoom used when a search result is selected
    pub selection_zoom: f64,
    /// Recenter on the route once it has been calculated
    pub follow_route: bool,
}

impl CameraConfig {
    pub fn fly_to_duration(&self) -> Duration {
        Duration::from_millis(self.fly_to_duration_ms)
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_delta: DEFAULT_ZOOM_DELTA,
            fly_to_duration_ms: FLY_TO_DURATION_MS,
            fly_to_easing: EasingType::EaseInOut,
            selection_zoom: DEFAULT_ZOOM,
            follow_route: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub max_results: usize,
    /// Zero disables the result cache
    pub cache_capacity: usize,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: SEARCH_DEBOUNCE_MS,
            max_results: MAX_SEARCH_RESULTS,
            cache_capacity: SEARCH_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Arm the survey when the widget mounts
    pub enabled: bool,
    pub start_delay_ms: u64,
    pub interval_ms: u64,
    pub step_degrees: f64,
    pub latitude: f64,
}

impl SurveyConfig {
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_delay_ms: SURVEY_START_DELAY_MS,
            interval_ms: SURVEY_INTERVAL_MS,
            step_degrees: SURVEY_STEP_DEGREES,
            latitude: SURVEY_LATITUDE,
        }
    }
}

/// Endpoints for the bundled HTTP geocoder and router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub geocoder_url: String,
    pub router_url: String,
    /// OSRM routing profile (`driving`, `walking`, `cycling`)
    pub routing_profile: String,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            router_url: "https://router.project-osrm.org".to_string(),
            routing_profile: "driving".to_string(),
            request_timeout_ms: 10_000,
            user_agent: concat!("roamance-map/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_presets() {
        let balanced = WidgetProfile::Balanced.resolve();
        let showcase = WidgetProfile::Showcase.resolve();
        let reduced = WidgetProfile::ReducedMotion.resolve();

        assert_eq!(balanced.search.debounce_ms, 300);
        assert_eq!(balanced.camera.fly_to_duration_ms, 1000);
        assert!(!balanced.survey.enabled);

        assert!(showcase.survey.enabled);
        assert_eq!(showcase.survey.interval_ms, 100);
        assert_eq!(showcase.survey.step_degrees, 1.0);

        assert_eq!(reduced.camera.fly_to_duration(), Duration::ZERO);
        assert!(!reduced.survey.enabled);

        for config in [balanced, showcase, reduced] {
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config =
            WidgetConfig::from_json_str(r#"{ "search": { "debounce_ms": 150 } }"#).unwrap();
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.max_results, MAX_SEARCH_RESULTS);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = WidgetConfig::from_json_str(r#"{ "camera": { "initial_zoom": 42.0 } }"#);
        assert!(matches!(err, Err(MapError::Config(_))));

        let err = WidgetConfig::from_json_str(r#"{ "survey": { "interval_ms": 0 } }"#);
        assert!(matches!(err, Err(MapError::Config(_))));

        let err = WidgetConfig::from_json_str("not json");
        assert!(matches!(err, Err(MapError::Serialization(_))));
    }

    #[test]
    fn test_zoom_clamping() {
        let camera = CameraConfig::default();
        assert_eq!(camera.clamp_zoom(25.0), MAX_ZOOM);
        assert_eq!(camera.clamp_zoom(-3.0), MIN_ZOOM);
        assert_eq!(camera.clamp_zoom(7.5), 7.5);
    }
}
