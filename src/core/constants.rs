//! Core constants derived from the travel map widget defaults.
//! Keeping them in a single place makes it easier to tweak widget-wide magic numbers.

use crate::core::geo::LatLng;

/// Zoom used when the map is first mounted.
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Zoom clamps for user-driven zoom changes.
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Center used when the host supplies no usable center (Saint Martin Island).
pub const FALLBACK_CENTER: LatLng = LatLng {
    lat: 20.6295,
    lng: 92.3208,
};

/// Keystroke quiet period before a search query is dispatched.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Upper bound on rendered search results.
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Recent queries kept in the search result cache.
pub const SEARCH_CACHE_CAPACITY: usize = 32;

/// Camera fly-to duration for selections.
pub const FLY_TO_DURATION_MS: u64 = 1000;

/// Auto-survey: delay after mount, tick interval and longitude step per tick.
pub const SURVEY_START_DELAY_MS: u64 = 2000;
pub const SURVEY_INTERVAL_MS: u64 = 100;
pub const SURVEY_STEP_DEGREES: f64 = 1.0;

/// Latitude held while surveying.
pub const SURVEY_LATITUDE: f64 = 25.0;
