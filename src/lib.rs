//! # roamance-map
//!
//! Interaction controller for an embeddable travel map.
//!
//! The crate owns everything between user intent and the drawing surface:
//! debounced place search, an ordered waypoint list, directions requests
//! through a routing service, fly-to camera transitions and the idle
//! auto-survey rotation. Pixels are left to the host, which receives
//! [`RenderCommand`]s through a [`RenderSurface`] and callbacks through
//! [`MapEvent`]s.

pub mod animation;
pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod routing;
pub mod runtime;
pub mod search;
pub mod tiles;
pub mod ui;
pub mod waypoints;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    builder::MapWidgetBuilder,
    config::{WidgetConfig, WidgetProfile},
    geo::{LatLng, LatLngBounds, NamedLocation},
    view::{MapViewController, MapViewState, RecenterOrigin},
};

pub use input::{events::MapEvent, handler::EventManager};

pub use layers::{
    manager::{MarkerDiff, MarkerSet},
    marker::{Marker, MarkerKey, MarkerKind, PopupContent},
};

pub use routing::{
    orchestrator::{DirectionsOrchestrator, RouteOutcome},
    osrm::OsrmRouter,
    service::{RouteError, RouteRequest, RouteResult, RouteService},
};

pub use search::{
    nominatim::NominatimGeocoder,
    service::{GeocodingService, SearchError},
    session::{SearchSession, SearchState, SearchStatus},
};

pub use ui::{
    surface::{RecordingSurface, RenderCommand, RenderSurface},
    widget::MapWidget,
};

pub use waypoints::{Waypoint, WaypointChange, WaypointId, WaypointList};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Unknown waypoint: {0}")]
    UnknownWaypoint(WaypointId),

    #[error("Index {index} out of range for {len} results")]
    InvalidIndex { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Install `env_logger` as the `log` backend; honours `RUST_LOG`
#[cfg(feature = "debug")]
pub fn init_logging() {
    if env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_err()
    {
        log::debug!("logger already initialized");
    }
}
