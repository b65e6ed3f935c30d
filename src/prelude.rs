//! Prelude module for common roamance-map types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use roamance_map::prelude::*;`

pub use crate::core::{
    builder::MapWidgetBuilder,
    config::{CameraConfig, SearchConfig, ServiceConfig, SurveyConfig, WidgetConfig, WidgetProfile},
    geo::{LatLng, LatLngBounds, NamedLocation},
    view::{MapViewController, MapViewState, RecenterOrigin, SurveyState},
};

pub use crate::input::{EventManager, MapEvent};

pub use crate::layers::{Marker, MarkerKey, MarkerKind, PopupContent};

pub use crate::routing::{
    DirectionsOrchestrator, OsrmRouter, RouteError, RouteOutcome, RouteRequest, RouteResult,
    RouteService,
};

pub use crate::search::{GeocodingService, NominatimGeocoder, SearchError, SearchStatus};

pub use crate::runtime::{init_runtime, runtime, DeferredSpawner, InlineSpawner, TaskSpawner};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::TokioSpawner;

pub use crate::tiles::{ColorScheme, TileStyle};

pub use crate::ui::{MapWidget, RecordingSurface, RenderCommand, RenderSurface};

pub use crate::waypoints::{Waypoint, WaypointId, WaypointList};

pub use crate::{Error as MapError, Result};

pub use instant::Instant;

pub use std::{collections::VecDeque, sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
