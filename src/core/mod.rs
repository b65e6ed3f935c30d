pub mod builder;
pub mod config;
pub mod constants;
pub mod geo;
pub(crate) mod http;
pub mod timer;
pub mod view;

pub use builder::MapWidgetBuilder;
pub use config::{CameraConfig, SearchConfig, ServiceConfig, SurveyConfig, WidgetConfig, WidgetProfile};
pub use geo::{LatLng, LatLngBounds, NamedLocation};
pub use view::{MapViewController, MapViewState, RecenterOrigin, SurveyState};
