pub mod orchestrator;
pub mod osrm;
pub mod service;

pub use orchestrator::{DirectionsOrchestrator, RouteOutcome};
pub use osrm::OsrmRouter;
pub use service::{RouteError, RouteLeg, RouteRequest, RouteResult, RouteService};
