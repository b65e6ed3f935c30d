use crate::core::geo::LatLng;
use crate::routing::service::RouteResult;
use crate::search::session::SearchStatus;
use std::sync::Arc;

/// Events surfaced to the host application
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The widget is mounted and its first camera position is set
    MapReady,
    /// A route was calculated for the current stops
    RouteCalculated(Arc<RouteResult>),
    /// The latest route request failed; the previous route stays drawn
    RouteFailed { message: String },
    /// The user picked a search result
    LocationSelected { point: LatLng, name: String },
    /// Search session moved to a new status
    SearchUpdated { status: SearchStatus },
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
}

impl MapEvent {
    /// Name listeners register under
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::MapReady => "mapready",
            MapEvent::RouteCalculated(_) => "routecalculated",
            MapEvent::RouteFailed { .. } => "routefailed",
            MapEvent::LocationSelected { .. } => "locationselected",
            MapEvent::SearchUpdated { .. } => "searchupdated",
            MapEvent::ViewChanged { .. } => "viewchanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        assert_eq!(MapEvent::MapReady.event_type(), "mapready");
        assert_eq!(
            MapEvent::LocationSelected {
                point: LatLng::new(21.43, 92.0),
                name: "Cox's Bazar".into()
            }
            .event_type(),
            "locationselected"
        );
        assert_eq!(
            MapEvent::SearchUpdated {
                status: SearchStatus::Pending
            }
            .event_type(),
            "searchupdated"
        );
    }
}
