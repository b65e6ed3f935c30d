use crate::core::geo::{LatLng, NamedLocation};
use crate::runtime::Generation;
use crate::waypoints::{Waypoint, WaypointId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a positioned entity on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerKey {
    Destination,
    UserLocation,
    StartPoint,
    Waypoint(WaypointId),
    SearchResult(Generation, usize),
}

impl MarkerKey {
    pub fn kind(&self) -> MarkerKind {
        match self {
            Self::Destination => MarkerKind::Destination,
            Self::UserLocation => MarkerKind::UserLocation,
            Self::StartPoint => MarkerKind::StartPoint,
            Self::Waypoint(_) => MarkerKind::Waypoint,
            Self::SearchResult(..) => MarkerKind::SearchResult,
        }
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destination => write!(f, "destination"),
            Self::UserLocation => write!(f, "user-location"),
            Self::StartPoint => write!(f, "start-point"),
            Self::Waypoint(id) => write!(f, "{}", id),
            Self::SearchResult(generation, index) => {
                write!(f, "search-{}-{}", generation.0, index)
            }
        }
    }
}

/// Visual class of a marker; the surface picks icon and colour from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Destination,
    UserLocation,
    StartPoint,
    Waypoint,
    SearchResult,
}

/// Popup payload; the surface decides how to lay it out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub title: String,
    /// Empty when there is nothing to add below the title
    pub subtitle: String,
    pub coordinates: LatLng,
}

impl PopupContent {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, coordinates: LatLng) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            coordinates,
        }
    }

    /// Four-decimal `lat, lng` label, e.g. `23.8103, 90.4125`
    pub fn coordinates_label(&self) -> String {
        format!("{:.4}, {:.4}", self.coordinates.lat, self.coordinates.lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub key: MarkerKey,
    pub kind: MarkerKind,
    pub position: LatLng,
    pub popup: PopupContent,
}

impl Marker {
    pub fn new(key: MarkerKey, position: LatLng, popup: PopupContent) -> Self {
        Self {
            kind: key.kind(),
            key,
            position,
            popup,
        }
    }

    pub fn destination(location: &NamedLocation) -> Self {
        Self::new(
            MarkerKey::Destination,
            location.point,
            PopupContent::new(location.name.clone(), "Destination", location.point),
        )
    }

    pub fn user_location(point: LatLng) -> Self {
        Self::new(
            MarkerKey::UserLocation,
            point,
            PopupContent::new("Your location", "", point),
        )
    }

    pub fn start_point(location: &NamedLocation) -> Self {
        Self::new(
            MarkerKey::StartPoint,
            location.point,
            PopupContent::new("Starting point", location.name.clone(), location.point),
        )
    }

    pub fn waypoint(waypoint: &Waypoint) -> Self {
        Self::new(
            MarkerKey::Waypoint(waypoint.id),
            waypoint.point(),
            PopupContent::new(
                waypoint.location.name.clone(),
                format!("Stop {}", waypoint.index + 1),
                waypoint.point(),
            ),
        )
    }

    pub fn search_result(generation: Generation, index: usize, location: &NamedLocation) -> Self {
        Self::new(
            MarkerKey::SearchResult(generation, index),
            location.point,
            PopupContent::new(location.name.clone(), "Search result", location.point),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_key() {
        let marker = Marker::user_location(LatLng::new(23.81, 90.41));
        assert_eq!(marker.kind, MarkerKind::UserLocation);
        assert_eq!(marker.popup.coordinates, LatLng::new(23.81, 90.41));
        assert_eq!(marker.popup.coordinates_label(), "23.8100, 90.4100");
        assert_eq!(
            MarkerKey::SearchResult(Generation(3), 1).kind(),
            MarkerKind::SearchResult
        );
    }

    #[test]
    fn test_waypoint_marker_popup_names_stop() {
        let waypoint = Waypoint {
            id: WaypointId(7),
            location: NamedLocation::new("Srimangal", LatLng::new(24.3, 91.73)),
            index: 2,
        };
        let marker = Marker::waypoint(&waypoint);
        assert_eq!(marker.key, MarkerKey::Waypoint(WaypointId(7)));
        assert_eq!(marker.popup.title, "Srimangal");
        assert_eq!(marker.popup.subtitle, "Stop 3");
        assert_eq!(marker.key.to_string(), "wp-7");
    }

    #[test]
    fn test_start_point_popup_carries_place_name() {
        let start = NamedLocation::new("Sreemangal Rail Station", LatLng::new(24.3065, 91.7296));
        let marker = Marker::start_point(&start);
        assert_eq!(marker.key, MarkerKey::StartPoint);
        assert_eq!(marker.popup.title, "Starting point");
        assert_eq!(marker.popup.subtitle, "Sreemangal Rail Station");
        // exact position, not a rounded label
        assert_eq!(marker.popup.coordinates, start.point);
    }
}
