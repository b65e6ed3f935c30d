use crate::core::geo::{LatLng, LatLngBounds};
use crate::runtime::Generation;
use async_trait::async_trait;
use geo::HaversineLength;
use serde::{Deserialize, Serialize};

/// Failure reported by a routing backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("no route found: {0}")]
    NoRoute(String),

    #[error("routing service unreachable: {0}")]
    Unreachable(String),

    #[error("malformed routing response: {0}")]
    Malformed(String),
}

impl RouteError {
    /// Message suitable for showing next to the map
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoRoute(_) => "No route could be found between these points",
            Self::Unreachable(_) | Self::Malformed(_) => "Could not calculate route",
        }
    }
}

/// Ordered stops for one routing attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub generation: Generation,
    pub start: LatLng,
    pub waypoints: Vec<LatLng>,
    pub destination: LatLng,
}

impl RouteRequest {
    /// Start, waypoints in order, destination
    pub fn stops(&self) -> Vec<LatLng> {
        let mut stops = Vec::with_capacity(self.waypoints.len() + 2);
        stops.push(self.start);
        stops.extend(self.waypoints.iter().copied());
        stops.push(self.destination);
        stops
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub geometry: Vec<LatLng>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

impl RouteResult {
    pub fn new(geometry: Vec<LatLng>, distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            geometry,
            distance_meters,
            duration_seconds,
            legs: Vec::new(),
        }
    }

    pub fn with_legs(mut self, legs: Vec<RouteLeg>) -> Self {
        self.legs = legs;
        self
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.geometry)
    }

    /// Great-circle length of the drawn polyline
    pub fn geometry_length_meters(&self) -> f64 {
        let line: geo::LineString<f64> = self
            .geometry
            .iter()
            .map(|point| geo_types::Point::from(*point))
            .collect();
        line.haversine_length()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}

/// Path calculation through an ordered list of stops
#[async_trait]
pub trait RouteService: Send + Sync {
    async fn route(&self, stops: &[LatLng]) -> Result<RouteResult, RouteError>;
}
