use crate::core::config::ServiceConfig;
use crate::core::geo::LatLng;
use crate::core::http::HTTP_CLIENT;
use crate::routing::service::{RouteError, RouteLeg, RouteResult, RouteService};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[lng, lat]`
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
    #[serde(default)]
    summary: String,
}

/// Router backed by an OSRM HTTP endpoint
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    base_url: String,
    profile: String,
    user_agent: String,
    timeout: std::time::Duration,
}

impl OsrmRouter {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.router_url.trim_end_matches('/').to_string(),
            profile: config.routing_profile.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout(),
        }
    }

    fn route_url(&self, stops: &[LatLng]) -> String {
        let coordinates = stops
            .iter()
            .map(|stop| format!("{:.6},{:.6}", stop.lng, stop.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.base_url, self.profile, coordinates
        )
    }

    fn parse(body: &str) -> Result<RouteResult, RouteError> {
        let response: OsrmResponse =
            serde_json::from_str(body).map_err(|err| RouteError::Malformed(err.to_string()))?;

        let detail = || response.message.clone().unwrap_or_else(|| response.code.clone());
        match response.code.as_str() {
            "Ok" => {}
            "NoRoute" | "NoSegment" => return Err(RouteError::NoRoute(detail())),
            _ => return Err(RouteError::Malformed(detail())),
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::NoRoute("empty route list".into()))?;

        let geometry = route
            .geometry
            .coordinates
            .iter()
            .map(|[lng, lat]| LatLng::new(*lat, *lng))
            .collect();
        let legs = route
            .legs
            .into_iter()
            .map(|leg| RouteLeg {
                distance_meters: leg.distance,
                duration_seconds: leg.duration,
                summary: leg.summary,
            })
            .collect();

        Ok(RouteResult::new(geometry, route.distance, route.duration).with_legs(legs))
    }
}

#[async_trait]
impl RouteService for OsrmRouter {
    async fn route(&self, stops: &[LatLng]) -> Result<RouteResult, RouteError> {
        if stops.len() < 2 {
            return Err(RouteError::NoRoute(format!(
                "need at least two stops, got {}",
                stops.len()
            )));
        }

        let response = HTTP_CLIENT
            .get(self.route_url(stops))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| RouteError::Unreachable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RouteError::Unreachable(err.to_string()))?;

        // OSRM answers NoRoute with a 400 and a JSON body
        if status.is_server_error() {
            return Err(RouteError::Unreachable(format!("HTTP {}", status)));
        }
        Self::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let router = OsrmRouter::new(&ServiceConfig {
            router_url: "http://localhost:5000/".into(),
            routing_profile: "foot".into(),
            ..ServiceConfig::default()
        });
        let url = router.route_url(&[LatLng::new(23.8, 90.4), LatLng::new(22.3, 91.8)]);
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/foot/90.400000,23.800000;91.800000,22.300000?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 2450.5,
                "duration": 310.2,
                "geometry": {"type": "LineString", "coordinates": [[90.40, 23.80], [90.41, 23.81]]},
                "legs": [{"distance": 2450.5, "duration": 310.2, "summary": "Airport Road"}]
            }]
        }"#;
        let route = OsrmRouter::parse(body).unwrap();
        assert_eq!(route.geometry[0], LatLng::new(23.80, 90.40));
        assert_eq!(route.distance_meters, 2450.5);
        assert_eq!(route.legs.len(), 1);
        assert_eq!(route.legs[0].summary, "Airport Road");
    }

    #[test]
    fn test_parse_no_route() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        assert_eq!(
            OsrmRouter::parse(body),
            Err(RouteError::NoRoute("Impossible route between points".into()))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            OsrmRouter::parse("Bad Gateway"),
            Err(RouteError::Malformed(_))
        ));
    }
}
