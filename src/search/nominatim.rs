use crate::core::config::ServiceConfig;
use crate::core::constants::MAX_SEARCH_RESULTS;
use crate::core::geo::{LatLng, NamedLocation};
use crate::core::http::HTTP_CLIENT;
use crate::search::service::{GeocodingService, SearchError};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Place {
    display_name: String,
    lat: String,
    lon: String,
}

/// Geocoder backed by an OpenStreetMap Nominatim instance
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    limit: usize,
    timeout: std::time::Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.geocoder_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            limit: MAX_SEARCH_RESULTS,
            timeout: config.request_timeout(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    fn parse(body: &str) -> Result<Vec<NamedLocation>, SearchError> {
        let places: Vec<Place> =
            serde_json::from_str(body).map_err(|err| SearchError::Malformed(err.to_string()))?;

        Ok(places
            .into_iter()
            .filter_map(|place| {
                let lat = place.lat.parse::<f64>().ok()?;
                let lng = place.lon.parse::<f64>().ok()?;
                let point = LatLng::checked(lat, lng).ok()?;
                Some(NamedLocation::new(place.display_name, point))
            })
            .collect())
    }
}

#[async_trait]
impl GeocodingService for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<NamedLocation>, SearchError> {
        let url = format!("{}/search", self.base_url);
        let limit = self.limit.to_string();

        let response = HTTP_CLIENT
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| SearchError::Unreachable(err.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(SearchError::Rejected(format!("HTTP {}", status)));
        } else if !status.is_success() {
            return Err(SearchError::Unreachable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Unreachable(err.to_string()))?;
        Self::parse(&body)
    }
}
