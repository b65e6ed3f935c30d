//! Widget builder for fluent configuration
//!
//! Anything not supplied falls back to the public OpenStreetMap services
//! named in [`ServiceConfig`](crate::core::config::ServiceConfig) and the
//! process-wide task spawner. Without the `tokio-runtime` feature the
//! process-wide spawner runs tasks inline, which the HTTP services cannot
//! use, so hosts must supply their own services or spawner.

use crate::{
    core::{
        config::{WidgetConfig, WidgetProfile},
        constants::FALLBACK_CENTER,
        geo::LatLng,
    },
    routing::{osrm::OsrmRouter, service::RouteService},
    runtime::{self, TaskSpawner},
    search::{nominatim::NominatimGeocoder, service::GeocodingService},
    tiles::{ColorScheme, TileStyle},
    ui::widget::MapWidget,
    Result,
};
use std::sync::Arc;

/// Builder for creating and configuring MapWidget instances
pub struct MapWidgetBuilder {
    profile: WidgetProfile,
    center: Option<LatLng>,
    tile_style: TileStyle,
    color_scheme: ColorScheme,
    geocoder: Option<Arc<dyn GeocodingService>>,
    router: Option<Arc<dyn RouteService>>,
    spawner: Option<Arc<dyn TaskSpawner>>,
}

impl MapWidgetBuilder {
    pub fn new() -> Self {
        Self {
            profile: WidgetProfile::default(),
            center: None,
            tile_style: TileStyle::default(),
            color_scheme: ColorScheme::default(),
            geocoder: None,
            router: None,
            spawner: None,
        }
    }

    /// Set the configuration profile
    pub fn with_profile(mut self, profile: WidgetProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.profile = WidgetProfile::Custom(config);
        self
    }

    /// Initial camera center; defaults to the fallback center
    pub fn with_center(mut self, center: LatLng) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_tile_style(mut self, style: TileStyle, scheme: ColorScheme) -> Self {
        self.tile_style = style;
        self.color_scheme = scheme;
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn GeocodingService>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_router(mut self, router: Arc<dyn RouteService>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Build the widget, validating the configuration
    pub fn build(self) -> Result<MapWidget> {
        let config = self.profile.resolve();
        config.validate()?;

        let center = self.center.unwrap_or(FALLBACK_CENTER);
        center.validate()?;

        #[cfg(not(feature = "tokio-runtime"))]
        if self.spawner.is_none() && (self.geocoder.is_none() || self.router.is_none()) {
            return Err(crate::MapError::Config(
                "HTTP services need a tokio runtime: enable `tokio-runtime` or supply a spawner"
                    .to_string(),
            ));
        }

        let geocoder = self.geocoder.unwrap_or_else(|| {
            Arc::new(
                NominatimGeocoder::new(&config.services).with_limit(config.search.max_results),
            )
        });
        let router = self
            .router
            .unwrap_or_else(|| Arc::new(OsrmRouter::new(&config.services)));
        let spawner = self.spawner.unwrap_or_else(runtime::runtime);

        Ok(MapWidget::from_parts(
            config,
            center,
            self.tile_style,
            self.color_scheme,
            geocoder,
            router,
            spawner,
        ))
    }
}

impl Default for MapWidgetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
