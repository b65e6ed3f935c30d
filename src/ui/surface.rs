use crate::core::geo::LatLng;
use crate::layers::marker::{Marker, MarkerKey};
use crate::routing::service::RouteResult;
use crate::tiles::TileLayerSource;
use std::sync::Arc;

/// Drawing instructions handed to the host's map surface
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Recenter { center: LatLng, zoom: f64 },
    /// `None` removes any drawn route
    SetRoute(Option<Arc<RouteResult>>),
    AddMarker(Marker),
    UpdateMarker(Marker),
    RemoveMarker(MarkerKey),
    SetTileStyle(TileLayerSource),
    /// Live traffic layer on top of the base tiles
    SetTrafficOverlay(bool),
}

impl RenderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Recenter { .. } => "recenter",
            Self::SetRoute(_) => "set_route",
            Self::AddMarker(_) => "add_marker",
            Self::UpdateMarker(_) => "update_marker",
            Self::RemoveMarker(_) => "remove_marker",
            Self::SetTileStyle(_) => "set_tile_style",
            Self::SetTrafficOverlay(_) => "set_traffic_overlay",
        }
    }
}

/// Anything that can draw the map: a Leaflet bridge, a native renderer, a test recorder
pub trait RenderSurface {
    fn apply(&mut self, command: RenderCommand);
}

/// Surface that keeps every command it receives
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<RenderCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Most recent camera position sent to the surface
    pub fn last_center(&self) -> Option<(LatLng, f64)> {
        self.commands.iter().rev().find_map(|command| match command {
            RenderCommand::Recenter { center, zoom } => Some((*center, *zoom)),
            _ => None,
        })
    }

    pub fn count(&self, name: &str) -> usize {
        self.commands
            .iter()
            .filter(|command| command.name() == name)
            .count()
    }
}

impl RenderSurface for RecordingSurface {
    fn apply(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }
}
