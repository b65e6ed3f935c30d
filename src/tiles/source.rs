use serde::{Deserialize, Serialize};

/// Base map imagery offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileStyle {
    #[default]
    Standard,
    Satellite,
    Terrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl TileStyle {
    pub const ALL: [TileStyle; 3] = [Self::Standard, Self::Satellite, Self::Terrain];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Satellite => "Satellite",
            Self::Terrain => "Terrain",
        }
    }

    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub fn url_template(&self, scheme: ColorScheme) -> &'static str {
        match (self, scheme) {
            (Self::Standard, ColorScheme::Light) => {
                "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"
            }
            (Self::Standard, ColorScheme::Dark) => {
                "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png"
            }
            (Self::Satellite, _) => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            (Self::Terrain, ColorScheme::Light) => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
            (Self::Terrain, ColorScheme::Dark) => {
                "https://{s}.basemaps.cartocdn.com/dark_nolabels/{z}/{x}/{y}.png"
            }
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::Standard => "© OpenStreetMap contributors",
            Self::Satellite => "Tiles © Esri",
            Self::Terrain => "© OpenStreetMap contributors, SRTM | © OpenTopoMap",
        }
    }
}

/// A tile style resolved for one colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayerSource {
    pub style: TileStyle,
    pub scheme: ColorScheme,
}

impl TileLayerSource {
    const SUBDOMAINS: [&'static str; 3] = ["a", "b", "c"];

    pub fn new(style: TileStyle, scheme: ColorScheme) -> Self {
        Self { style, scheme }
    }

    pub fn url_template(&self) -> &'static str {
        self.style.url_template(self.scheme)
    }

    /// Concrete URL for one tile, spreading requests over subdomains
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        let sub = Self::SUBDOMAINS[((x + y) % Self::SUBDOMAINS.len() as u32) as usize];
        self.url_template()
            .replace("{s}", sub)
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}
