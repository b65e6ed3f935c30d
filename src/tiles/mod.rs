pub mod source;

pub use source::{ColorScheme, TileLayerSource, TileStyle};
