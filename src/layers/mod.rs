pub mod manager;
pub mod marker;

pub use manager::{MarkerChange, MarkerDiff, MarkerSet};
pub use marker::{Marker, MarkerKey, MarkerKind, PopupContent};
