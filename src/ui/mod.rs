pub mod surface;
pub mod widget;

pub use surface::{RecordingSurface, RenderCommand, RenderSurface};
pub use widget::MapWidget;
