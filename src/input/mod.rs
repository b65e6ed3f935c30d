pub mod events;
pub mod handler;

pub use events::MapEvent;
pub use handler::{EventCallback, EventManager};
