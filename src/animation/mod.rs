pub mod interpolation;
pub mod transitions;

// Re-export commonly used types and functions for convenience
pub use interpolation::{EasingType, Interpolation};
pub use transitions::{CameraFrame, FlyTo, TransitionState};
