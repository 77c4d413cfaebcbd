//! Stereo rendering core, independent of any graphics API.
//!
//! # Invariants
//! - Both eyes share one look direction; they differ only by a lateral
//!   offset along the camera's right axis and a mirrored frustum shift.
//! - A frame plan is a pure function of camera state, settings and time.
//! - Renderers read frame plans; they never mutate camera state.

mod camera;
mod frame;
mod frustum;
mod layout;
mod renderer;

pub use camera::{FlyCamera, PITCH_LIMIT_DEGREES};
pub use frame::{EyeFrame, StereoFrame};
pub use frustum::{Frustum, ProjectionParams};
pub use layout::{QuadVertex, SplitLayout};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "stereoview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
