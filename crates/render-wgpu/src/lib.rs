//! wgpu backend for stereo rendering.
//!
//! Each eye renders the scene (instanced model plus skybox) into its own
//! offscreen target; a compositor then draws the two images side by side.
//!
//! # Invariants
//! - Both eyes render from the same [`stereoview_render::StereoFrame`]; the
//!   backend never reads camera or input state.
//! - Eye targets are independent: each has its own color and depth images.
//! - Frusta are built from the eye target's aspect, not the window's.

mod compositor;
mod gpu;
mod model;
mod scene;
mod shaders;
mod skybox;
mod target;

pub use compositor::Compositor;
pub use gpu::{GpuError, StereoRenderer, request_device};
pub use model::GpuModel;
pub use scene::ScenePass;
pub use skybox::{GpuSkybox, SKYBOX_VERTICES};
pub use target::{EYE_COLOR_FORMAT, EYE_DEPTH_FORMAT, RenderTarget};
