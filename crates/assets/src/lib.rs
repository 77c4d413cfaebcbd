//! Asset loading: OBJ models with material textures, and skybox cubemaps.
//!
//! Everything here produces CPU-side data. GPU upload belongs to the render
//! backend.
//!
//! # Failure policy
//! - A model file that cannot be parsed is an error for the caller to handle.
//! - A material texture or a cubemap face that cannot be decoded is logged
//!   with its path and left empty; loading continues.

mod error;
mod model;
mod texture;

pub use error::AssetError;
pub use model::{MeshData, ModelData, ModelVertex};
pub use texture::{CubemapFaces, ImageData};

pub fn crate_info() -> &'static str {
    "stereoview-assets v0.1.0"
}
