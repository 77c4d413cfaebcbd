use crate::camera::FlyCamera;
use crate::frustum::{Frustum, ProjectionParams};
use glam::{Mat4, Vec3};
use stereoview_common::{Eye, LightConfig, ProjectionConfig};

/// Everything one eye's scene pass needs, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeFrame {
    pub eye: Eye,
    pub frustum: Frustum,
    pub projection: Mat4,
    /// Full view including the eye's lateral offset.
    pub view: Mat4,
    /// Rotation-only view for the skybox.
    pub skybox_view: Mat4,
    pub eye_position: Vec3,
}

/// A renderer-agnostic description of one stereo frame.
///
/// Built from camera state, projection settings and time only, so building
/// it twice from the same inputs yields identical plans.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoFrame {
    /// Left eye first.
    pub eyes: [EyeFrame; 2],
    /// Translation-only model matrices, one per placement, shared by both eyes.
    pub model_matrices: Vec<Mat4>,
    pub light: LightConfig,
    /// Seconds since start; drives vertex animation.
    pub time: f32,
}

impl StereoFrame {
    pub fn build(
        camera: &FlyCamera,
        projection: &ProjectionConfig,
        aspect: f32,
        time: f32,
        placements: &[Vec3],
        light: &LightConfig,
    ) -> Self {
        let params = ProjectionParams::new(camera.zoom(), aspect, projection);
        let skybox_view = camera.skybox_view();

        let eyes = Eye::pair(projection.half_separation).map(|eye| {
            let frustum = Frustum::for_eye(&eye, &params);
            EyeFrame {
                eye,
                frustum,
                projection: frustum.to_matrix(),
                view: camera.view_matrix(eye.offset),
                skybox_view,
                eye_position: camera.eye_position(eye.offset),
            }
        });

        let model_matrices = placements
            .iter()
            .map(|offset| Mat4::from_translation(*offset))
            .collect();

        tracing::trace!(time, fov = camera.zoom(), aspect, "built stereo frame");
        Self {
            eyes,
            model_matrices,
            light: *light,
            time,
        }
    }

    pub fn left(&self) -> &EyeFrame {
        &self.eyes[0]
    }

    pub fn right(&self) -> &EyeFrame {
        &self.eyes[1]
    }
}
