//! Off-axis (asymmetric) perspective frusta for parallel-axis stereo.
//!
//! Both eyes look down the same axis; instead of toeing the cameras in,
//! each eye's frustum is shifted sideways at the near plane. This keeps the
//! image planes coplanar and avoids vertical parallax.

use glam::{Mat4, Vec4};
use serde::Serialize;
use stereoview_common::{Eye, EyeSide, ProjectionConfig};

/// Inputs for one eye's projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub half_separation: f32,
}

impl ProjectionParams {
    pub fn new(fov_y_degrees: f32, aspect: f32, projection: &ProjectionConfig) -> Self {
        Self {
            fov_y_degrees,
            aspect,
            near: projection.near,
            far: projection.far,
            half_separation: projection.half_separation,
        }
    }
}

/// Clip-plane bounds of a general perspective frustum, measured at the near plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Symmetric frustum, no eye shift.
    pub fn symmetric(params: &ProjectionParams) -> Self {
        Self::shifted(params, 0.0)
    }

    /// Frustum for one eye. The left eye is shifted by `+half_separation`,
    /// the right eye by `-half_separation`.
    ///
    /// Callers guarantee `near > 0`, `far > near`, `0 < fov < 180` and
    /// `aspect > 0`; violating that is a programming error.
    pub fn off_axis(side: EyeSide, params: &ProjectionParams) -> Self {
        let eye = match side {
            EyeSide::Left => Eye::left(params.half_separation),
            EyeSide::Right => Eye::right(params.half_separation),
        };
        Self::for_eye(&eye, params)
    }

    pub fn for_eye(eye: &Eye, params: &ProjectionParams) -> Self {
        Self::shifted(params, eye.frustum_shift())
    }

    fn shifted(params: &ProjectionParams, shift: f32) -> Self {
        debug_assert!(params.near > 0.0, "near plane must be positive");
        debug_assert!(params.far > params.near, "far plane must exceed near plane");
        debug_assert!(
            params.fov_y_degrees > 0.0 && params.fov_y_degrees < 180.0,
            "fov must lie in (0, 180) degrees"
        );
        debug_assert!(params.aspect > 0.0, "aspect ratio must be positive");

        let top = params.near * (params.fov_y_degrees.to_radians() / 2.0).tan();
        let half_width = params.aspect * top;
        Self {
            left: -half_width + shift,
            right: half_width + shift,
            bottom: -top,
            top,
            near: params.near,
            far: params.far,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Right-handed perspective matrix mapping depth to wgpu's [0, 1] range.
    pub fn to_matrix(&self) -> Mat4 {
        let Self {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;
        let depth = f / (n - f);
        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * n / (t - b), 0.0, 0.0),
            Vec4::new((r + l) / (r - l), (t + b) / (t - b), depth, -1.0),
            Vec4::new(0.0, 0.0, n * depth, 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const SEP: f32 = 0.0325;

    fn params(fov: f32, aspect: f32) -> ProjectionParams {
        ProjectionParams {
            fov_y_degrees: fov,
            aspect,
            near: 0.5,
            far: 100.0,
            half_separation: SEP,
        }
    }

    #[test]
    fn eyes_have_equal_width_and_mirror_offsets() {
        for aspect in [4.0 / 3.0, 16.0 / 9.0, 0.5, 1.0] {
            let p = params(45.0, aspect);
            let l = Frustum::off_axis(EyeSide::Left, &p);
            let r = Frustum::off_axis(EyeSide::Right, &p);
            assert!((l.width() - r.width()).abs() < 1e-6);
            let lhs = l.left + l.right;
            let rhs = r.left + r.right + 4.0 * SEP;
            assert!((lhs - rhs).abs() < 1e-6, "aspect {aspect}: {lhs} vs {rhs}");
            assert_eq!(l.top, r.top);
            assert_eq!(l.bottom, -l.top);
        }
    }

    #[test]
    fn left_eye_bounds_at_origin() {
        let aspect = 800.0 / 600.0;
        let p = params(45.0, aspect);
        let right0 = aspect * 0.5 * (45.0_f32.to_radians() / 2.0).tan();
        let l = Frustum::off_axis(EyeSide::Left, &p);
        assert!((l.left - (-right0 + SEP)).abs() < 1e-6);
        assert!((l.right - (right0 + SEP)).abs() < 1e-6);
    }

    #[test]
    fn symmetric_matches_glam_perspective() {
        let p = params(60.0, 1.5);
        let ours = Frustum::symmetric(&p).to_matrix();
        let glam = Mat4::perspective_rh(60.0_f32.to_radians(), 1.5, 0.5, 100.0);
        assert!(ours.abs_diff_eq(glam, 1e-5));
    }

    #[test]
    fn depth_maps_to_unit_range() {
        let f = Frustum::off_axis(EyeSide::Right, &params(45.0, 1.0));
        let m = f.to_matrix();
        let near = m.project_point3(Vec3::new(0.0, 0.0, -0.5));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn near_plane_edges_hit_clip_boundary() {
        let f = Frustum::off_axis(EyeSide::Left, &params(45.0, 4.0 / 3.0));
        let m = f.to_matrix();
        let left_edge = m.project_point3(Vec3::new(f.left, 0.0, -f.near));
        let right_edge = m.project_point3(Vec3::new(f.right, f.top, -f.near));
        assert!((left_edge.x + 1.0).abs() < 1e-5);
        assert!((right_edge.x - 1.0).abs() < 1e-5);
        assert!((right_edge.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn narrower_fov_shrinks_frustum() {
        let wide = Frustum::off_axis(EyeSide::Left, &params(45.0, 1.0));
        let narrow = Frustum::off_axis(EyeSide::Left, &params(10.0, 1.0));
        assert!(narrow.width() < wide.width());
        assert!(narrow.height() < wide.height());
    }
}
