use crate::frame::StereoFrame;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer consumes a fully resolved frame plan and produces output. It
/// never touches camera or input state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one stereo frame.
    fn render(&self, frame: &StereoFrame) -> Self::Output;
}

/// Produces a human-readable dump of a frame plan.
///
/// Used by the CLI and by tests that exercise the render interface without
/// a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &StereoFrame) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Stereo frame (t={:.3}, instances={}) ===",
            frame.time,
            frame.model_matrices.len()
        );
        for eye in &frame.eyes {
            let f = &eye.frustum;
            let p = eye.eye_position;
            let _ = writeln!(
                out,
                "[{}] offset={:+.4} eye=({:.3}, {:.3}, {:.3})",
                eye.eye.side.label(),
                eye.eye.offset,
                p.x,
                p.y,
                p.z
            );
            let _ = writeln!(
                out,
                "  frustum l={:.5} r={:.5} b={:.5} t={:.5} n={:.3} f={:.3}",
                f.left, f.right, f.bottom, f.top, f.near, f.far
            );
        }
        for (i, model) in frame.model_matrices.iter().enumerate() {
            let t = model.w_axis;
            let _ = writeln!(out, "  instance {i}: ({:.2}, {:.2}, {:.2})", t.x, t.y, t.z);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlyCamera;
    use glam::Vec3;
    use stereoview_common::{LightConfig, ProjectionConfig};

    #[test]
    fn debug_renderer_lists_both_eyes() {
        let frame = StereoFrame::build(
            &FlyCamera::default(),
            &ProjectionConfig::default(),
            1.0,
            2.0,
            &[Vec3::new(1.0, 1.0, -7.0)],
            &LightConfig::default(),
        );
        let output = DebugTextRenderer::new().render(&frame);

        assert!(output.contains("t=2.000"));
        assert!(output.contains("[left] offset=-0.0325"));
        assert!(output.contains("[right] offset=+0.0325"));
        assert!(output.contains("instance 0: (1.00, 1.00, -7.00)"));
    }

    #[test]
    fn empty_scene_has_no_instances() {
        let frame = StereoFrame::build(
            &FlyCamera::default(),
            &ProjectionConfig::default(),
            1.0,
            0.0,
            &[],
            &LightConfig::default(),
        );
        let output = DebugTextRenderer::new().render(&frame);
        assert!(output.contains("instances=0"));
        assert!(!output.contains("instance 0"));
    }
}
