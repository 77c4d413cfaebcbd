//! Side-by-side split of the window into two eye viewports.
//!
//! The window is `W x H`; each eye renders into a `W/2 x H` target and the
//! compositor stretches each target over its half of the screen.

use bytemuck::{Pod, Zeroable};
use stereoview_common::EyeSide;

/// Vertex of a compositor quad: clip-space position and texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Window dimensions and the per-eye sizes derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLayout {
    pub window_width: u32,
    pub window_height: u32,
}

impl SplitLayout {
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
        }
    }

    /// Size of one eye's render target, never smaller than 1x1.
    pub fn eye_size(&self) -> (u32, u32) {
        ((self.window_width / 2).max(1), self.window_height.max(1))
    }

    /// Aspect ratio of one eye's viewport; feeds the frustum builder.
    pub fn eye_aspect(&self) -> f32 {
        let (w, h) = self.eye_size();
        w as f32 / h as f32
    }

    /// Two triangles covering this eye's half of clip space.
    ///
    /// Texture coordinates span the full target with v = 0 at the top edge.
    pub fn quad(side: EyeSide) -> [QuadVertex; 6] {
        let (x0, x1) = match side {
            EyeSide::Left => (-1.0, 0.0),
            EyeSide::Right => (0.0, 1.0),
        };
        let v = |x: f32, y: f32, u: f32, v: f32| QuadVertex {
            position: [x, y],
            uv: [u, v],
        };
        [
            v(x0, 1.0, 0.0, 0.0),
            v(x0, -1.0, 0.0, 1.0),
            v(x1, -1.0, 1.0, 1.0),
            v(x0, 1.0, 0.0, 0.0),
            v(x1, -1.0, 1.0, 1.0),
            v(x1, 1.0, 1.0, 0.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_size_is_half_width() {
        let layout = SplitLayout::new(1600, 600);
        assert_eq!(layout.eye_size(), (800, 600));
        assert!((layout.eye_aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_window_clamps_to_one_pixel() {
        let layout = SplitLayout::new(1, 0);
        assert_eq!(layout.eye_size(), (1, 1));
        assert_eq!(layout.eye_aspect(), 1.0);
    }

    #[test]
    fn quads_cover_their_halves() {
        let left = SplitLayout::quad(EyeSide::Left);
        let right = SplitLayout::quad(EyeSide::Right);
        assert!(left.iter().all(|v| v.position[0] <= 0.0));
        assert!(right.iter().all(|v| v.position[0] >= 0.0));
        for quad in [left, right] {
            let min_u = quad.iter().map(|v| v.uv[0]).fold(f32::MAX, f32::min);
            let max_u = quad.iter().map(|v| v.uv[0]).fold(f32::MIN, f32::max);
            let min_v = quad.iter().map(|v| v.uv[1]).fold(f32::MAX, f32::min);
            let max_v = quad.iter().map(|v| v.uv[1]).fold(f32::MIN, f32::max);
            assert_eq!((min_u, max_u, min_v, max_v), (0.0, 1.0, 0.0, 1.0));
        }
    }

    #[test]
    fn top_edge_samples_top_row() {
        for side in [EyeSide::Left, EyeSide::Right] {
            for vertex in SplitLayout::quad(side) {
                let expected_v = if vertex.position[1] > 0.0 { 0.0 } else { 1.0 };
                assert_eq!(vertex.uv[1], expected_v);
            }
        }
    }
}
