use serde::{Deserialize, Serialize};

/// Which of the two viewpoints a render belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EyeSide {
    Left,
    Right,
}

impl EyeSide {
    /// Both sides in render order.
    pub const ALL: [EyeSide; 2] = [EyeSide::Left, EyeSide::Right];

    /// Index into per-eye arrays (left = 0, right = 1).
    pub fn index(self) -> usize {
        match self {
            EyeSide::Left => 0,
            EyeSide::Right => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EyeSide::Left => "left",
            EyeSide::Right => "right",
        }
    }
}

/// One eye of the stereo pair: its side plus a signed lateral offset.
///
/// The offset is measured along the camera's local right axis. The left eye
/// always carries the negative offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eye {
    pub side: EyeSide,
    pub offset: f32,
}

impl Eye {
    pub fn left(half_separation: f32) -> Self {
        Self {
            side: EyeSide::Left,
            offset: -half_separation.abs(),
        }
    }

    pub fn right(half_separation: f32) -> Self {
        Self {
            side: EyeSide::Right,
            offset: half_separation.abs(),
        }
    }

    /// Both eyes, left first. Offsets are equal in magnitude and opposite in sign.
    pub fn pair(half_separation: f32) -> [Eye; 2] {
        [Self::left(half_separation), Self::right(half_separation)]
    }

    /// Horizontal shift applied to this eye's frustum edges at the near plane.
    ///
    /// Opposite in sign to the eye offset: the left eye (offset < 0) shifts
    /// its frustum towards +x so both frusta converge on the shared axis.
    pub fn frustum_shift(&self) -> f32 {
        -self.offset
    }
}

/// Free-fly camera movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_pair_is_mirrored() {
        let [left, right] = Eye::pair(0.0325);
        assert_eq!(left.side, EyeSide::Left);
        assert_eq!(right.side, EyeSide::Right);
        assert_eq!(left.offset, -right.offset);
        assert!(left.offset < 0.0);
    }

    #[test]
    fn negative_separation_is_normalized() {
        let [left, right] = Eye::pair(-0.05);
        assert_eq!(left.offset, -0.05);
        assert_eq!(right.offset, 0.05);
    }

    #[test]
    fn frustum_shift_opposes_offset() {
        let [left, right] = Eye::pair(0.0325);
        assert_eq!(left.frustum_shift(), 0.0325);
        assert_eq!(right.frustum_shift(), -0.0325);
    }

    #[test]
    fn side_indices() {
        assert_eq!(EyeSide::Left.index(), 0);
        assert_eq!(EyeSide::Right.index(), 1);
        assert_eq!(EyeSide::Right.label(), "right");
    }
}
