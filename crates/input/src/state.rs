use std::collections::HashSet;

/// Keys the viewer reacts to. Platform key codes are translated into these
/// by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    LeftCtrl,
    Escape,
    F1,
}

/// Snapshot of input gathered between two frames.
///
/// Mouse deltas follow screen conventions on x (right is positive) but are
/// flipped on y so that moving the mouse up yields a positive delta.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    held: HashSet<Key>,
    pressed: HashSet<Key>,
    mouse_delta: (f32, f32),
    scroll_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. A press that was not already held also counts
    /// as a one-shot press for this frame.
    pub fn key(&mut self, key: Key, down: bool) {
        if down {
            if self.held.insert(key) {
                self.pressed.insert(key);
            }
        } else {
            self.held.remove(&key);
        }
    }

    /// Accumulate raw mouse motion in window pixels (y grows downwards).
    pub fn mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 -= dy;
    }

    /// Accumulate vertical scroll in lines.
    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Drop per-frame deltas and one-shot presses; held keys persist.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.mouse_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    /// Forget everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.end_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut input = InputState::new();
        input.key(Key::W, true);
        assert!(input.is_held(Key::W));
        assert!(input.was_pressed(Key::W));
        input.end_frame();
        assert!(input.is_held(Key::W));
        assert!(!input.was_pressed(Key::W));
        input.key(Key::W, false);
        assert!(!input.is_held(Key::W));
    }

    #[test]
    fn key_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.key(Key::F1, true);
        input.end_frame();
        input.key(Key::F1, true);
        assert!(!input.was_pressed(Key::F1));
    }

    #[test]
    fn mouse_y_is_flipped_and_accumulated() {
        let mut input = InputState::new();
        input.mouse_motion(3.0, 4.0);
        input.mouse_motion(1.0, -10.0);
        assert_eq!(input.mouse_delta(), (4.0, 6.0));
        input.end_frame();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn release_all_clears_held() {
        let mut input = InputState::new();
        input.key(Key::A, true);
        input.scroll(2.0);
        input.release_all();
        assert!(!input.is_held(Key::A));
        assert_eq!(input.scroll_delta(), 0.0);
    }
}
