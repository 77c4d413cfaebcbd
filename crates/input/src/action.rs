use crate::state::{InputState, Key};
use stereoview_common::CameraMovement;

/// A high-level intent produced from one frame of input.
///
/// The frame driver consumes actions, never raw input events, so the
/// camera can be driven the same way from tests and from the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// End the render loop before drawing the current frame.
    Quit,
    /// Move the camera in a direction for `dt` seconds.
    Move(CameraMovement, f32),
    /// Rotate the camera by a mouse delta (y up-positive).
    Look { dx: f32, dy: f32 },
    /// Change the field of view by a scroll delta.
    Zoom(f32),
    /// Show or hide the on-screen statistics overlay.
    ToggleHud,
}

const MOVEMENT_KEYS: [(Key, CameraMovement); 6] = [
    (Key::W, CameraMovement::Forward),
    (Key::S, CameraMovement::Backward),
    (Key::A, CameraMovement::Left),
    (Key::D, CameraMovement::Right),
    (Key::Space, CameraMovement::Up),
    (Key::LeftCtrl, CameraMovement::Down),
];

/// Translate the current input snapshot into actions for this frame.
pub fn map_actions(input: &InputState, dt: f32) -> Vec<Action> {
    let mut actions = Vec::new();

    if input.is_held(Key::Escape) {
        actions.push(Action::Quit);
    }

    for (key, movement) in MOVEMENT_KEYS {
        if input.is_held(key) {
            actions.push(Action::Move(movement, dt));
        }
    }

    let (dx, dy) = input.mouse_delta();
    if dx != 0.0 || dy != 0.0 {
        actions.push(Action::Look { dx, dy });
    }

    let scroll = input.scroll_delta();
    if scroll != 0.0 {
        actions.push(Action::Zoom(scroll));
    }

    if input.was_pressed(Key::F1) {
        actions.push(Action::ToggleHud);
    }

    if !actions.is_empty() {
        tracing::trace!(count = actions.len(), "mapped input actions");
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_input_maps_to_nothing() {
        let input = InputState::new();
        assert!(map_actions(&input, 0.016).is_empty());
    }

    #[test]
    fn held_keys_map_to_moves() {
        let mut input = InputState::new();
        input.key(Key::W, true);
        input.key(Key::D, true);
        let actions = map_actions(&input, 0.5);
        assert_eq!(
            actions,
            vec![
                Action::Move(CameraMovement::Forward, 0.5),
                Action::Move(CameraMovement::Right, 0.5),
            ]
        );
    }

    #[test]
    fn escape_quits_first() {
        let mut input = InputState::new();
        input.key(Key::S, true);
        input.key(Key::Escape, true);
        let actions = map_actions(&input, 0.1);
        assert_eq!(actions[0], Action::Quit);
    }

    #[test]
    fn mouse_and_scroll() {
        let mut input = InputState::new();
        input.mouse_motion(10.0, 5.0);
        input.scroll(-1.0);
        let actions = map_actions(&input, 0.1);
        assert!(actions.contains(&Action::Look { dx: 10.0, dy: -5.0 }));
        assert!(actions.contains(&Action::Zoom(-1.0)));
    }

    #[test]
    fn hud_toggle_fires_once_per_press() {
        let mut input = InputState::new();
        input.key(Key::F1, true);
        assert!(map_actions(&input, 0.1).contains(&Action::ToggleHud));
        input.end_frame();
        assert!(!map_actions(&input, 0.1).contains(&Action::ToggleHud));
    }
}
