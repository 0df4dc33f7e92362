use egui::{Event, Key, Vec2};

use crate::gfx::Camera;

use super::timestep::FIXED_UPDATE_TIMESTEP;

/// Input sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub ascend: bool,
    pub descend: bool,
    /// Right mouse button held.
    pub look_held: bool,
    /// Mouse motion this frame in screen pixels, +y pointing down.
    pub mouse_delta: Vec2,
    /// Whether the pointer is over the 3D scene rather than the settings panel.
    pub scene_hovered: bool,
    pub close_requested: bool,
}

impl InputFrame {
    /// Movement keys are ignored while a text field in the overlay has keyboard focus.
    pub fn from_egui(i: &egui::InputState, keyboard_free: bool, scene_hovered: bool) -> Self {
        let key = |key: Key| keyboard_free && i.key_down(key);

        // Raw motion keeps arriving while the cursor is locked, the pointer position does not.
        let raw_delta = i
            .events
            .iter()
            .filter_map(|event| match event {
                Event::MouseMoved(delta) => Some(*delta),
                _ => None,
            })
            .fold(Vec2::ZERO, |acc, delta| acc + delta);
        let mouse_delta = if raw_delta != Vec2::ZERO {
            raw_delta
        } else {
            i.pointer.delta()
        };

        Self {
            forward: key(Key::W),
            backward: key(Key::S),
            left: key(Key::A),
            right: key(Key::D),
            ascend: key(Key::Space),
            // egui merges both Ctrl keys into one modifier
            descend: keyboard_free && i.modifiers.ctrl,
            look_held: i.pointer.secondary_down(),
            mouse_delta,
            scene_hovered,
            close_requested: i.key_pressed(Key::Escape),
        }
    }
}

/// What the window should do with the cursor after this frame's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorChange {
    /// Hide and lock the cursor for mouselook.
    Capture,
    Release,
}

/// Input state that lives across frames. Owned by the application and passed in explicitly.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    looking: bool,
}

impl InputState {
    /// Moves the camera for the held keys and applies mouselook while the right button is held.
    pub fn apply(&mut self, frame: &InputFrame, camera: &mut Camera) -> Option<CursorChange> {
        let dt = FIXED_UPDATE_TIMESTEP;
        if frame.forward {
            camera.move_forward(dt);
        }
        if frame.backward {
            camera.move_backward(dt);
        }
        if frame.left {
            camera.strafe_left(dt);
        }
        if frame.right {
            camera.strafe_right(dt);
        }
        if frame.ascend {
            camera.ascend(dt);
        }
        if frame.descend {
            camera.descend(dt);
        }

        match (self.looking, frame.look_held) {
            (false, true) if frame.scene_hovered => {
                // Whatever moved the mouse before the press is not a look offset.
                self.looking = true;
                Some(CursorChange::Capture)
            }
            (true, true) => {
                // Screen y grows downwards, pitch grows upwards.
                camera.look(frame.mouse_delta.x, -frame.mouse_delta.y);
                None
            }
            (true, false) => {
                self.looking = false;
                Some(CursorChange::Release)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{SENSITIVITY, SPEED};
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    fn camera() -> Camera {
        Camera::new(Vec3::ZERO, 0.0, 0.0)
    }

    #[test]
    fn forward_key_moves_one_fixed_step() {
        let mut cam = camera();
        let frame = InputFrame {
            forward: true,
            ..Default::default()
        };
        InputState::default().apply(&frame, &mut cam);
        assert!(cam
            .position()
            .abs_diff_eq(Vec3::X * SPEED * FIXED_UPDATE_TIMESTEP, 1e-6));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut cam = camera();
        let frame = InputFrame {
            forward: true,
            backward: true,
            left: true,
            right: true,
            ascend: true,
            descend: true,
            ..Default::default()
        };
        InputState::default().apply(&frame, &mut cam);
        assert!(cam.position().abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn mouselook_captures_then_turns_then_releases() {
        let mut cam = camera();
        let mut input = InputState::default();
        let mut frame = InputFrame {
            look_held: true,
            scene_hovered: true,
            mouse_delta: Vec2::new(40.0, -20.0),
            ..Default::default()
        };

        // The press itself does not turn the camera.
        assert_eq!(input.apply(&frame, &mut cam), Some(CursorChange::Capture));
        assert_eq!(cam.yaw(), 0.0);
        assert!(input.looking);

        assert_eq!(input.apply(&frame, &mut cam), None);
        assert_abs_diff_eq!(cam.yaw(), 40.0 * SENSITIVITY);
        // Moving the mouse up looks up.
        assert_abs_diff_eq!(cam.pitch(), 20.0 * SENSITIVITY);

        frame.look_held = false;
        assert_eq!(input.apply(&frame, &mut cam), Some(CursorChange::Release));
        assert!(!input.looking);
        assert_abs_diff_eq!(cam.yaw(), 40.0 * SENSITIVITY);
    }

    #[test]
    fn look_does_not_start_over_the_panel() {
        let mut cam = camera();
        let mut input = InputState::default();
        let frame = InputFrame {
            look_held: true,
            scene_hovered: false,
            mouse_delta: Vec2::new(5.0, 5.0),
            ..Default::default()
        };
        assert_eq!(input.apply(&frame, &mut cam), None);
        assert_eq!(input.apply(&frame, &mut cam), None);
        assert_eq!(cam, camera());
    }

    #[test]
    fn released_mouse_does_not_turn() {
        let mut cam = camera();
        let frame = InputFrame {
            mouse_delta: Vec2::new(300.0, 300.0),
            scene_hovered: true,
            ..Default::default()
        };
        assert_eq!(InputState::default().apply(&frame, &mut cam), None);
        assert_eq!(cam, camera());
    }

    #[test]
    fn sampling_respects_keyboard_focus() {
        let mut i = egui::InputState::default();
        i.keys_down.insert(Key::W);
        i.modifiers.ctrl = true;

        let frame = InputFrame::from_egui(&i, true, true);
        assert!(frame.forward);
        assert!(frame.descend);
        assert!(!frame.backward && !frame.ascend);

        // A focused text field in the overlay owns the keyboard.
        let frame = InputFrame::from_egui(&i, false, true);
        assert!(!frame.forward);
        assert!(!frame.descend);
    }
}
