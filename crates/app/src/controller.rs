use glam::Vec2;
use orrery_common::Time;
use orrery_input::{Key, Keyboard, Mouse, MouseButton};
use orrery_render::Camera;

const DEFAULT_SPEED: f32 = 10.0;
const DEFAULT_SENSITIVITY: f32 = 0.05;
const YAW_SCALE: f32 = 0.022;
const PITCH_SCALE: f32 = -0.022;

/// Fly-camera controls: W/S forward and back, A/D strafe, Q/E down and up,
/// left-drag to look around.
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    speed: f32,
    sensitivity: f32,
    yaw: f32,
    pitch: f32,
    mouse_position: Vec2,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            yaw: YAW_SCALE,
            pitch: PITCH_SCALE,
            mouse_position: Vec2::ZERO,
        }
    }

    /// Applies this frame's input to `camera` and rebuilds its matrices.
    pub fn update(&mut self, camera: &mut Camera, keyboard: &Keyboard, mouse: &Mouse, dt: Time) {
        let step = self.speed * dt.as_seconds();
        if keyboard.key_down(Key::W) {
            camera.move_z(-step);
        }
        if keyboard.key_down(Key::S) {
            camera.move_z(step);
        }
        if keyboard.key_down(Key::A) {
            camera.move_x(-step);
        }
        if keyboard.key_down(Key::D) {
            camera.move_x(step);
        }
        if keyboard.key_down(Key::Q) {
            camera.move_y(-step);
        }
        if keyboard.key_down(Key::E) {
            camera.move_y(step);
        }

        let position = Vec2::new(mouse.x() as f32, mouse.y() as f32);
        let delta = position - self.mouse_position;
        if mouse.button_down(MouseButton::LEFT) {
            camera.rotate_x(delta.y * self.sensitivity * self.pitch);
            camera.rotate_y(delta.x * self.sensitivity * self.yaw);
        }

        self.mouse_position = position;
        camera.update();
    }

    /// Movement speed in units per second.
    pub fn set_camera_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    /// Setting the same flag twice leaves the direction unchanged.
    pub fn set_mouse_invert_yaw(&mut self, invert: bool) {
        self.yaw = if invert { -YAW_SCALE } else { YAW_SCALE };
    }

    pub fn set_mouse_invert_pitch(&mut self, invert: bool) {
        self.pitch = if invert { -PITCH_SCALE } else { PITCH_SCALE };
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Mat4, Vec3};

    fn camera() -> Camera {
        Camera::new(Mat4::IDENTITY)
    }

    #[test]
    fn w_moves_forward_at_speed() {
        let mut camera = camera();
        let mut keyboard = Keyboard::new();
        keyboard.on_key(Key::W, true);

        let mut controller = Controller::new();
        controller.update(&mut camera, &keyboard, &Mouse::new(), Time(500));

        let p = camera.position();
        assert_relative_eq!(p.z, -5.0, epsilon = 1e-5);
        assert_relative_eq!(p.x, 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut camera = camera();
        let mut keyboard = Keyboard::new();
        for key in [Key::A, Key::D, Key::Q, Key::E] {
            keyboard.on_key(key, true);
        }
        Controller::new().update(&mut camera, &keyboard, &Mouse::new(), Time(1000));
        assert_relative_eq!(camera.position().length(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn drag_rotates_only_with_left_button() {
        let keyboard = Keyboard::new();
        let mut mouse = Mouse::new();
        let mut camera = camera();
        let mut controller = Controller::new();

        mouse.on_move(100, 40);
        controller.update(&mut camera, &keyboard, &mouse, Time(16));
        assert_eq!(camera.yaw(), 0.0);
        assert_eq!(camera.pitch(), 0.0);

        mouse.on_button(MouseButton::LEFT, true);
        mouse.on_move(110, 50);
        controller.update(&mut camera, &keyboard, &mouse, Time(16));
        assert_relative_eq!(camera.yaw(), 10.0 * 0.05 * 0.022, epsilon = 1e-6);
        assert_relative_eq!(camera.pitch(), 10.0 * 0.05 * -0.022, epsilon = 1e-6);
    }

    #[test]
    fn invert_flags_are_idempotent() {
        let keyboard = Keyboard::new();
        let mut mouse = Mouse::new();
        mouse.on_button(MouseButton::LEFT, true);
        mouse.on_move(10, 0);

        let mut controller = Controller::new();
        controller.set_mouse_invert_yaw(true);
        controller.set_mouse_invert_yaw(true);
        let mut camera = camera();
        controller.update(&mut camera, &keyboard, &mouse, Time(16));
        assert!(camera.yaw() < 0.0);

        controller.set_mouse_invert_yaw(false);
        mouse.on_move(20, 0);
        let before = camera.yaw();
        controller.update(&mut camera, &keyboard, &mouse, Time(16));
        assert!(camera.yaw() > before);
    }

    #[test]
    fn update_rebuilds_view() {
        let mut camera = camera();
        let mut keyboard = Keyboard::new();
        keyboard.on_key(Key::E, true);
        Controller::new().update(&mut camera, &keyboard, &Mouse::new(), Time(100));
        let origin = camera.view().transform_point3(Vec3::ZERO);
        assert_relative_eq!(origin.y, -1.0, epsilon = 1e-5);
    }
}
