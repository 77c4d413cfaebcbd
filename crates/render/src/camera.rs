use glam::{Mat3, Mat4, Vec3};
use stereoview_common::{CameraConfig, CameraMovement};

/// Pitch is kept inside this many degrees of the horizon so the look
/// direction never aligns with world up.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Largest pitch actually stored; strictly inside the limit.
const MAX_PITCH_DEGREES: f32 = PITCH_LIMIT_DEGREES - 1e-3;

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES)
}

/// Free-fly camera with yaw/pitch orientation and a zoomable field of view.
///
/// Angles are stored in degrees. `front`, `right` and `up` are derived from
/// yaw/pitch after every orientation change and always form an orthonormal
/// basis.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    pub speed: f32,
    pub sensitivity: f32,
    zoom: f32,
    zoom_min: f32,
    zoom_max: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

impl FlyCamera {
    /// Camera at `position` looking down -Z.
    pub fn new(position: Vec3) -> Self {
        Self::from_config(&CameraConfig {
            position,
            ..CameraConfig::default()
        })
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let zoom_min = config.zoom_min.min(config.zoom_max);
        let zoom_max = config.zoom_max.max(config.zoom_min);
        let mut camera = Self {
            position: config.position,
            yaw: config.yaw_degrees,
            pitch: clamp_pitch(config.pitch_degrees),
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            speed: config.speed,
            sensitivity: config.sensitivity,
            zoom: config.zoom.clamp(zoom_min, zoom_max),
            zoom_min,
            zoom_max,
        };
        camera.update_vectors();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        (self.zoom_min, self.zoom_max)
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Move along the derived basis. There is no bounds check.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.world_up * velocity,
            CameraMovement::Down => self.position -= self.world_up * velocity,
        }
    }

    /// Rotate by a mouse delta in pixels; positive `dy` looks up.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = clamp_pitch(self.pitch + dy * self.sensitivity);
        self.update_vectors();
    }

    /// Scrolling up narrows the field of view.
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(self.zoom_min, self.zoom_max);
    }

    /// World-space position of an eye displaced along the camera's right axis.
    pub fn eye_position(&self, lateral_offset: f32) -> Vec3 {
        self.position + self.right * lateral_offset
    }

    /// Look-at transform from the displaced eye along the shared look direction.
    pub fn view_matrix(&self, lateral_offset: f32) -> Mat4 {
        let eye = self.eye_position(lateral_offset);
        Mat4::look_at_rh(eye, eye + self.front, self.up)
    }

    /// View rotation with translation stripped, for geometry at infinity.
    pub fn skybox_view(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view_matrix(0.0)))
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(cam: &FlyCamera) {
        let eps = 1e-4;
        assert!((cam.front().length() - 1.0).abs() < eps);
        assert!((cam.right().length() - 1.0).abs() < eps);
        assert!((cam.up().length() - 1.0).abs() < eps);
        assert!(cam.front().dot(cam.right()).abs() < eps);
        assert!(cam.front().dot(cam.up()).abs() < eps);
        assert!(cam.right().dot(cam.up()).abs() < eps);
    }

    #[test]
    fn default_camera_faces_negative_z() {
        let cam = FlyCamera::default();
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(cam.right().abs_diff_eq(Vec3::X, 1e-6));
        assert!(cam.up().abs_diff_eq(Vec3::Y, 1e-6));
        assert_eq!(cam.zoom(), 45.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::default();
        for _ in 0..1000 {
            cam.process_mouse_movement(0.0, 50.0);
        }
        assert!(cam.pitch() < PITCH_LIMIT_DEGREES);
        assert!(cam.pitch() > 88.9);
        for _ in 0..1000 {
            cam.process_mouse_movement(3.0, -50.0);
        }
        assert!(cam.pitch() > -PITCH_LIMIT_DEGREES);
        assert!(cam.pitch() < -88.9);
        assert_orthonormal(&cam);
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut cam = FlyCamera::default();
        let deltas = [(13.0, 7.0), (-400.0, 22.0), (0.5, -900.0), (77.0, 77.0)];
        for (dx, dy) in deltas {
            cam.process_mouse_movement(dx, dy);
            cam.process_keyboard(CameraMovement::Forward, 0.3);
            assert_orthonormal(&cam);
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = FlyCamera::default();
        for _ in 0..100 {
            cam.process_mouse_scroll(3.0);
        }
        assert_eq!(cam.zoom(), 1.0);
        for _ in 0..100 {
            cam.process_mouse_scroll(-7.0);
        }
        assert_eq!(cam.zoom(), 45.0);
    }

    #[test]
    fn keyboard_moves_along_basis() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), 1e-5));
        cam.process_keyboard(CameraMovement::Right, 2.0);
        assert!(cam.position.abs_diff_eq(Vec3::new(5.0, 0.0, -2.5), 1e-5));
        cam.process_keyboard(CameraMovement::Up, 1.0);
        assert!((cam.position.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn movement_is_unbounded() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.process_keyboard(CameraMovement::Backward, 1.0e6);
        assert!(cam.position.z > 1.0e6);
    }

    #[test]
    fn lateral_offset_shifts_eye_along_right() {
        let cam = FlyCamera::new(Vec3::ZERO);
        assert!(cam
            .eye_position(-0.0325)
            .abs_diff_eq(Vec3::new(-0.0325, 0.0, 0.0), 1e-6));

        let view = cam.view_matrix(-0.0325);
        let eye_in_view = view.transform_point3(Vec3::new(-0.0325, 0.0, 0.0));
        assert!(eye_in_view.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn eyes_share_look_direction() {
        let mut cam = FlyCamera::default();
        cam.process_mouse_movement(40.0, 12.0);
        let left = cam.view_matrix(-0.05);
        let right = cam.view_matrix(0.05);
        let l = Mat3::from_mat4(left);
        let r = Mat3::from_mat4(right);
        assert!(l.abs_diff_eq(r, 1e-6));
    }

    #[test]
    fn skybox_view_has_no_translation() {
        let cam = FlyCamera::new(Vec3::new(10.0, -4.0, 3.0));
        let sky = cam.skybox_view();
        assert_eq!(sky.w_axis, glam::Vec4::W);
        let full = Mat3::from_mat4(cam.view_matrix(0.0));
        assert!(Mat3::from_mat4(sky).abs_diff_eq(full, 1e-6));
    }
}
