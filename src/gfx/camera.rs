use glam::{Mat4, Vec3};

/// Units per second travelled by the movement functions.
pub const SPEED: f32 = 2.5;
/// Degrees of rotation per unit of mouse offset.
pub const SENSITIVITY: f32 = 0.1;
/// Pitch is kept strictly inside (-90, 90) so `front` never lines up with world up.
pub const PITCH_LIMIT: f32 = 89.0;

const WORLD_UP: Vec3 = Vec3::Y;

/// Free-flying camera.
///
/// `front`, `right` and `up` are derived from `yaw` and `pitch` and are rebuilt whenever
/// either angle changes, so they always form an orthonormal basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pos: Vec3,
    yaw: f32,
    pitch: f32,

    front: Vec3,
    right: Vec3,
    up: Vec3,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Creation Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Camera {
    /// `yaw` and `pitch` are in degrees.
    pub fn new(pos: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut cam = Self {
            pos,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            front: -Vec3::Z,
            right: Vec3::X,
            up: WORLD_UP,
        };
        cam.update_basis();
        cam
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(1.7, 1.3, 4.0), 240.0, -15.0)
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              Usability Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Camera {
    pub fn move_forward(&mut self, dt: f32) {
        self.pos += self.front * SPEED * dt;
    }

    pub fn move_backward(&mut self, dt: f32) {
        self.pos -= self.front * SPEED * dt;
    }

    pub fn strafe_left(&mut self, dt: f32) {
        self.pos -= self.right * SPEED * dt;
    }

    pub fn strafe_right(&mut self, dt: f32) {
        self.pos += self.right * SPEED * dt;
    }

    pub fn ascend(&mut self, dt: f32) {
        self.pos += WORLD_UP * SPEED * dt;
    }

    pub fn descend(&mut self, dt: f32) {
        self.pos -= WORLD_UP * SPEED * dt;
    }

    /// Applies a mouse offset. Positive `y_offset` looks up.
    pub fn look(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * SENSITIVITY;
        self.pitch = (self.pitch + y_offset * SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_basis();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.pos, self.pos + self.front, self.up)
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              Get / Set Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Camera {
    pub fn position(&self) -> Vec3 {
        self.pos
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

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Internal Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Camera {
    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(cam: &Camera) {
        assert_abs_diff_eq!(cam.front().length(), 1.0, epsilon = EPS);
        assert_abs_diff_eq!(cam.right().length(), 1.0, epsilon = EPS);
        assert_abs_diff_eq!(cam.up().length(), 1.0, epsilon = EPS);
        assert_abs_diff_eq!(cam.front().dot(cam.right()), 0.0, epsilon = EPS);
        assert_abs_diff_eq!(cam.front().dot(cam.up()), 0.0, epsilon = EPS);
        assert_abs_diff_eq!(cam.right().dot(cam.up()), 0.0, epsilon = EPS);
    }

    #[test]
    fn pitch_stays_inside_poles() {
        let mut cam = Camera::default();
        cam.look(0.0, 1.0e6);
        assert!(cam.pitch() < 90.0);
        assert_abs_diff_eq!(cam.pitch(), PITCH_LIMIT);

        cam.look(0.0, -1.0e6);
        assert!(cam.pitch() > -90.0);
        assert_abs_diff_eq!(cam.pitch(), -PITCH_LIMIT);
        assert_orthonormal(&cam);
    }

    #[test]
    fn constructor_clamps_pitch() {
        let cam = Camera::new(Vec3::ZERO, 0.0, 120.0);
        assert_abs_diff_eq!(cam.pitch(), PITCH_LIMIT);
        assert_orthonormal(&cam);
    }

    #[test]
    fn basis_stays_orthonormal_over_look_sequence() {
        let mut cam = Camera::default();
        // Deterministic pseudo-random walk over large offsets in both axes.
        let mut seed = 0x2545_f491_u32;
        for _ in 0..2000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let dx = (seed % 2001) as f32 - 1000.0;
            let dy = ((seed >> 11) % 2001) as f32 - 1000.0;
            cam.look(dx, dy);

            assert!(cam.pitch() > -90.0 && cam.pitch() < 90.0);
            assert_orthonormal(&cam);
        }
    }

    #[test]
    fn yaw_is_left_unbounded() {
        let mut cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        cam.look(10_000.0, 0.0);
        assert_abs_diff_eq!(cam.yaw(), 1000.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_angles_face_positive_x() {
        let cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        assert_abs_diff_eq!(cam.front().x, 1.0, epsilon = EPS);
        assert_abs_diff_eq!(cam.right().z, 1.0, epsilon = EPS);
        assert_abs_diff_eq!(cam.up().y, 1.0, epsilon = EPS);
    }

    #[test]
    fn view_matrix_round_trips_through_inverse() {
        let poses = [
            Camera::default(),
            Camera::new(Vec3::new(-20.0, 3.5, 11.0), 45.0, 80.0),
            Camera::new(Vec3::new(0.0, -7.0, 0.25), -300.0, -88.0),
        ];
        for cam in poses {
            let view = cam.view_matrix();
            let product = view * view.inverse();
            assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4), "{product:?}");
        }
    }

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let cam = Camera::new(Vec3::new(3.0, -2.0, 9.0), 123.0, 12.0);
        let eye = cam.view_matrix().transform_point3(cam.position());
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-4));

        let ahead = cam.view_matrix().transform_point3(cam.position() + cam.front());
        assert!(ahead.abs_diff_eq(-Vec3::Z, 1e-4));
    }

    #[test]
    fn movement_follows_basis() {
        let mut cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        cam.move_forward(1.0);
        assert!(cam.position().abs_diff_eq(Vec3::X * SPEED, EPS));

        cam.move_backward(1.0);
        cam.strafe_right(2.0);
        assert!(cam.position().abs_diff_eq(Vec3::Z * SPEED * 2.0, EPS));

        cam.strafe_left(2.0);
        cam.ascend(0.5);
        assert!(cam.position().abs_diff_eq(Vec3::Y * SPEED * 0.5, EPS));

        cam.descend(0.5);
        assert!(cam.position().abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn ascend_uses_world_up_even_when_pitched() {
        let mut cam = Camera::new(Vec3::ZERO, 30.0, -60.0);
        cam.ascend(1.0);
        assert!(cam.position().abs_diff_eq(Vec3::Y * SPEED, EPS));
    }
}
