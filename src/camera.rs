//! Free-fly camera state and movement controller.
//!
//! Pure math, no windowing dependencies; the viewer binary maps raw input
//! events onto these types.

use glam::{Mat4, Vec3};

/// Free-fly camera state.
///
/// Yaw and pitch are stored in degrees. Yaw -90 looks down -z.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Heading angle in degrees.
    pub yaw: f32,
    /// Elevation angle in degrees, clamped by the controller to (-90, 90).
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Near clip plane distance.
    pub znear: f32,
    /// Far clip plane distance.
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(50.0, 150.0, 200.0),
            yaw: -90.0,
            pitch: 0.0,
            fov_y: 45.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    /// Returns the unit view direction derived from yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    /// Returns the unit right vector.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Returns the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Returns the perspective projection matrix for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.znear, self.zfar)
    }

    /// Returns the combined view-projection matrix.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Movement axes recognized by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Tracks held movement keys and applies them to a camera each frame.
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Mouse-look sensitivity in degrees per pixel.
    pub sensitivity: f32,
    moving: [bool; 6],
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            speed: 50.0,
            sensitivity: 0.1,
            moving: [false; 6],
        }
    }
}

impl CameraController {
    /// Marks a movement direction as active or inactive.
    pub fn set_moving(&mut self, direction: MoveDirection, active: bool) {
        self.moving[direction as usize] = active;
    }

    /// Returns true if any movement key is held.
    pub fn is_moving(&self) -> bool {
        self.moving.iter().any(|&m| m)
    }

    /// Advances the camera position by the held directions over `dt` seconds.
    pub fn update(&self, camera: &mut Camera, dt: f32) {
        let step = self.speed * dt;
        let forward = camera.forward();
        let right = camera.right();

        if self.moving[MoveDirection::Forward as usize] {
            camera.position += forward * step;
        }
        if self.moving[MoveDirection::Backward as usize] {
            camera.position -= forward * step;
        }
        if self.moving[MoveDirection::Left as usize] {
            camera.position -= right * step;
        }
        if self.moving[MoveDirection::Right as usize] {
            camera.position += right * step;
        }
        if self.moving[MoveDirection::Up as usize] {
            camera.position += Vec3::Y * step;
        }
        if self.moving[MoveDirection::Down as usize] {
            camera.position -= Vec3::Y * step;
        }
    }

    /// Applies a mouse delta (pixels, y positive downward) to yaw and pitch.
    ///
    /// Pitch is clamped to avoid flipping over the poles.
    pub fn mouse_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += dx * self.sensitivity;
        camera.pitch = (camera.pitch - dy * self.sensitivity).clamp(-89.0, 89.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        let forward = camera.forward();
        assert!((forward.x).abs() < 1e-6);
        assert!((forward.y).abs() < 1e-6);
        assert!((forward.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_forward_and_right_are_unit_and_orthogonal() {
        let camera = Camera {
            yaw: 37.0,
            pitch: -20.0,
            ..Default::default()
        };
        let forward = camera.forward();
        let right = camera.right();
        assert!((forward.length() - 1.0).abs() < 1e-5);
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!(forward.dot(right).abs() < 1e-5);
        // Right stays horizontal regardless of pitch.
        assert!(right.y.abs() < 1e-5);
    }

    #[test]
    fn test_controller_moves_forward() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut controller = CameraController::default();

        controller.set_moving(MoveDirection::Forward, true);
        controller.update(&mut camera, 1.0);

        let moved = camera.position - start;
        assert!((moved.length() - controller.speed).abs() < 1e-3);
        assert!(moved.dot(camera.forward()) > 0.0);

        controller.set_moving(MoveDirection::Forward, false);
        assert!(!controller.is_moving());
    }

    #[test]
    fn test_vertical_movement_ignores_pitch() {
        let mut camera = Camera {
            pitch: 45.0,
            ..Default::default()
        };
        let start = camera.position;
        let mut controller = CameraController::default();
        controller.set_moving(MoveDirection::Up, true);
        controller.update(&mut camera, 0.5);

        let moved = camera.position - start;
        assert_eq!(moved.x, 0.0);
        assert_eq!(moved.z, 0.0);
        assert!((moved.y - controller.speed * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_mouse_look_clamps_pitch() {
        let mut camera = Camera::default();
        let controller = CameraController::default();

        controller.mouse_look(&mut camera, 0.0, -10_000.0);
        assert_eq!(camera.pitch, 89.0);
        controller.mouse_look(&mut camera, 0.0, 10_000.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn test_view_projection_is_finite() {
        let camera = Camera::default();
        let vp = camera.view_projection(16.0 / 9.0);
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
