//! Orbital camera and its input controller

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

/// Closest the camera may get to its target
pub const MIN_DISTANCE: f32 = 1.0;

/// Farthest the camera may get from its target
pub const MAX_DISTANCE: f32 = 100.0;

/// Pitch limit in radians, keeps the view away from the poles
pub const PITCH_LIMIT: f32 = 1.5;

const DEFAULT_DISTANCE: f32 = 6.0;
const DEFAULT_PITCH: f32 = 0.35;

/// 3D perspective camera orbiting a target point
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    // Orbital parameters
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0f32.to_radians(),
            aspect_ratio,
            near: 0.05,
            far: 500.0,
            distance: DEFAULT_DISTANCE,
            yaw: 0.0,
            pitch: DEFAULT_PITCH,
        };
        camera.update_orbital();
        camera
    }

    /// Recompute the eye position from distance, yaw and pitch
    pub fn update_orbital(&mut self) {
        self.position = self.target
            + Vec3::new(
                self.distance * self.pitch.cos() * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                self.distance * self.pitch.cos() * self.yaw.cos(),
            );
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_orbital();
    }

    /// Positive delta moves towards the target
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.update_orbital();
    }

    /// Back to the initial framing of the nucleus
    pub fn reset(&mut self) {
        self.target = Vec3::ZERO;
        self.distance = DEFAULT_DISTANCE;
        self.yaw = 0.0;
        self.pitch = DEFAULT_PITCH;
        self.update_orbital();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera3D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: camera.position.extend(1.0).to_array(),
        }
    }
}

/// Accumulates input device state between frames and applies it to a camera.
///
/// Held keys orbit and zoom at a fixed rate per second, mouse drags and
/// wheel ticks are applied once and then cleared.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub orbit_speed: f32,
    pub zoom_speed: f32,
    pub drag_sensitivity: f32,
    pub scroll_sensitivity: f32,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    zoom_in: bool,
    zoom_out: bool,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
    pending_drag: (f32, f32),
    pending_scroll: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            orbit_speed: 1.5,
            zoom_speed: 4.0,
            drag_sensitivity: 0.01,
            scroll_sensitivity: 0.5,
            left: false,
            right: false,
            up: false,
            down: false,
            zoom_in: false,
            zoom_out: false,
            dragging: false,
            last_cursor: None,
            pending_drag: (0.0, 0.0),
            pending_scroll: 0.0,
        }
    }

    /// Returns true if the key is a camera key
    pub fn process_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let slot = match key {
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            KeyCode::KeyW => &mut self.up,
            KeyCode::KeyS => &mut self.down,
            KeyCode::KeyE => &mut self.zoom_in,
            KeyCode::KeyQ => &mut self.zoom_out,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    pub fn process_mouse_button(&mut self, pressed: bool) {
        self.dragging = pressed;
        if !pressed {
            self.last_cursor = None;
        }
    }

    pub fn process_cursor(&mut self, x: f64, y: f64) {
        if !self.dragging {
            return;
        }
        if let Some((last_x, last_y)) = self.last_cursor {
            self.pending_drag.0 += (x - last_x) as f32;
            self.pending_drag.1 += (y - last_y) as f32;
        }
        self.last_cursor = Some((x, y));
    }

    pub fn process_scroll(&mut self, delta: f32) {
        self.pending_scroll += delta;
    }

    /// Apply everything gathered since the last call
    pub fn update_camera(&mut self, camera: &mut Camera3D, dt: f32) {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;

        let key_yaw = axis(self.right, self.left) * self.orbit_speed * dt;
        let key_pitch = axis(self.up, self.down) * self.orbit_speed * dt;
        let key_zoom = axis(self.zoom_in, self.zoom_out) * self.zoom_speed * dt;

        let (drag_x, drag_y) = self.pending_drag;
        camera.orbit(
            key_yaw + drag_x * self.drag_sensitivity,
            key_pitch + drag_y * self.drag_sensitivity,
        );
        camera.zoom(key_zoom + self.pending_scroll * self.scroll_sensitivity);

        self.pending_drag = (0.0, 0.0);
        self.pending_scroll = 0.0;
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_starts_at_default_distance() {
        let camera = Camera3D::new(16.0 / 9.0);
        assert!((camera.position.length() - DEFAULT_DISTANCE).abs() < 1e-4);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut camera = Camera3D::new(1.0);
        camera.orbit(0.0, 10.0);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.orbit(0.0, -20.0);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_zoom_limits() {
        let mut camera = Camera3D::new(1.0);
        camera.zoom(1000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_reset_restores_framing() {
        let mut camera = Camera3D::new(1.0);
        let initial = camera.position;
        camera.orbit(1.0, 0.5);
        camera.zoom(2.0);
        camera.reset();
        assert!((camera.position - initial).length() < 1e-5);
    }

    #[test]
    fn test_held_key_orbits_over_time() {
        let mut camera = Camera3D::new(1.0);
        let mut controller = CameraController::new();
        assert!(controller.process_key(KeyCode::KeyD, true));
        controller.update_camera(&mut camera, 0.5);
        assert!((camera.yaw - controller.orbit_speed * 0.5).abs() < 1e-5);

        controller.process_key(KeyCode::KeyD, false);
        let yaw = camera.yaw;
        controller.update_camera(&mut camera, 0.5);
        assert_eq!(camera.yaw, yaw);
    }

    #[test]
    fn test_non_camera_key_is_ignored() {
        let mut controller = CameraController::new();
        assert!(!controller.process_key(KeyCode::KeyN, true));
    }

    #[test]
    fn test_drag_is_consumed_once() {
        let mut camera = Camera3D::new(1.0);
        let mut controller = CameraController::new();
        controller.process_mouse_button(true);
        controller.process_cursor(10.0, 10.0);
        controller.process_cursor(60.0, 10.0);
        controller.update_camera(&mut camera, 0.0);
        assert!((camera.yaw - 0.5).abs() < 1e-5);

        controller.update_camera(&mut camera, 0.0);
        assert!((camera.yaw - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_uniform_carries_eye_position() {
        let camera = Camera3D::new(1.0);
        let uniform = CameraUniform::from_camera(&camera);
        assert_eq!(uniform.position[3], 1.0);
        assert!((uniform.position[2] - camera.position.z).abs() < 1e-6);
    }
}
