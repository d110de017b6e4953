//! Camera pose math and the pointer-driven orbit controller.

use glam::{Mat4, Vec3};

/// Pixel-to-radian drag sensitivity.
pub const DRAG_SENSITIVITY: f32 = 0.01;
/// Seconds after the last pointer release before ambient motion resumes.
pub const IDLE_THRESHOLD_SECS: f32 = 1.0;

/// Ambient orbit rates, radians per second. Pitch drifts slower than yaw so
/// the idle motion reads as diagonal rather than a flat spin.
const AMBIENT_YAW_RATE: f32 = 0.06;
const AMBIENT_PITCH_RATE: f32 = 0.042;
/// Slow sinusoidal wobble layered on the ambient drift.
const AMBIENT_WOBBLE_RATE: f32 = 0.03;
const AMBIENT_WOBBLE_CLOCK_RATE: f32 = 0.3;

/// Smallest dimension accepted when deriving an aspect ratio; zero-sized
/// containers clamp here instead of dividing by zero.
const MIN_ASPECT_DIM: f32 = 1e-4;

/// Aspect ratio with degenerate sizes clamped away from zero.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    width.max(MIN_ASPECT_DIM) / height.max(MIN_ASPECT_DIM)
}

/// Position, look-at target and lens parameters for one frame.
#[derive(Clone, Copy, Debug)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraPose {
    pub fn new(eye: Vec3, target: Vec3, fov_deg: f32) -> Self {
        Self { eye, target, fov_deg, near: 0.1, far: 1000.0 }
    }

    /// Normalized direction from eye to target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, width: f32, height: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio(width, height)) * self.view_matrix()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 12.0), Vec3::ZERO, 45.0)
    }
}

/// Translates pointer drags into orbit angles, with ambient drift while idle.
///
/// Drag state always wins over ambient motion; ambient motion resumes only
/// once the idle threshold has elapsed past the last pointer release (or
/// immediately if no interaction has ever occurred).
#[derive(Clone, Debug)]
pub struct OrbitController {
    /// Orbit around Y, radians. Unbounded.
    pub yaw: f32,
    /// Orbit toward the poles, radians. Clamped to ±π/2.
    pub pitch: f32,
    dragging: bool,
    last_pointer: Option<(f32, f32)>,
    /// Monotonic controller clock, seconds.
    clock: f32,
    /// Clock value at the last pointer release; None until a release happens.
    last_release: Option<f32>,
    wobble_clock: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            dragging: false,
            last_pointer: None,
            clock: 0.0,
            last_release: None,
            wobble_clock: 0.0,
        }
    }
}

impl OrbitController {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether ambient drift would apply this frame.
    pub fn ambient_active(&self) -> bool {
        if self.dragging {
            return false;
        }
        match self.last_release {
            None => true,
            Some(at) => self.clock - at > IDLE_THRESHOLD_SECS,
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.dragging = true;
        self.last_pointer = Some((x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.dragging {
            if let Some((px, py)) = self.last_pointer {
                self.yaw += (x - px) * DRAG_SENSITIVITY;
                self.pitch = (self.pitch + (y - py) * DRAG_SENSITIVITY)
                    .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
            }
        }
        self.last_pointer = Some((x, y));
    }

    pub fn pointer_up(&mut self) {
        if self.dragging {
            self.dragging = false;
            self.last_release = Some(self.clock);
        }
    }

    /// The pointer left the viewport: the drag ends without counting as an
    /// interaction, so ambient motion is not pushed back.
    pub fn pointer_leave(&mut self) {
        self.dragging = false;
        self.last_pointer = None;
    }

    /// Advance the controller clock and apply ambient drift when idle.
    pub fn tick(&mut self, dt: f32) {
        self.clock += dt;
        if !self.ambient_active() {
            return;
        }
        self.wobble_clock += dt * AMBIENT_WOBBLE_CLOCK_RATE;
        let wobble_y = (self.wobble_clock * 0.3).sin() * AMBIENT_WOBBLE_RATE;
        let wobble_x = (self.wobble_clock * 0.2).cos() * AMBIENT_WOBBLE_RATE;
        self.yaw += (AMBIENT_YAW_RATE + wobble_y) * dt;
        self.pitch = (self.pitch + (AMBIENT_PITCH_RATE + wobble_x) * dt)
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_aspect_ratio_guards_zero() {
        let a = aspect_ratio(0.0, 0.0);
        assert!(a.is_finite());
        assert_eq!(aspect_ratio(400.0, 300.0), 400.0 / 300.0);
    }

    #[test]
    fn test_view_projection_finite_at_zero_size() {
        let pose = CameraPose::default();
        let vp = pose.view_projection(0.0, 0.0);
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_forward_points_at_target() {
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 45.0);
        assert!((pose.forward() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_pitch_clamped_under_large_drag() {
        let mut c = OrbitController::default();
        c.pointer_down(0.0, 0.0);
        // Sum of deltas far beyond ±π/2 worth of pixels.
        for i in 0..10_000 {
            c.pointer_move(0.0, i as f32);
        }
        assert!(c.pitch <= FRAC_PI_2 + 1e-6);
        c.pointer_down(0.0, 0.0);
        for i in 0..10_000 {
            c.pointer_move(0.0, -(i as f32));
        }
        assert!(c.pitch >= -FRAC_PI_2 - 1e-6);
    }

    #[test]
    fn test_ambient_suppressed_while_dragging() {
        let mut c = OrbitController::default();
        assert!(c.ambient_active(), "never interacted: ambient applies");
        c.pointer_down(5.0, 5.0);
        assert!(!c.ambient_active());
        let yaw = c.yaw;
        c.tick(0.5);
        assert_eq!(c.yaw, yaw, "no drift mid-drag");
    }

    #[test]
    fn test_ambient_resumes_after_idle_threshold() {
        let mut c = OrbitController::default();
        c.pointer_down(0.0, 0.0);
        c.pointer_up();
        assert!(!c.ambient_active(), "just released: still within threshold");
        c.tick(IDLE_THRESHOLD_SECS * 0.5);
        assert!(!c.ambient_active());
        c.tick(IDLE_THRESHOLD_SECS * 0.6);
        assert!(c.ambient_active());
        let yaw = c.yaw;
        c.tick(1.0);
        assert!(c.yaw > yaw, "ambient drift accumulates once idle");
    }

    #[test]
    fn test_drag_accumulates_yaw() {
        let mut c = OrbitController::default();
        c.pointer_down(0.0, 0.0);
        c.pointer_move(100.0, 0.0);
        assert!((c.yaw - 100.0 * DRAG_SENSITIVITY).abs() < 1e-6);
        c.pointer_up();
        // Moves while not dragging do not orbit.
        let yaw = c.yaw;
        c.pointer_move(500.0, 0.0);
        assert_eq!(c.yaw, yaw);
    }

    #[test]
    fn test_pointer_leave_cancels_drag() {
        let mut c = OrbitController::default();
        c.pointer_down(0.0, 0.0);
        c.pointer_leave();
        assert!(!c.is_dragging());
        // Leave does not count as an interaction.
        assert!(c.ambient_active());
    }
}
