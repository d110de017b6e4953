//! Pointer picking and highlight selection.
//!
//! Each frame the hover variants cast a ray from the pointer into the scene
//! and highlight the nearest intersected surface; with nothing under the
//! pointer, a timed default highlight advances every few seconds.

use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::camera::CameraPose;
use crate::surface::ImageSurface;

/// Seconds between advances of the default highlight.
pub const HIGHLIGHT_CYCLE_SECS: f32 = 3.0;

/// Ray/sphere intersection; returns the near hit distance if in front of the
/// origin. `dir` must be normalized.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// World-space ray through a pointer position in normalized device
/// coordinates (x right, y up, both in [-1, 1]).
pub fn pointer_ray(ndc_x: f32, ndc_y: f32, pose: &CameraPose, width: f32, height: f32) -> (Vec3, Vec3) {
    let inv = pose.view_projection(width, height).inverse();
    let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    let far = far.xyz() / far.w.abs().max(1e-6).copysign(far.w);
    let dir = (far - pose.eye).normalize_or_zero();
    (pose.eye, dir)
}

/// Index of the nearest surface hit by the ray, if any. Surfaces are treated
/// as their bounding spheres, which is accurate enough for billboarded quads.
pub fn pick_surface(surfaces: &[ImageSurface], origin: Vec3, dir: Vec3) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, s) in surfaces.iter().enumerate() {
        if let Some(t) = ray_sphere(origin, dir, s.position, s.pick_radius()) {
            if best.map(|(_, bt)| t < bt).unwrap_or(true) {
                best = Some((i, t));
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Advances a default-highlighted index on a fixed timer.
#[derive(Clone, Debug)]
pub struct HighlightCycler {
    index: usize,
    clock: f32,
    period: f32,
}

impl HighlightCycler {
    pub fn new(period: f32) -> Self {
        Self { index: 0, clock: 0.0, period: period.max(1e-3) }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance(&mut self, dt: f32, count: usize) {
        if count == 0 {
            return;
        }
        self.clock += dt;
        while self.clock >= self.period {
            self.clock -= self.period;
            self.index = (self.index + 1) % count;
        }
        self.index %= count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Placement;
    use crate::surface::MotionProfile;

    fn surface_at(pos: Vec3, size: f32) -> ImageSurface {
        let placement = Placement { position: pos, ..Default::default() };
        ImageSurface::new(Some(0), placement, size, MotionProfile::still())
    }

    #[test]
    fn test_ray_sphere_hit_and_miss() {
        let hit = ray_sphere(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO, 1.0);
        assert!((hit.unwrap() - 4.0).abs() < 1e-5);
        let miss = ray_sphere(Vec3::new(0.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO, 1.0);
        assert!(miss.is_none());
        // Sphere behind the origin is not a hit.
        let behind = ray_sphere(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO, 1.0);
        assert!(behind.is_none());
    }

    #[test]
    fn test_pick_nearest_surface() {
        let surfaces = vec![
            surface_at(Vec3::new(0.0, 0.0, -6.0), 1.0),
            surface_at(Vec3::new(0.0, 0.0, -3.0), 1.0),
        ];
        let picked = pick_surface(&surfaces, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(picked, Some(1));
    }

    #[test]
    fn test_pointer_ray_center_points_forward() {
        let pose = CameraPose::default();
        let (origin, dir) = pointer_ray(0.0, 0.0, &pose, 800.0, 600.0);
        assert_eq!(origin, pose.eye);
        assert!((dir - pose.forward()).length() < 1e-4);
    }

    #[test]
    fn test_pointer_ray_hits_centered_surface() {
        let pose = CameraPose::default();
        let surfaces = vec![surface_at(Vec3::ZERO, 1.0)];
        let (origin, dir) = pointer_ray(0.0, 0.0, &pose, 800.0, 600.0);
        assert_eq!(pick_surface(&surfaces, origin, dir), Some(0));
    }

    #[test]
    fn test_cycler_advances_on_period() {
        let mut c = HighlightCycler::new(3.0);
        c.advance(2.9, 4);
        assert_eq!(c.index(), 0);
        c.advance(0.2, 4);
        assert_eq!(c.index(), 1);
        // Multiple periods in one tick wrap as many times as needed.
        c.advance(6.1, 4);
        assert_eq!(c.index(), 3);
    }

    #[test]
    fn test_cycler_tolerates_empty_list() {
        let mut c = HighlightCycler::new(3.0);
        c.advance(10.0, 0);
        assert_eq!(c.index(), 0);
    }
}
