//! Camera-reactive tunnel deformation.
//!
//! The morph is a pure function of (angle, height, time, camera pose): smooth,
//! bounded and periodic, with no hidden state, so it can be evaluated for a
//! boundary-mesh vertex, a flowing particle, or a unit test alike.

use glam::Vec3;
use std::f32::consts::PI;

use crate::camera::CameraPose;

/// Nominal tunnel dimensions shared by the boundary mesh and particle field.
pub const TUNNEL_RADIUS: f32 = 20.0;
pub const TUNNEL_LENGTH: f32 = 60.0;

/// Divisors normalizing camera height/distance into morph-friendly ranges.
const CAMERA_HEIGHT_NORM: f32 = 40.0;
const CAMERA_DISTANCE_NORM: f32 = 60.0;

/// Result of evaluating the morph at one (angle, height) sample.
#[derive(Clone, Copy, Debug)]
pub struct MorphSample {
    /// Multiplier applied to the nominal ring radius. Stays within
    /// `1 ± pulse`, where pulse is at most 0.5.
    pub radius_mult: f32,
    /// Additive offset along the tunnel axis.
    pub height_offset: f32,
}

/// Live morph coefficients, exposed for the diagnostics readout.
#[derive(Clone, Copy, Debug)]
pub struct MorphParams {
    pub pulse_amount: f32,
    pub height_scale: f32,
    pub angle_offset: f32,
    pub radius_mult: f32,
}

fn camera_terms(pose: &CameraPose) -> (f32, f32, f32) {
    let dir = pose.forward();
    let camera_angle = dir.z.atan2(dir.x);
    let normalized_height = pose.eye.y / CAMERA_HEIGHT_NORM;
    let horizontal = (pose.eye.x * pose.eye.x + pose.eye.z * pose.eye.z).sqrt();
    let normalized_distance = horizontal / CAMERA_DISTANCE_NORM;
    (camera_angle, normalized_height, normalized_distance)
}

/// Evaluate the twist morph for a vertex or particle at `angle` (radians
/// around the tunnel axis) and `height` (along the axis).
pub fn tunnel_morph(angle: f32, height: f32, time: f32, pose: &CameraPose) -> MorphSample {
    let (camera_angle, nh, nd) = camera_terms(pose);

    let pulse_amount = 0.3 + (time * 0.1).sin() * 0.2 * nd;
    let height_scale = 4.0 + (time * 0.15).sin() * 2.0 * nh;
    let angle_offset = camera_angle * 2.0;

    let twist_frequency = 2.0 + nh * 3.0;
    let height_phase = nd * PI;

    let radius_mult =
        1.0 + pulse_amount * (twist_frequency * angle + height / 3.0 + time * 0.1 + angle_offset).sin();
    let height_offset = (angle + time * 0.05 + height_phase).cos() * height_scale;

    MorphSample { radius_mult, height_offset }
}

/// Morph coefficients at the readout sample point (angle 0, height 0).
pub fn morph_params(time: f32, pose: &CameraPose) -> MorphParams {
    let (camera_angle, nh, nd) = camera_terms(pose);
    let pulse_amount = 0.3 + (time * 0.1).sin() * 0.2 * nd;
    let height_scale = 4.0 + (time * 0.15).sin() * 2.0 * nh;
    let angle_offset = camera_angle * 2.0;
    MorphParams {
        pulse_amount,
        height_scale,
        angle_offset,
        radius_mult: tunnel_morph(0.0, 0.0, time, pose).radius_mult,
    }
}

/// Wireframe cylinder that the morph deforms every frame.
///
/// Base (angle, height) samples are fixed at construction; `update` rewrites
/// the world-space line segments from the current time and camera pose.
pub struct BoundaryMesh {
    radial_segments: u32,
    height_rings: u32,
    /// Line segment endpoints, regenerated by `update`.
    pub segments: Vec<[Vec3; 2]>,
}

impl BoundaryMesh {
    pub fn new(radial_segments: u32, height_rings: u32) -> Self {
        Self {
            radial_segments: radial_segments.max(3),
            height_rings: height_rings.max(2),
            segments: Vec::new(),
        }
    }

    fn vertex(&self, seg: u32, ring: u32, time: f32, pose: &CameraPose) -> Vec3 {
        let angle = seg as f32 / self.radial_segments as f32 * PI * 2.0;
        let height =
            ring as f32 / (self.height_rings - 1) as f32 * TUNNEL_LENGTH - TUNNEL_LENGTH / 2.0;
        let sample = tunnel_morph(angle, height, time, pose);
        let r = TUNNEL_RADIUS * sample.radius_mult;
        Vec3::new(angle.cos() * r, height + sample.height_offset, angle.sin() * r)
    }

    /// Recompute all morphed segments for this frame.
    pub fn update(&mut self, time: f32, pose: &CameraPose) {
        self.segments.clear();
        for ring in 0..self.height_rings {
            for seg in 0..self.radial_segments {
                let a = self.vertex(seg, ring, time, pose);
                let b = self.vertex((seg + 1) % self.radial_segments, ring, time, pose);
                self.segments.push([a, b]);
                if ring + 1 < self.height_rings {
                    let below = self.vertex(seg, ring + 1, time, pose);
                    self.segments.push([a, below]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn test_pose() -> CameraPose {
        CameraPose::new(Vec3::new(13.5, 13.5, 13.5), Vec3::ZERO, 75.0)
    }

    #[test]
    fn test_morph_deterministic() {
        let pose = test_pose();
        let a = tunnel_morph(1.2, -8.0, 4.5, &pose);
        let b = tunnel_morph(1.2, -8.0, 4.5, &pose);
        assert_eq!(a.radius_mult, b.radius_mult);
        assert_eq!(a.height_offset, b.height_offset);
    }

    #[test]
    fn test_morph_bounded() {
        let pose = test_pose();
        for i in 0..500 {
            let angle = i as f32 * 0.07;
            let height = (i as f32 * 0.39).sin() * TUNNEL_LENGTH;
            let t = i as f32 * 0.11;
            let sample = tunnel_morph(angle, height, t, &pose);
            // pulse_amount is at most 0.3 + 0.2 * nd; with nd <= 1 that keeps
            // radius_mult within [0.5, 1.5].
            assert!(sample.radius_mult > 0.4 && sample.radius_mult < 1.6);
            // height_scale is at most 4 + 2 * nh.
            assert!(sample.height_offset.abs() <= 6.5);
        }
    }

    #[test]
    fn test_morph_continuous_in_angle() {
        let pose = test_pose();
        let eps = 1e-3;
        for i in 0..100 {
            let angle = i as f32 * 0.13;
            let a = tunnel_morph(angle, 3.0, 2.0, &pose);
            let b = tunnel_morph(angle + eps, 3.0, 2.0, &pose);
            assert!((a.radius_mult - b.radius_mult).abs() < 0.05);
            assert!((a.height_offset - b.height_offset).abs() < 0.05);
        }
    }

    #[test]
    fn test_morph_responds_to_camera() {
        let t = 3.0;
        let low = CameraPose::new(Vec3::new(5.0, 1.0, 5.0), Vec3::ZERO, 75.0);
        let high = CameraPose::new(Vec3::new(40.0, 35.0, 10.0), Vec3::ZERO, 75.0);
        let a = tunnel_morph(0.7, 2.0, t, &low);
        let b = tunnel_morph(0.7, 2.0, t, &high);
        assert!(
            (a.radius_mult - b.radius_mult).abs() > 1e-4
                || (a.height_offset - b.height_offset).abs() > 1e-4
        );
    }

    #[test]
    fn test_boundary_mesh_segments() {
        let mut mesh = BoundaryMesh::new(16, 8);
        mesh.update(1.0, &test_pose());
        // 16 ring segments per ring plus 16 connectors per ring gap.
        assert_eq!(mesh.segments.len(), (16 * 8 + 16 * 7) as usize);
        for [a, b] in &mesh.segments {
            assert!(a.is_finite() && b.is_finite());
        }
    }
}
