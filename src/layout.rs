//! One-shot placement strategies mapping image index to an initial 3D position.
//!
//! Placement runs exactly once at construction from the final image count;
//! the per-frame updaters only derive display transforms from it.

use glam::Vec3;
use std::f32::consts::PI;

use crate::motion::XorShift64;

/// Where a surface starts out, plus the cylindrical coordinates some
/// per-frame updaters animate around. For strategies without a meaningful
/// angle/height/ring the extra fields are zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Placement {
    pub position: Vec3,
    /// Azimuth around the Y axis, radians.
    pub angle: f32,
    /// Signed height along the Y axis.
    pub height: f32,
    /// Distance from the Y axis.
    pub ring_radius: f32,
}

/// Layout strategy selected per gallery variant.
#[derive(Clone, Copy, Debug)]
pub enum LayoutStrategy {
    /// Near-uniform coverage of a sphere surface; no two surfaces coincide
    /// for any count.
    FibonacciSphere { radius: f32 },
    /// Seeded uniform scatter over a bounded XZ square at a fixed height.
    PlanarScatter { half_extent: f32, y: f32, seed: u64 },
    /// Cylinder lateral surface with seeded angular/radial/height jitter.
    /// `jitter` is the fraction of the unjittered spacing each surface may
    /// deviate by.
    Tunnel {
        radius: f32,
        length: f32,
        ring_segments: u32,
        jitter: f32,
        seed: u64,
    },
    /// Depth train along -Z: surface `i` at `-i * spacing`.
    Stack { spacing: f32, y_offset: f32 },
}

/// Spherical Fibonacci point `index` of `total` on a sphere of `radius`.
pub fn fibonacci_sphere_point(index: usize, total: usize, radius: f32) -> Vec3 {
    let i = index as f32 + 0.5;
    let n = total.max(1) as f32;
    let phi = (1.0 - 2.0 * i / n).clamp(-1.0, 1.0).acos();
    let theta = PI * (1.0 + 5.0_f32.sqrt()) * i;
    Vec3::new(
        radius * theta.cos() * phi.sin(),
        radius * theta.sin() * phi.sin(),
        radius * phi.cos(),
    )
}

impl LayoutStrategy {
    /// Compute all placements for `count` surfaces.
    pub fn place(&self, count: usize) -> Vec<Placement> {
        match *self {
            LayoutStrategy::FibonacciSphere { radius } => (0..count)
                .map(|i| {
                    let position = fibonacci_sphere_point(i, count, radius);
                    Placement {
                        position,
                        angle: position.z.atan2(position.x),
                        height: position.y,
                        ring_radius: (position.x * position.x + position.z * position.z).sqrt(),
                    }
                })
                .collect(),

            LayoutStrategy::PlanarScatter { half_extent, y, seed } => {
                let mut rng = XorShift64::new(seed);
                (0..count)
                    .map(|_| {
                        let x = rng.next_signed() * half_extent;
                        let z = rng.next_signed() * half_extent;
                        Placement {
                            position: Vec3::new(x, y, z),
                            angle: z.atan2(x),
                            height: y,
                            ring_radius: (x * x + z * z).sqrt(),
                        }
                    })
                    .collect()
            }

            LayoutStrategy::Tunnel { radius, length, ring_segments, jitter, seed } => {
                let mut rng = XorShift64::new(seed);
                let segments = ring_segments.max(1) as f32;
                (0..count)
                    .map(|i| {
                        let base_angle = PI * 2.0 * i as f32 / count.max(1) as f32;
                        let height_fraction = (i as f32 % segments) / segments;
                        // Jitter breaks the regular grid without letting
                        // neighbours swap places.
                        let angle = base_angle + rng.next_signed() * jitter;
                        let height_offset = rng.next_signed() * jitter * 0.5;
                        let ring_radius = radius * (1.0 + rng.next_signed() * jitter);
                        let height = (height_fraction + height_offset) * length - length / 2.0;
                        Placement {
                            position: Vec3::new(
                                angle.cos() * ring_radius,
                                height,
                                angle.sin() * ring_radius,
                            ),
                            angle,
                            height,
                            ring_radius,
                        }
                    })
                    .collect()
            }

            LayoutStrategy::Stack { spacing, y_offset } => (0..count)
                .map(|i| {
                    let z = -(i as f32) * spacing;
                    Placement {
                        position: Vec3::new(0.0, y_offset, z),
                        angle: 0.0,
                        height: y_offset,
                        ring_radius: z.abs(),
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_pairwise_distance(points: &[Vec3]) -> f32 {
        let mut min = f32::MAX;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                min = min.min(points[i].distance(points[j]));
            }
        }
        min
    }

    #[test]
    fn test_fibonacci_points_on_radius() {
        for n in [1usize, 2, 6, 17, 100] {
            for i in 0..n {
                let p = fibonacci_sphere_point(i, n, 3.0);
                assert!(
                    (p.length() - 3.0).abs() < 1e-5,
                    "n={} i={} len={}",
                    n,
                    i,
                    p.length()
                );
            }
        }
    }

    #[test]
    fn test_fibonacci_six_images_radius_three() {
        let placements = LayoutStrategy::FibonacciSphere { radius: 3.0 }.place(6);
        assert_eq!(placements.len(), 6);
        for p in &placements {
            assert!((p.position.length() - 3.0).abs() < 1e-6);
        }
        let points: Vec<Vec3> = placements.iter().map(|p| p.position).collect();
        assert!(min_pairwise_distance(&points) > 0.1);
    }

    #[test]
    fn test_fibonacci_separation_shrinks_with_count() {
        let mut prev = f32::MAX;
        for n in [4usize, 16, 64, 256] {
            let points: Vec<Vec3> = (0..n).map(|i| fibonacci_sphere_point(i, n, 1.0)).collect();
            let sep = min_pairwise_distance(&points);
            assert!(sep > 0.0);
            assert!(sep < prev, "separation should shrink as n grows");
            prev = sep;
        }
    }

    #[test]
    fn test_tunnel_jitter_bounded_and_deterministic() {
        let strategy = LayoutStrategy::Tunnel {
            radius: 20.0,
            length: 60.0,
            ring_segments: 32,
            jitter: 0.1,
            seed: 9,
        };
        let a = strategy.place(200);
        let b = strategy.place(200);
        assert_eq!(a.len(), 200);
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.position, pb.position);
            assert!(pa.ring_radius >= 20.0 * 0.9 - 1e-4);
            assert!(pa.ring_radius <= 20.0 * 1.1 + 1e-4);
            assert!(pa.height.abs() <= 60.0 / 2.0 + 60.0 * 0.05 + 1e-4);
        }
    }

    #[test]
    fn test_planar_scatter_stays_in_bounds() {
        let strategy = LayoutStrategy::PlanarScatter { half_extent: 5.0, y: 0.5, seed: 3 };
        for p in strategy.place(64) {
            assert!(p.position.x.abs() <= 5.0);
            assert!(p.position.z.abs() <= 5.0);
            assert_eq!(p.position.y, 0.5);
        }
    }

    #[test]
    fn test_stack_depth_train() {
        let placements = LayoutStrategy::Stack { spacing: 1.5, y_offset: 1.0 }.place(4);
        for (i, p) in placements.iter().enumerate() {
            assert_eq!(p.position.z, -(i as f32) * 1.5);
            assert_eq!(p.position.y, 1.0);
        }
    }

    #[test]
    fn test_empty_count() {
        assert!(LayoutStrategy::FibonacciSphere { radius: 1.0 }.place(0).is_empty());
        assert!(LayoutStrategy::Stack { spacing: 1.0, y_offset: 0.0 }.place(0).is_empty());
    }
}
