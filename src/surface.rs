//! Image surfaces: flat textured quads with per-instance motion profiles.

use glam::{Quat, Vec3};

use crate::layout::Placement;
use crate::motion::XorShift64;

/// Load state of a surface's texture. The renderer substitutes a placeholder
/// material until pixels arrive; a failed load stays on the placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextureSlot {
    #[default]
    Pending,
    Ready,
    Failed,
}

/// Per-surface animation constants, fixed at creation so surfaces stay
/// desynchronized from each other for the lifetime of the instance.
#[derive(Clone, Copy, Debug)]
pub struct MotionProfile {
    pub frequency: f32,
    pub phase: f32,
    pub amplitude: f32,
    pub turbulence: f32,
    /// Spiral drift speed around the tunnel axis, radians per time unit.
    pub spin: f32,
}

impl MotionProfile {
    pub fn from_rng(rng: &mut XorShift64) -> Self {
        Self {
            frequency: rng.next_range(0.3, 0.7),
            phase: rng.next_f32() * std::f32::consts::TAU,
            amplitude: rng.next_range(0.5, 0.8),
            turbulence: rng.next_range(0.3, 0.7),
            spin: rng.next_signed() * 0.01,
        }
    }

    /// A profile that holds still. Used by variants whose motion comes
    /// entirely from closed-form fields rather than per-surface oscillation.
    pub fn still() -> Self {
        Self {
            frequency: 0.0,
            phase: 0.0,
            amplitude: 0.0,
            turbulence: 0.0,
            spin: 0.0,
        }
    }
}

/// A flat renderable quad bound to one source image (or to no image, for the
/// untextured accent shapes). Base fields come from layout and never change;
/// the live transform is rewritten every frame.
#[derive(Clone, Debug)]
pub struct ImageSurface {
    /// Index into the instance's image list, or None for accents.
    pub image_index: Option<usize>,
    pub base_position: Vec3,
    pub base_size: f32,
    /// Cylindrical placement coordinates, used by the tunnel flow.
    pub angle: f32,
    pub height: f32,
    pub ring_radius: f32,
    pub profile: MotionProfile,

    // Live display transform.
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub opacity: f32,
    /// Grey-level brightness multiplier applied to the texture.
    pub brightness: f32,

    pub texture: TextureSlot,
}

impl ImageSurface {
    pub fn new(
        image_index: Option<usize>,
        placement: Placement,
        base_size: f32,
        profile: MotionProfile,
    ) -> Self {
        Self {
            image_index,
            base_position: placement.position,
            base_size,
            angle: placement.angle,
            height: placement.height,
            ring_radius: placement.ring_radius,
            profile,
            position: placement.position,
            rotation: Quat::IDENTITY,
            scale: Vec3::new(base_size, base_size, 1.0),
            opacity: 1.0,
            brightness: 1.0,
            texture: TextureSlot::Pending,
        }
    }

    /// Reset the live transform to the placed position at base scale.
    pub fn snap_to_base(&mut self) {
        self.position = self.base_position;
        self.rotation = Quat::IDENTITY;
        self.scale = Vec3::new(self.base_size, self.base_size, 1.0);
        self.opacity = 1.0;
    }

    /// Radius of the bounding sphere of the scaled quad (half diagonal),
    /// used for pointer picking.
    pub fn pick_radius(&self) -> f32 {
        let extent = self.scale.x.abs().max(self.scale.y.abs());
        extent * std::f32::consts::SQRT_2 * 0.5
    }
}
