//! Gallery instance: the owned per-mount context that the frame loop drives.
//!
//! One `GalleryInstance` owns its surfaces, camera state, settings and
//! variant-specific animation state. The shells (window, canvas, offline
//! renderer) call `tick(dt)` once per scheduled frame; within a tick the
//! camera is updated strictly before surface transforms so surfaces react to
//! the same frame's pose. A single-use cancellation token is checked at the
//! top of every tick, which is what guarantees no frame runs after teardown
//! begins.

use std::f32::consts::FRAC_PI_2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::camera::{CameraPose, OrbitController};
use crate::layout::{LayoutStrategy, Placement};
use crate::morph::{tunnel_morph, BoundaryMesh, TUNNEL_LENGTH, TUNNEL_RADIUS};
use crate::motion::{approach_alpha, trig_noise3, XorShift64};
use crate::picking::{pick_surface, pointer_ray, HighlightCycler, HIGHLIGHT_CYCLE_SECS};
use crate::readout;
use crate::settings::ControlSettings;
use crate::surface::{ImageSurface, MotionProfile, TextureSlot};
use crate::transition::{
    card_transform, resting_transform, StackParams, TransitionAnimator, TransitionStep,
};
use crate::wave::{wave_surface_pose, WaveParams};

/// Which gallery this instance renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GalleryVariant {
    Sphere,
    Wave,
    Stack,
    Tunnel,
}

impl GalleryVariant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sphere" => Some(Self::Sphere),
            "wave" => Some(Self::Wave),
            "stack" => Some(Self::Stack),
            "tunnel" => Some(Self::Tunnel),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Wave => "wave",
            Self::Stack => "stack",
            Self::Tunnel => "tunnel",
        }
    }
}

/// Single-use teardown flag shared between an instance and its frame loop.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-frame positions of the decorative chrome (wireframes, grids, border).
#[derive(Clone, Copy, Debug)]
pub struct ChromeState {
    pub sphere_rotation: Quat,
    pub grid_offset_y: f32,
    pub boundary_offset_y: f32,
    pub tunnel_scale: f32,
    /// Side length of the wave field, for the grid/boundary chrome.
    pub wave_extent: f32,
    pub highlight: Option<usize>,
}

impl Default for ChromeState {
    fn default() -> Self {
        Self {
            sphere_rotation: Quat::IDENTITY,
            grid_offset_y: 0.0,
            boundary_offset_y: 0.0,
            tunnel_scale: 1.0,
            wave_extent: 0.0,
            highlight: None,
        }
    }
}

const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

// Sphere variant tuning.
const SPHERE_RADIUS: f32 = 3.0;
const SPHERE_CAMERA_Z: f32 = 12.0;
const SPHERE_FOV: f32 = 45.0;
const SPHERE_BASE_SIZES: [f32; 5] = [0.8, 1.0, 1.1, 1.2, 1.4];
const SPHERE_DIMMED: f32 = 0.8;
/// Time constant for the gentle pointer-follow camera drift.
const PARALLAX_TAU: f32 = 0.33;

// Wave variant tuning.
const WAVE_FOV: f32 = 45.0;
const WAVE_IMAGE_SIZE: f32 = 2.0;
const WAVE_CLOCK_RATE: f32 = 0.6;

// Stack variant tuning.
const STACK_FOV: f32 = 45.0;
const STACK_CARD_SIZE: f32 = 4.0;

// Tunnel variant tuning.
const TUNNEL_FOV: f32 = 75.0;
const TUNNEL_PARTICLES: usize = 200;
/// Fraction of the regular grid spacing each particle may deviate by.
const TUNNEL_JITTER: f32 = 0.1;
const TUNNEL_BASE_SIZE: f32 = 1.5;
const TUNNEL_CLOCK_RATE: f32 = 0.18;
const TUNNEL_SPIN_RATE_1: f32 = 0.12;
const TUNNEL_SPIN_RATE_2: f32 = 0.18;
const TUNNEL_ZOOM_BASE: f32 = 13.5;
const TUNNEL_ZOOM_SPAN: f32 = 1.5;

/// Longest tick accepted; protects the closed-form animation from huge jumps
/// after the host was suspended.
const MAX_TICK_SECS: f32 = 0.1;

enum VariantState {
    Sphere {
        controller: OrbitController,
        cycler: HighlightCycler,
        highlight: Option<usize>,
        parallax: Vec2,
    },
    Wave {
        clock: f32,
        parallax: Vec2,
        half_extent: f32,
    },
    Stack {
        animator: TransitionAnimator,
        active: usize,
    },
    Tunnel {
        clock: f32,
        angle1: f32,
        angle2: f32,
        boundary: BoundaryMesh,
    },
}

pub struct GalleryInstance {
    variant: GalleryVariant,
    settings: ControlSettings,
    surfaces: Vec<ImageSurface>,
    image_count: usize,
    pose: CameraPose,
    width: f32,
    height: f32,
    /// Latest pointer position in normalized device coordinates.
    pointer_ndc: Option<Vec2>,
    state: VariantState,
    cancel: CancelToken,
}

impl GalleryInstance {
    pub fn new(variant: GalleryVariant, image_count: usize, width: u32, height: u32) -> Self {
        Self::with_seed(variant, image_count, width, height, DEFAULT_SEED)
    }

    pub fn with_seed(
        variant: GalleryVariant,
        image_count: usize,
        width: u32,
        height: u32,
        seed: u64,
    ) -> Self {
        // Sizes/profiles draw from a stream decorrelated from the layout
        // jitter, which hashes the raw seed itself.
        let mut rng = XorShift64::new(seed ^ 0xA24B_AED4_963E_E407);
        let (settings, surfaces, pose, state) = match variant {
            GalleryVariant::Sphere => build_sphere(image_count, &mut rng),
            GalleryVariant::Wave => {
                build_wave(image_count, width as f32, height as f32, seed, &mut rng)
            }
            GalleryVariant::Stack => build_stack(image_count),
            GalleryVariant::Tunnel => build_tunnel(image_count, seed, &mut rng),
        };
        Self {
            variant,
            settings,
            surfaces,
            image_count,
            pose,
            width: width as f32,
            height: height as f32,
            pointer_ndc: None,
            state,
            cancel: CancelToken::default(),
        }
    }

    pub fn variant(&self) -> GalleryVariant {
        self.variant
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn surfaces(&self) -> &[ImageSurface] {
        &self.surfaces
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &ControlSettings {
        &self.settings
    }

    pub fn set_setting(&mut self, name: &str, value: f32) -> bool {
        self.settings.set(name, value)
    }

    pub fn settings_json(&self) -> String {
        self.settings.to_json()
    }

    pub fn apply_settings_json(&mut self, json: &str) -> anyhow::Result<usize> {
        self.settings.apply_json(json)
    }

    /// Record that an image's pixels arrived (or failed) so its surfaces can
    /// drop the placeholder material.
    pub fn set_texture_state(&mut self, image_index: usize, slot: TextureSlot) {
        for s in &mut self.surfaces {
            if s.image_index == Some(image_index) {
                s.texture = slot;
            }
        }
    }

    /// Number of image surfaces still waiting for pixels.
    pub fn textures_pending(&self) -> usize {
        self.surfaces
            .iter()
            .filter(|s| s.image_index.is_some() && s.texture == TextureSlot::Pending)
            .count()
    }

    /// Container size changed; camera aspect follows on the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }

    pub fn pointer_pressed(&mut self, x: f32, y: f32) {
        if let VariantState::Sphere { controller, .. } = &mut self.state {
            controller.pointer_down(x, y);
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        self.pointer_ndc = Some(Vec2::new((x / w) * 2.0 - 1.0, -((y / h) * 2.0 - 1.0)));
        if let VariantState::Sphere { controller, .. } = &mut self.state {
            controller.pointer_move(x, y);
        }
    }

    pub fn pointer_released(&mut self) {
        if let VariantState::Sphere { controller, .. } = &mut self.state {
            controller.pointer_up();
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer_ndc = None;
        if let VariantState::Sphere { controller, .. } = &mut self.state {
            controller.pointer_leave();
        }
    }

    /// Highlighted surface index, if this variant highlights one.
    pub fn highlight(&self) -> Option<usize> {
        match &self.state {
            VariantState::Sphere { highlight, .. } => *highlight,
            _ => None,
        }
    }

    /// Card index currently at the front of the stack.
    pub fn active_index(&self) -> usize {
        match &self.state {
            VariantState::Stack { active, .. } => *active,
            _ => 0,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        match &self.state {
            VariantState::Stack { animator, .. } => animator.is_transitioning(),
            _ => false,
        }
    }

    /// Morphing tunnel boundary segments, when this variant has one.
    pub fn boundary_segments(&self) -> Option<&[[Vec3; 2]]> {
        match &self.state {
            VariantState::Tunnel { boundary, .. } => Some(&boundary.segments),
            _ => None,
        }
    }

    pub fn chrome(&self) -> ChromeState {
        match &self.state {
            VariantState::Sphere { controller, highlight, .. } => ChromeState {
                sphere_rotation: Quat::from_euler(EulerRot::YXZ, controller.yaw, controller.pitch, 0.0),
                highlight: *highlight,
                ..Default::default()
            },
            VariantState::Wave { clock, half_extent, .. } => ChromeState {
                grid_offset_y: (clock * 0.2).sin() * 0.2,
                boundary_offset_y: (clock * 0.15).sin() * 0.1,
                wave_extent: half_extent * 2.0,
                ..Default::default()
            },
            VariantState::Tunnel { clock, .. } => ChromeState {
                tunnel_scale: 1.2 + (clock * 0.2).sin() * 0.05,
                ..Default::default()
            },
            VariantState::Stack { .. } => ChromeState::default(),
        }
    }

    /// Camera coordinates for the diagnostics readout.
    pub fn camera_text(&self) -> String {
        readout::camera_text(&self.pose)
    }

    /// Morph coefficients for the diagnostics readout (tunnel only).
    pub fn morph_text(&self) -> Option<String> {
        match &self.state {
            VariantState::Tunnel { clock, .. } => Some(readout::morph_text(*clock, &self.pose)),
            _ => None,
        }
    }

    /// Advance one frame. Returns false (doing nothing) once cancelled.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let dt = dt.clamp(0.0, MAX_TICK_SECS);
        let (width, height) = (self.width, self.height);
        let pointer = self.pointer_ndc;

        match &mut self.state {
            VariantState::Sphere { controller, cycler, highlight, parallax } => {
                controller.tick(dt);
                // Camera: fixed depth, gentle pointer-follow drift while not
                // dragging.
                if !controller.is_dragging() {
                    let target = pointer.map(|p| p * 0.5).unwrap_or(Vec2::ZERO);
                    *parallax += (target - *parallax) * approach_alpha(dt, PARALLAX_TAU);
                }
                self.pose = CameraPose::new(
                    Vec3::new(parallax.x, parallax.y, SPHERE_CAMERA_Z),
                    Vec3::ZERO,
                    SPHERE_FOV,
                );

                let rot = Quat::from_euler(EulerRot::YXZ, controller.yaw, controller.pitch, 0.0);
                for s in &mut self.surfaces {
                    let world = rot * s.base_position;
                    s.position = world;
                    // Billboard: only positions orbit, quads keep facing the
                    // camera plane.
                    s.rotation = Quat::IDENTITY;
                    let dist = world.length();
                    let mult = (1.0 - dist * 0.1).max(0.6);
                    s.scale = Vec3::new(s.base_size * mult, s.base_size * mult, 1.0);
                    s.opacity = 1.0;
                }

                cycler.advance(dt, self.surfaces.len());
                let hit = pointer.and_then(|p| {
                    let (origin, dir) = pointer_ray(p.x, p.y, &self.pose, width, height);
                    pick_surface(&self.surfaces, origin, dir)
                });
                let selected = match hit {
                    Some(i) => Some(i),
                    None if self.surfaces.is_empty() => None,
                    None => Some(cycler.index()),
                };
                *highlight = selected;
                for (i, s) in self.surfaces.iter_mut().enumerate() {
                    s.brightness = if Some(i) == selected { 1.0 } else { SPHERE_DIMMED };
                }
            }

            VariantState::Wave { clock, parallax, half_extent } => {
                let speed = self.settings.value("waveSpeed");
                *clock += dt * WAVE_CLOCK_RATE * speed;

                let cam_x = self.settings.value("cameraX");
                let cam_y = self.settings.value("cameraY");
                let cam_z = self.settings.value("cameraZ");
                let target = pointer
                    .map(|p| Vec2::new(p.x * 2.0, cam_y + p.y))
                    .unwrap_or(Vec2::new(cam_x, cam_y));
                *parallax += (target - *parallax) * approach_alpha(dt, PARALLAX_TAU);
                self.pose = CameraPose::new(
                    Vec3::new(parallax.x, parallax.y, cam_z),
                    Vec3::ZERO,
                    WAVE_FOV,
                );

                let params = WaveParams {
                    amplitude: self.settings.value("waveAmplitude"),
                    frequency: self.settings.value("waveFrequency"),
                    scale: self.settings.value("oceanicScale"),
                    half_extent: *half_extent,
                    y_offset: self.settings.value("yOffset"),
                };
                let brightness = self.settings.value("brightness");
                for s in &mut self.surfaces {
                    let (y, tilt_x, tilt_z) =
                        wave_surface_pose(s.base_position.x, s.base_position.z, *clock, &params);
                    s.position = Vec3::new(s.base_position.x, y, s.base_position.z);
                    s.rotation = Quat::from_euler(EulerRot::XYZ, -FRAC_PI_2 + tilt_x, 0.0, tilt_z);
                    if s.image_index.is_some() {
                        s.brightness = brightness;
                    }
                }
            }

            VariantState::Stack { animator, active } => {
                self.pose = CameraPose::new(
                    Vec3::new(
                        self.settings.value("cameraX"),
                        self.settings.value("cameraY"),
                        self.settings.value("cameraZ"),
                    ),
                    Vec3::ZERO,
                    STACK_FOV,
                );

                let count = self.surfaces.len();
                if count > 0 {
                    animator.configure(
                        self.settings.value("cycleSeconds"),
                        self.settings.value("moveSpeed"),
                    );
                    let params = StackParams {
                        spacing: self.settings.value("spacing"),
                        y_offset: self.settings.value("yOffset"),
                        x_rotation: self.settings.value("xRotation"),
                    };
                    let center = count / 2;
                    let step = animator.advance(dt);
                    if step == TransitionStep::Completed {
                        *active = (*active + 1) % count;
                    }
                    let brightness = self.settings.value("brightness");
                    for (i, s) in self.surfaces.iter_mut().enumerate() {
                        let rel = (i + count - *active) % count;
                        let card = match animator.progress() {
                            Some(progress) => card_transform(rel, count, center, progress, &params),
                            // Idle frames (and the completion snap) rest on
                            // the exact canonical transforms.
                            None => resting_transform(rel, center, &params),
                        };
                        s.position = Vec3::new(0.0, card.y, card.z);
                        s.rotation = Quat::from_rotation_x(card.rot_x);
                        s.scale =
                            Vec3::new(s.base_size * card.scale, s.base_size * card.scale, 1.0);
                        s.opacity = card.opacity;
                        s.brightness = brightness;
                    }
                }
            }

            VariantState::Tunnel { clock, angle1, angle2, boundary } => {
                *clock += dt * TUNNEL_CLOCK_RATE;
                *angle1 += dt * TUNNEL_SPIN_RATE_1;
                *angle2 += dt * TUNNEL_SPIN_RATE_2;
                let time = *clock;

                let zoom = TUNNEL_ZOOM_BASE + (time * 0.1).sin() * TUNNEL_ZOOM_SPAN;
                let rot = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), *angle1)
                    * Quat::from_axis_angle(Vec3::new(0.0, 1.0, 1.0).normalize(), *angle2);
                self.pose = CameraPose::new(rot * Vec3::splat(zoom), Vec3::ZERO, TUNNEL_FOV);
                let pose = self.pose;

                for s in &mut self.surfaces {
                    let p = s.profile;
                    let flow = time * p.frequency * 0.3;
                    let height_osc = (flow + p.phase).sin() * p.amplitude * 0.7;
                    let spiral = s.angle + time * p.spin * 0.5;

                    let m = tunnel_morph(spiral, s.height, time, &pose);
                    let morphed_radius = s.ring_radius * m.radius_mult;
                    let morphed_height = s.height + m.height_offset * 0.7;
                    let radius_osc = (flow * 2.0 + p.phase).cos() * p.turbulence * 0.5;
                    let noise = trig_noise3(
                        spiral.cos() * (morphed_radius + radius_osc),
                        morphed_height + height_osc,
                        spiral.sin() * (morphed_radius + radius_osc),
                    ) * 0.5;

                    let r = morphed_radius + radius_osc + noise;
                    s.position =
                        Vec3::new(spiral.cos() * r, morphed_height + height_osc, spiral.sin() * r);

                    // Face the tunnel axis, then trim tangentially so quads
                    // ride the flow instead of staring straight inward.
                    let inward =
                        Vec3::new(-s.position.x, 0.0, -s.position.z).normalize_or_zero();
                    let facing = if inward.length_squared() > 0.0 {
                        Quat::from_rotation_arc(Vec3::Z, inward)
                    } else {
                        Quat::IDENTITY
                    };
                    s.rotation = facing
                        * Quat::from_rotation_y(FRAC_PI_2 + noise * 0.1)
                        * Quat::from_rotation_z(flow.sin() * 0.05);
                    s.scale = Vec3::new(s.base_size, s.base_size, 1.0);
                }

                boundary.update(time, &pose);
            }
        }

        true
    }
}

fn build_sphere(
    image_count: usize,
    rng: &mut XorShift64,
) -> (ControlSettings, Vec<ImageSurface>, CameraPose, VariantState) {
    let placements = LayoutStrategy::FibonacciSphere { radius: SPHERE_RADIUS }.place(image_count);
    let surfaces = placements
        .into_iter()
        .enumerate()
        .map(|(i, placement)| {
            // Biased toward the smaller sizes.
            let pick = (rng.next_f32().powf(1.5) * SPHERE_BASE_SIZES.len() as f32) as usize;
            let size = SPHERE_BASE_SIZES[pick.min(SPHERE_BASE_SIZES.len() - 1)];
            ImageSurface::new(Some(i), placement, size, MotionProfile::still())
        })
        .collect();
    (
        ControlSettings::empty(),
        surfaces,
        CameraPose::new(Vec3::new(0.0, 0.0, SPHERE_CAMERA_Z), Vec3::ZERO, SPHERE_FOV),
        VariantState::Sphere {
            controller: OrbitController::default(),
            cycler: HighlightCycler::new(HIGHLIGHT_CYCLE_SECS),
            highlight: None,
            parallax: Vec2::ZERO,
        },
    )
}

fn build_wave(
    image_count: usize,
    width: f32,
    height: f32,
    seed: u64,
    rng: &mut XorShift64,
) -> (ControlSettings, Vec<ImageSurface>, CameraPose, VariantState) {
    let settings = ControlSettings::wave();
    let cam_z = settings.value("cameraZ");
    let spacing = settings.value("spacing");
    let y_offset = settings.value("yOffset");

    // Bound the field to what the camera can see.
    let visible_height = 2.0 * (WAVE_FOV.to_radians() / 2.0).tan() * cam_z.abs().max(0.1);
    let visible_width = visible_height * crate::camera::aspect_ratio(width, height);
    let grid = ((image_count as f32).sqrt().ceil() as u32 * 2).max(2);
    let total_width = (visible_width * 0.7).min(grid as f32 * spacing);
    let half_extent = (total_width / 2.0).max(0.5);

    let mut surfaces: Vec<ImageSurface> =
        LayoutStrategy::PlanarScatter { half_extent, y: y_offset, seed }
            .place(image_count)
            .into_iter()
            .enumerate()
            .map(|(i, placement)| {
                ImageSurface::new(Some(i), placement, WAVE_IMAGE_SIZE, MotionProfile::still())
            })
            .collect();

    // Untextured accent shapes fill out the field.
    let accent_sites = (grid * grid / 2) as usize;
    for _ in 0..accent_sites {
        let x = rng.next_signed() * half_extent;
        let z = rng.next_signed() * half_extent;
        let shapes = 1 + (rng.next_f32() * 2.0) as usize;
        for _ in 0..shapes {
            let size = 0.5 + rng.next_f32();
            let placement = Placement {
                position: Vec3::new(x, y_offset, z),
                angle: 0.0,
                height: y_offset,
                ring_radius: (x * x + z * z).sqrt(),
            };
            let mut accent =
                ImageSurface::new(None, placement, size, MotionProfile::still());
            accent.opacity = 0.1 + rng.next_f32() * 0.2;
            accent.brightness = 0.0;
            surfaces.push(accent);
        }
    }

    let pose = CameraPose::new(
        Vec3::new(settings.value("cameraX"), settings.value("cameraY"), cam_z),
        Vec3::ZERO,
        WAVE_FOV,
    );
    let parallax = Vec2::new(settings.value("cameraX"), settings.value("cameraY"));
    (
        settings,
        surfaces,
        pose,
        VariantState::Wave { clock: 0.0, parallax, half_extent },
    )
}

fn build_stack(
    image_count: usize,
) -> (ControlSettings, Vec<ImageSurface>, CameraPose, VariantState) {
    let settings = ControlSettings::stack();
    let spacing = settings.value("spacing");
    let y_offset = settings.value("yOffset");
    let params = StackParams {
        spacing,
        y_offset,
        x_rotation: settings.value("xRotation"),
    };
    let center = image_count / 2;

    let mut surfaces: Vec<ImageSurface> = LayoutStrategy::Stack { spacing, y_offset }
        .place(image_count)
        .into_iter()
        .enumerate()
        .map(|(i, placement)| {
            ImageSurface::new(Some(i), placement, STACK_CARD_SIZE, MotionProfile::still())
        })
        .collect();
    for (i, s) in surfaces.iter_mut().enumerate() {
        let card = resting_transform(i, center, &params);
        s.position = Vec3::new(0.0, card.y, card.z);
        s.scale = Vec3::new(s.base_size * card.scale, s.base_size * card.scale, 1.0);
    }

    let animator =
        TransitionAnimator::new(settings.value("cycleSeconds"), settings.value("moveSpeed"));
    let pose = CameraPose::new(
        Vec3::new(
            settings.value("cameraX"),
            settings.value("cameraY"),
            settings.value("cameraZ"),
        ),
        Vec3::ZERO,
        STACK_FOV,
    );
    (settings, surfaces, pose, VariantState::Stack { animator, active: 0 })
}

fn build_tunnel(
    image_count: usize,
    seed: u64,
    rng: &mut XorShift64,
) -> (ControlSettings, Vec<ImageSurface>, CameraPose, VariantState) {
    let particle_count = if image_count == 0 { 0 } else { TUNNEL_PARTICLES };
    let surfaces = LayoutStrategy::Tunnel {
        radius: TUNNEL_RADIUS,
        length: TUNNEL_LENGTH,
        ring_segments: 32,
        jitter: TUNNEL_JITTER,
        seed,
    }
    .place(particle_count)
    .into_iter()
    .enumerate()
    .map(|(i, placement)| {
        let size = TUNNEL_BASE_SIZE * rng.next_range(0.8, 1.2);
        let profile = MotionProfile::from_rng(rng);
        let mut s = ImageSurface::new(Some(i % image_count.max(1)), placement, size, profile);
        s.opacity = rng.next_range(0.8, 1.0);
        s
    })
    .collect();

    let pose = CameraPose::new(Vec3::splat(TUNNEL_ZOOM_BASE), Vec3::ZERO, TUNNEL_FOV);
    (
        ControlSettings::empty(),
        surfaces,
        pose,
        VariantState::Tunnel {
            clock: 0.0,
            angle1: 0.0,
            angle2: 0.0,
            boundary: BoundaryMesh::new(32, 16),
        },
    )
}
