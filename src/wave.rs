//! Ocean wave field for the flat-scattered gallery.
//!
//! The height field combines three sine waves at different frequencies and
//! travel directions, attenuated toward the edge of the visible area. Pure
//! functions of (position, time, parameters).

/// Inputs the field reads each frame, snapshotted from the live settings.
#[derive(Clone, Copy, Debug)]
pub struct WaveParams {
    pub amplitude: f32,
    pub frequency: f32,
    /// Overall height multiplier (the "oceanic" swell size).
    pub scale: f32,
    /// Half extent of the bounded area, for the center falloff.
    pub half_extent: f32,
    pub y_offset: f32,
}

/// Sample-space scale: world coordinates are compressed before being fed to
/// the sine terms so one swell spans several surfaces.
const SAMPLE_SCALE: f32 = 0.1;

/// Raw wave displacement at world position (x, z).
pub fn wave_height(x: f32, z: f32, time: f32, p: &WaveParams) -> f32 {
    let sx = x * SAMPLE_SCALE;
    let sz = z * SAMPLE_SCALE;
    let f = p.frequency;

    let dist = (sx * sx + sz * sz).sqrt();
    let falloff = (1.0 - dist / p.half_extent.max(1e-4)).max(0.0);

    let wave1 = (sx * f + time).sin() * (sz * f + time).cos();
    let wave2 = ((sx + sz) * f * 0.5 + time * 1.2).sin();
    let wave3 = (sx * f * 0.8 - sz * f * 0.3 + time * 0.7).cos();

    (wave1 + wave2 + wave3) * p.amplitude * p.scale * falloff
}

/// Vertical position and tilt for a surface lying on the field.
///
/// The height is clamped to ±amplitude around the rest height and the tilts
/// are clamped so surfaces never flip.
pub fn wave_surface_pose(x: f32, z: f32, time: f32, p: &WaveParams) -> (f32, f32, f32) {
    let wave = wave_height(x, z, time, p);
    let y = (p.y_offset + wave).clamp(p.y_offset - p.amplitude, p.y_offset + p.amplitude);
    let tilt_x = (wave * 0.1).clamp(-0.3, 0.3);
    let tilt_z = (wave * 0.05).clamp(-0.2, 0.2);
    (y, tilt_x, tilt_z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> WaveParams {
        WaveParams {
            amplitude: 1.4,
            frequency: 6.2,
            scale: 4.1,
            half_extent: 8.0,
            y_offset: 0.0,
        }
    }

    #[test]
    fn test_height_deterministic() {
        let p = params();
        assert_eq!(wave_height(1.0, 2.0, 3.0, &p), wave_height(1.0, 2.0, 3.0, &p));
    }

    #[test]
    fn test_surface_height_clamped() {
        let p = params();
        for i in 0..300 {
            let x = (i as f32 * 0.37).sin() * 10.0;
            let z = (i as f32 * 0.61).cos() * 10.0;
            let (y, tx, tz) = wave_surface_pose(x, z, i as f32 * 0.1, &p);
            assert!(y >= p.y_offset - p.amplitude - 1e-6);
            assert!(y <= p.y_offset + p.amplitude + 1e-6);
            assert!(tx.abs() <= 0.3 + 1e-6);
            assert!(tz.abs() <= 0.2 + 1e-6);
        }
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        let mut p = params();
        p.amplitude = 0.0;
        let (y, tx, tz) = wave_surface_pose(3.0, -2.0, 5.0, &p);
        assert_eq!(y, p.y_offset);
        assert_eq!(tx, 0.0);
        assert_eq!(tz, 0.0);
    }

    #[test]
    fn test_falloff_zeroes_far_field() {
        let p = params();
        // SAMPLE_SCALE compresses coordinates, so go far out in world space.
        let far = p.half_extent / SAMPLE_SCALE * 2.0;
        assert_eq!(wave_height(far, 0.0, 1.0, &p), 0.0);
    }

    #[test]
    fn test_degenerate_half_extent() {
        let mut p = params();
        p.half_extent = 0.0;
        let h = wave_height(0.5, 0.5, 1.0, &p);
        assert!(h.is_finite());
    }
}
