//! Shared animation math: easing, interpolation, smoothing, deterministic noise.
//!
//! Everything here is a pure function (or a tiny deterministic RNG), so the
//! per-frame updaters built on top of it can be unit tested without a render
//! loop.

/// Cubic ease-in-out with zero velocity at both ends.
///
/// `4t^3` for `t < 0.5`, else `1 - (-2t + 2)^3 / 2`. The card-stack
/// transition depends on this exact curve.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Linear interpolation.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of the remaining distance to a target covered after `dt` seconds
/// when approaching with time constant `tau`.
///
/// Frame-rate independent replacement for the `value += (target - value) * k`
/// per-frame idiom.
pub fn approach_alpha(dt: f32, tau: f32) -> f32 {
    1.0 - (-dt / tau.max(1e-6)).exp()
}

/// Deterministic 3D value noise built from fixed-frequency trig products.
///
/// Smooth in all three inputs and bounded to [-1, 1]. No hidden state: the
/// same inputs always produce the same output.
pub fn trig_noise3(x: f32, y: f32, z: f32) -> f32 {
    (x * 1.5 + z * 0.5).sin() * (y * 1.2).cos() * 0.5
        + (x * 2.5 + y * 1.5).sin() * (z * 1.8).sin() * 0.3
        + (x * 3.0 + z * 2.0).cos() * (y * 2.5).sin() * 0.2
}

/// xorshift64 PRNG for seed-derived per-surface variation.
///
/// Deterministic given its seed; used only at construction time so layout
/// jitter and motion profiles are fixed for the lifetime of an instance.
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        // Seed 0 is degenerate (xorshift would emit zeros forever).
        let state = if seed == 0 { 0x5DEECE66D } else { seed };
        Self { state }
    }

    /// Next value in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        // Use the top 24 bits for a clean mantissa.
        ((self.state >> 40) as f32) / ((1u32 << 24) as f32)
    }

    /// Next value in [-1, 1).
    pub fn next_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }

    /// Next value in [lo, hi).
    pub fn next_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_exact_curve() {
        // 4t^3 on the first half
        assert!((ease_in_out_cubic(0.25) - 4.0 * 0.25f32.powi(3)).abs() < 1e-6);
        // 1 - (-2t+2)^3 / 2 on the second half
        let t = 0.75f32;
        let expected = 1.0 - (-2.0 * t + 2.0).powi(3) / 2.0;
        assert!((ease_in_out_cubic(t) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_ease_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_cubic(i as f32 / 100.0);
            assert!(v >= prev - 1e-6);
            prev = v;
        }
    }

    #[test]
    fn test_ease_clamps_out_of_range_input() {
        assert_eq!(ease_in_out_cubic(-3.0), 0.0);
        assert_eq!(ease_in_out_cubic(7.0), 1.0);
    }

    #[test]
    fn test_noise_deterministic_and_bounded() {
        for i in 0..200 {
            let x = i as f32 * 0.37;
            let a = trig_noise3(x, x * 0.5, -x);
            let b = trig_noise3(x, x * 0.5, -x);
            assert_eq!(a, b);
            assert!(a.abs() <= 1.0);
        }
    }

    #[test]
    fn test_approach_alpha_range() {
        assert!(approach_alpha(0.0, 0.3) < 1e-6);
        let a = approach_alpha(1.0 / 60.0, 0.3);
        assert!(a > 0.0 && a < 1.0);
        // Longer dt closes more of the distance.
        assert!(approach_alpha(0.1, 0.3) > a);
    }

    #[test]
    fn test_xorshift_deterministic() {
        let mut a = XorShift64::new(42);
        let mut b = XorShift64::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn test_xorshift_zero_seed_not_degenerate() {
        let mut rng = XorShift64::new(0);
        let first = rng.next_f32();
        let second = rng.next_f32();
        assert!((first - second).abs() > 1e-6 || first != 0.0);
    }

    #[test]
    fn test_xorshift_range() {
        let mut rng = XorShift64::new(7);
        for _ in 0..1000 {
            let v = rng.next_range(0.3, 0.7);
            assert!((0.3..0.7).contains(&v));
        }
    }
}
