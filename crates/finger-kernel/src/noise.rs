//! Coherent noise for wobble: deterministic, continuous, per-finger.
//!
//! Wobble must sway smoothly over time rather than jitter per frame, so it
//! cannot come from an RNG stream. This module provides 1D lattice value
//! noise: integer lattice points are hashed to values in [0, 1] and
//! smoothstep-interpolated between, giving a signal that is repeatable for
//! the same inputs and continuous in time.

use nalgebra::Vector3;

/// Lattice offsets that decorrelate the three axes of one wobble signal.
const AXIS_OFFSETS: [f64; 3] = [0.0, 61.7, 127.3];

/// Spacing between per-finger phase offsets; non-integral so no two fingers
/// ever sample the same lattice cells at the same time.
const PHASE_STRIDE: f64 = 19.37;

/// Deterministic continuous 1D value noise over a hashed integer lattice.
#[derive(Debug, Clone, Copy)]
pub struct ValueNoise {
    seed: u64,
}

impl ValueNoise {
    /// Create a noise field for the given seed.
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Sample the noise at `x`. Returns a value in [0, 1).
    pub fn sample(&self, x: f64) -> f64 {
        let cell = x.floor();
        let frac = x - cell;
        let i = cell as i64;
        let a = self.lattice(i);
        let b = self.lattice(i + 1);
        let s = frac * frac * (3.0 - 2.0 * frac);
        a + (b - a) * s
    }

    /// Hash one lattice point to [0, 1) (splitmix64 finalizer).
    fn lattice(&self, i: i64) -> f64 {
        let mut h = self.seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        h ^= h >> 30;
        h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h ^= h >> 27;
        h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
        h ^= h >> 31;
        (h >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Per-finger wobble signal: three decorrelated noise channels remapped to
/// [-1, 1] and scaled to an amplitude.
#[derive(Debug, Clone, Copy)]
pub struct Wobble {
    noise: ValueNoise,
    phase: f64,
}

impl Wobble {
    /// Noise field seed shared by all fingers; identity comes from the
    /// per-finger phase, not the seed.
    const FIELD_SEED: u64 = 0x0057_0B81;

    /// Create the wobble signal for one finger. Distinct ids get distinct
    /// phases, so two fingers never sway identically at the same time.
    pub fn new(finger_id: u64) -> Self {
        Self {
            noise: ValueNoise::new(Self::FIELD_SEED),
            phase: finger_id as f64 * PHASE_STRIDE,
        }
    }

    /// Sample the wobble offset at `time_s`, with per-axis time multipliers
    /// and a shared amplitude (already scaled by reach length).
    pub fn offset(&self, time_s: f64, rates: &[f64; 3], amplitude: f64) -> Vector3<f64> {
        let mut channels = [0.0; 3];
        for (axis, channel) in channels.iter_mut().enumerate() {
            let sample = self
                .noise
                .sample(time_s * rates[axis] + self.phase + AXIS_OFFSETS[axis]);
            *channel = (sample * 2.0 - 1.0) * amplitude;
        }
        Vector3::new(channels[0], channels[1], channels[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: [f64; 3] = [0.4, 0.3, 0.5];

    #[test]
    fn test_noise_is_deterministic() {
        let noise = ValueNoise::new(42);
        for i in 0..100 {
            let x = i as f64 * 0.173;
            assert_eq!(noise.sample(x), noise.sample(x));
        }
    }

    #[test]
    fn test_noise_stays_in_unit_range() {
        let noise = ValueNoise::new(7);
        for i in 0..1000 {
            let v = noise.sample(i as f64 * 0.31 - 55.0);
            assert!((0.0..1.0).contains(&v), "sample {v} out of range");
        }
    }

    #[test]
    fn test_noise_is_continuous() {
        let noise = ValueNoise::new(3);
        let step = 1e-4;
        for i in 0..2000 {
            let x = i as f64 * 0.05;
            let delta = (noise.sample(x + step) - noise.sample(x)).abs();
            // smoothstep slope is bounded by 1.5 per lattice unit
            assert!(delta < 2.0 * step, "jump of {delta} at x={x}");
        }
    }

    #[test]
    fn test_noise_varies() {
        let noise = ValueNoise::new(11);
        let samples: Vec<f64> = (0..50).map(|i| noise.sample(i as f64 * 1.7)).collect();
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.2, "noise is suspiciously flat");
    }

    #[test]
    fn test_wobble_respects_amplitude() {
        let wobble = Wobble::new(5);
        for i in 0..500 {
            let offset = wobble.offset(i as f64 * 0.033, &RATES, 0.4);
            assert!(offset.x.abs() <= 0.4);
            assert!(offset.y.abs() <= 0.4);
            assert!(offset.z.abs() <= 0.4);
        }
    }

    #[test]
    fn test_distinct_ids_produce_distinct_signals() {
        let a = Wobble::new(0);
        let b = Wobble::new(1);
        let t = 12.5;
        let offset_a = a.offset(t, &RATES, 1.0);
        let offset_b = b.offset(t, &RATES, 1.0);
        assert!((offset_a - offset_b).norm() > 1e-6);
    }

    #[test]
    fn test_wobble_is_deterministic_per_id() {
        let a = Wobble::new(9);
        let b = Wobble::new(9);
        let offset_a = a.offset(3.3, &RATES, 0.4);
        let offset_b = b.offset(3.3, &RATES, 0.4);
        assert_eq!(offset_a, offset_b);
    }
}
