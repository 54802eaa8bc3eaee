//! Attention selection: what each finger looks at, and where on it.
//!
//! Each finger owns a selector with a private seeded RNG stream and runs
//! the refresh cycle on its own randomized period (the actor layer supplies
//! the loop; the selector is pure so its statistics are testable). The
//! randomized per-finger delay is what decorrelates attention switches
//! across the field; there is deliberately no shared timer.

use std::time::Duration;

use nalgebra::Vector3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::AttentionConfig;

/// One pass through the refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionStep {
    /// Newly selected object index, if this cycle rerolled it
    pub object_index: Option<usize>,
    /// Newly selected aim offset (local to the object), if rerolled
    pub local_offset: Option<Vector3<f64>>,
    /// How long to wait before the next cycle
    pub delay: Duration,
}

/// Per-finger attention selector.
///
/// Owns the finger's RNG stream exclusively; streams for distinct fingers
/// are seeded distinctly, so no two fingers share draws.
pub struct AttentionSelector {
    rng: ChaCha8Rng,
    config: AttentionConfig,
}

impl AttentionSelector {
    /// Create a selector with its own seeded stream.
    pub fn new(seed: u64, config: AttentionConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    /// Pick the initial object of interest, uniformly.
    ///
    /// Called once at finger construction so the selection is always valid
    /// from the first frame onward. `object_count` must be >= 1 (validated
    /// at field construction).
    pub fn initial_object(&mut self, object_count: usize) -> usize {
        self.rng.random_range(0..object_count)
    }

    /// Run one refresh cycle: maybe reroll the object (one in
    /// `object_reroll_odds`), maybe reroll the aim offset (one in
    /// `offset_reroll_odds`), and draw the delay before the next cycle
    /// uniformly from the configured window.
    pub fn step(&mut self, object_count: usize) -> AttentionStep {
        let object_index = if self.rng.random_range(0..self.config.object_reroll_odds) == 0 {
            Some(self.rng.random_range(0..object_count))
        } else {
            None
        };

        let local_offset = if self.rng.random_range(0..self.config.offset_reroll_odds) == 0 {
            Some(self.point_in_unit_sphere() * self.config.offset_radius)
        } else {
            None
        };

        let delay_s = self
            .rng
            .random_range(self.config.min_delay_s..self.config.max_delay_s);

        AttentionStep {
            object_index,
            local_offset,
            delay: Duration::from_secs_f64(delay_s),
        }
    }

    /// Uniform point inside the unit sphere, by rejection.
    fn point_in_unit_sphere(&mut self) -> Vector3<f64> {
        loop {
            let candidate = Vector3::new(
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
            );
            if candidate.norm_squared() <= 1.0 {
                return candidate;
            }
        }
    }
}

impl std::fmt::Debug for AttentionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttentionSelector")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLES: usize = 20_000;

    #[test]
    fn test_reroll_frequencies_match_odds() {
        let mut selector = AttentionSelector::new(42, AttentionConfig::default());
        let mut object_rerolls = 0usize;
        let mut offset_rerolls = 0usize;
        for _ in 0..CYCLES {
            let step = selector.step(5);
            if step.object_index.is_some() {
                object_rerolls += 1;
            }
            if step.local_offset.is_some() {
                offset_rerolls += 1;
            }
        }
        let object_rate = object_rerolls as f64 / CYCLES as f64;
        let offset_rate = offset_rerolls as f64 / CYCLES as f64;
        // binomial std dev at these odds is well under 0.004
        assert!(
            (object_rate - 0.1).abs() < 0.015,
            "object reroll rate {object_rate}"
        );
        assert!(
            (offset_rate - 0.25).abs() < 0.02,
            "offset reroll rate {offset_rate}"
        );
    }

    #[test]
    fn test_delays_stay_in_window() {
        for seed in 0..50 {
            let mut selector = AttentionSelector::new(seed, AttentionConfig::default());
            for _ in 0..200 {
                let delay = selector.step(3).delay.as_secs_f64();
                assert!((0.5..1.0).contains(&delay), "delay {delay} out of window");
            }
        }
    }

    #[test]
    fn test_object_indices_stay_in_range() {
        let mut selector = AttentionSelector::new(7, AttentionConfig::default());
        for _ in 0..CYCLES {
            if let Some(index) = selector.step(4).object_index {
                assert!(index < 4);
            }
        }
    }

    #[test]
    fn test_offsets_stay_inside_sphere() {
        let config = AttentionConfig::default();
        let radius = config.offset_radius;
        let mut selector = AttentionSelector::new(13, config);
        for _ in 0..CYCLES {
            if let Some(offset) = selector.step(2).local_offset {
                assert!(offset.norm() <= radius + 1e-12);
            }
        }
    }

    #[test]
    fn test_distinct_seeds_give_distinct_streams() {
        let mut a = AttentionSelector::new(1, AttentionConfig::default());
        let mut b = AttentionSelector::new(2, AttentionConfig::default());
        let delays_a: Vec<Duration> = (0..32).map(|_| a.step(3).delay).collect();
        let delays_b: Vec<Duration> = (0..32).map(|_| b.step(3).delay).collect();
        assert_ne!(delays_a, delays_b);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let mut a = AttentionSelector::new(99, AttentionConfig::default());
        let mut b = AttentionSelector::new(99, AttentionConfig::default());
        for _ in 0..100 {
            assert_eq!(a.step(6), b.step(6));
        }
    }
}
