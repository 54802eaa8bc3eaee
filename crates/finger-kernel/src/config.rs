//! Configuration types for the finger field.

use serde::Deserialize;

use crate::error::FieldError;

/// Top-level field configuration.
///
/// This defines the attention schedule, the detection envelope, and the
/// motion tuning shared by every finger in a field. Loaded from TOML/JSON
/// at runtime; defaults carry the reference constants.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    /// Nominal frame interval in milliseconds (drives the external frame loop)
    pub frame_interval_ms: u64,

    /// Attention refresh configuration
    pub attention: AttentionConfig,

    /// Behavior classification configuration
    pub behavior: BehaviorConfig,

    /// Motion planning configuration
    pub motion: MotionConfig,
}

/// Attention refresh cycle configuration.
///
/// Each finger runs its own refresh loop on a randomized period so that
/// attention switches stay decorrelated across the field.
#[derive(Debug, Clone, Deserialize)]
pub struct AttentionConfig {
    /// One-in-N chance per cycle of reselecting the object of interest
    pub object_reroll_odds: u32,

    /// One-in-N chance per cycle of reselecting the point on the object
    pub offset_reroll_odds: u32,

    /// Radius of the sphere (around the object origin) the aim point is
    /// drawn from, in world length units
    pub offset_radius: f64,

    /// Lower bound of the refresh delay, seconds (inclusive)
    pub min_delay_s: f64,

    /// Upper bound of the refresh delay, seconds (exclusive)
    pub max_delay_s: f64,
}

/// Behavior classification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorConfig {
    /// Detection range as a multiple of reach length
    pub detection_range_multiplier: f64,
}

/// Motion planning configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MotionConfig {
    /// Resting extension along local Y, as a fraction of reach length
    pub rest_extension: f64,

    /// Resting curl along local Z, in world length units
    pub rest_curl: f64,

    /// Wobble amplitude as a fraction of reach length
    pub wobble_amplitude: f64,

    /// Per-axis wobble time multipliers while idle (x, y, z)
    pub idle_wobble_rates: [f64; 3],

    /// Per-axis wobble time multipliers while observing (x, y, z)
    pub observing_wobble_rates: [f64; 3],

    /// Translation blend rate while idle (per second)
    pub idle_blend_rate: f64,

    /// Translation blend rate while observing (per second)
    pub observing_blend_rate: f64,

    /// Base rotation blend rate while observing (per second)
    pub rotation_blend_rate: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            attention: AttentionConfig::default(),
            behavior: BehaviorConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            object_reroll_odds: 10,
            offset_reroll_odds: 4,
            offset_radius: 0.2,
            min_delay_s: 0.5,
            max_delay_s: 1.0,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            detection_range_multiplier: 3.0,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rest_extension: 0.7,
            rest_curl: 0.2,
            wobble_amplitude: 0.4,
            idle_wobble_rates: [0.4, 0.3, 0.5],
            observing_wobble_rates: [1.6, 1.2, 2.0],
            idle_blend_rate: 1.0,
            observing_blend_rate: 3.0,
            rotation_blend_rate: 2.0,
        }
    }
}

impl FieldConfig {
    /// Validate every tunable before any actor spawns.
    ///
    /// All failures are configuration errors; nothing is checked again on
    /// the per-frame path.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.frame_interval_ms == 0 {
            return Err(FieldError::invalid_config("frame_interval_ms must be > 0"));
        }
        self.attention.validate()?;
        self.behavior.validate()?;
        self.motion.validate()
    }
}

impl AttentionConfig {
    fn validate(&self) -> Result<(), FieldError> {
        if self.object_reroll_odds == 0 || self.offset_reroll_odds == 0 {
            return Err(FieldError::invalid_config("reroll odds must be >= 1"));
        }
        if !(self.offset_radius.is_finite() && self.offset_radius > 0.0) {
            return Err(FieldError::invalid_config(
                "offset_radius must be positive and finite",
            ));
        }
        if !(self.min_delay_s > 0.0 && self.max_delay_s > self.min_delay_s) {
            return Err(FieldError::invalid_config(
                "refresh delay window must satisfy 0 < min < max",
            ));
        }
        Ok(())
    }
}

impl BehaviorConfig {
    fn validate(&self) -> Result<(), FieldError> {
        if !(self.detection_range_multiplier.is_finite() && self.detection_range_multiplier > 0.0) {
            return Err(FieldError::invalid_config(
                "detection_range_multiplier must be positive and finite",
            ));
        }
        Ok(())
    }
}

impl MotionConfig {
    fn validate(&self) -> Result<(), FieldError> {
        if !(self.rest_extension > 0.0 && self.rest_extension <= 1.0) {
            return Err(FieldError::invalid_config(
                "rest_extension must be in (0, 1]",
            ));
        }
        if self.wobble_amplitude < 0.0 || !self.wobble_amplitude.is_finite() {
            return Err(FieldError::invalid_config(
                "wobble_amplitude must be non-negative and finite",
            ));
        }
        let rates = self
            .idle_wobble_rates
            .iter()
            .chain(self.observing_wobble_rates.iter());
        for rate in rates {
            if !(rate.is_finite() && *rate > 0.0) {
                return Err(FieldError::invalid_config(
                    "wobble rates must be positive and finite",
                ));
            }
        }
        for rate in [
            self.idle_blend_rate,
            self.observing_blend_rate,
            self.rotation_blend_rate,
        ] {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(FieldError::invalid_config(
                    "blend rates must be positive and finite",
                ));
            }
        }
        Ok(())
    }
}
