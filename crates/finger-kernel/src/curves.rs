//! Reach limit curves: the pluggable envelope that bounds finger motion.
//!
//! The `LimitCurve` trait defines the interface for evaluating a bound as a
//! function of normalized reach. Curves are synchronous local computations,
//! supplied externally as configuration rather than hardcoded shapes.

use std::sync::Arc;

use nalgebra::Vector3;

use crate::error::FieldError;

/// Reach below this fraction of a unit is treated as degenerate when
/// normalizing; guards the division without masking the configuration error
/// surfaced at construction.
const REACH_EPSILON: f64 = 1e-6;

/// A limit curve maps normalized reach to a bound magnitude.
///
/// Implementations must be:
/// - Deterministic: same input produces same output
/// - Fast: evaluated up to three times per finger per frame
///
/// Outputs are magnitudes (fractions of reach length); negative values are
/// treated as zero by the envelope.
pub trait LimitCurve: Send + Sync {
    /// Evaluate the bound at normalized reach `t` (0 = fully retracted,
    /// 1 = fully extended).
    fn evaluate(&self, t: f64) -> f64;
}

/// Piecewise-linear keyframe curve.
///
/// Keys are `(t, value)` pairs sorted by `t`; evaluation interpolates
/// linearly between neighbors and clamps to the end values outside the key
/// range.
#[derive(Debug, Clone)]
pub struct PiecewiseLinearCurve {
    keys: Vec<(f64, f64)>,
}

impl PiecewiseLinearCurve {
    /// Build a curve from keyframes.
    ///
    /// Keys must be non-empty, finite, and strictly increasing in `t`.
    pub fn new(keys: Vec<(f64, f64)>) -> Result<Self, FieldError> {
        if keys.is_empty() {
            return Err(FieldError::invalid_curve("curve has no keys"));
        }
        for (t, value) in &keys {
            if !t.is_finite() || !value.is_finite() {
                return Err(FieldError::invalid_curve("curve key is not finite"));
            }
        }
        for pair in keys.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(FieldError::invalid_curve(
                    "curve keys must be strictly increasing in t",
                ));
            }
        }
        Ok(Self { keys })
    }

    /// A curve that evaluates to the same value everywhere.
    pub fn constant(value: f64) -> Self {
        Self {
            keys: vec![(0.0, value)],
        }
    }
}

impl LimitCurve for PiecewiseLinearCurve {
    fn evaluate(&self, t: f64) -> f64 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                let s = (t - t0) / (t1 - t0);
                return v0 + (v1 - v0) * s;
            }
        }
        last.1
    }
}

/// The three-curve envelope bounding a finger's local target.
///
/// The local target lives in a 2D plane: local Y is the extend axis, local
/// Z the curl axis, with a small permitted out-of-plane deviation on local
/// X. Naming note: the `y_high`/`y_low` pair bounds the local **Z** axis.
/// The curl bound names come from the curves' role ("how far past/under the
/// Y axis may the tip curl"), and the mapping is kept as documented rather
/// than renamed.
#[derive(Clone)]
pub struct ReachEnvelope {
    /// Bound on +Z curl as a function of normalized reach
    y_high: Arc<dyn LimitCurve>,
    /// Bound on -Z curl (asymmetric: fingers curl one way more than the other)
    y_low: Arc<dyn LimitCurve>,
    /// Symmetric bound on out-of-plane X deviation
    x_limit: Arc<dyn LimitCurve>,
    /// Minimum extension as a fraction of reach length
    min_extension: f64,
}

impl std::fmt::Debug for ReachEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReachEnvelope")
            .field("min_extension", &self.min_extension)
            .finish()
    }
}

impl ReachEnvelope {
    /// Build an envelope from the three limit curves.
    pub fn new(
        y_high: Arc<dyn LimitCurve>,
        y_low: Arc<dyn LimitCurve>,
        x_limit: Arc<dyn LimitCurve>,
        min_extension: f64,
    ) -> Result<Self, FieldError> {
        if !(min_extension > 0.0 && min_extension <= 1.0) {
            return Err(FieldError::invalid_config(
                "min_extension must be in (0, 1]",
            ));
        }
        Ok(Self {
            y_high,
            y_low,
            x_limit,
            min_extension,
        })
    }

    /// Clamp a local-space target into the reachable envelope.
    ///
    /// Order matters: Y is clamped first, the clamped Y defines the
    /// normalized reach the other two bounds are evaluated at.
    pub fn clamp(&self, local: Vector3<f64>, reach_length: f64) -> Vector3<f64> {
        let reach = reach_length.max(REACH_EPSILON);
        let y = local.y.clamp(self.min_extension * reach, reach);
        let t = y / reach;

        let z_high = self.y_high.evaluate(t).max(0.0) * reach;
        let z_low = self.y_low.evaluate(t).max(0.0) * reach;
        let z = local.z.clamp(-z_low, z_high);

        let x_bound = self.x_limit.evaluate(t).max(0.0) * reach;
        let x = local.x.clamp(-x_bound, x_bound);

        Vector3::new(x, y, z)
    }

    /// Minimum extension fraction.
    pub fn min_extension(&self) -> f64 {
        self.min_extension
    }
}

impl Default for ReachEnvelope {
    /// Reference envelope: curl allowance tightens as the finger extends,
    /// with the low side tighter than the high side, and a narrow lateral
    /// corridor.
    fn default() -> Self {
        let y_high = PiecewiseLinearCurve::new(vec![(0.2, 0.9), (0.6, 0.55), (1.0, 0.1)])
            .expect("reference y_high keys are valid");
        let y_low = PiecewiseLinearCurve::new(vec![(0.2, 0.3), (1.0, 0.05)])
            .expect("reference y_low keys are valid");
        let x_limit = PiecewiseLinearCurve::new(vec![(0.2, 0.35), (1.0, 0.1)])
            .expect("reference x_limit keys are valid");
        Self {
            y_high: Arc::new(y_high),
            y_low: Arc::new(y_low),
            x_limit: Arc::new(x_limit),
            min_extension: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_piecewise_interpolation() {
        let curve = PiecewiseLinearCurve::new(vec![(0.0, 0.0), (1.0, 1.0)]).unwrap();
        assert_relative_eq!(curve.evaluate(0.25), 0.25, epsilon = 1e-12);
        assert_relative_eq!(curve.evaluate(0.5), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_piecewise_clamps_outside_range() {
        let curve = PiecewiseLinearCurve::new(vec![(0.2, 0.9), (1.0, 0.1)]).unwrap();
        assert_relative_eq!(curve.evaluate(0.0), 0.9, epsilon = 1e-12);
        assert_relative_eq!(curve.evaluate(2.0), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_piecewise_rejects_bad_keys() {
        assert!(PiecewiseLinearCurve::new(vec![]).is_err());
        assert!(PiecewiseLinearCurve::new(vec![(0.5, 1.0), (0.5, 2.0)]).is_err());
        assert!(PiecewiseLinearCurve::new(vec![(0.0, f64::NAN)]).is_err());
    }

    #[test]
    fn test_constant_curve() {
        let curve = PiecewiseLinearCurve::constant(0.3);
        assert_relative_eq!(curve.evaluate(0.0), 0.3, epsilon = 1e-12);
        assert_relative_eq!(curve.evaluate(0.7), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_envelope_bounds_hold_for_arbitrary_inputs() {
        let envelope = ReachEnvelope::default();
        let reach = 1.5;
        let samples = [
            Vector3::new(10.0, -5.0, 10.0),
            Vector3::new(-10.0, 50.0, -10.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.1, 1.0, -0.2),
        ];
        for local in samples {
            let clamped = envelope.clamp(local, reach);
            assert!(clamped.y >= 0.2 * reach && clamped.y <= reach);
            let t = clamped.y / reach;
            let z_high = envelope.y_high.evaluate(t) * reach;
            let z_low = envelope.y_low.evaluate(t) * reach;
            let x_bound = envelope.x_limit.evaluate(t) * reach;
            assert!(clamped.z <= z_high + 1e-12 && clamped.z >= -z_low - 1e-12);
            assert!(clamped.x.abs() <= x_bound + 1e-12);
        }
    }

    #[test]
    fn test_envelope_preserves_in_bounds_target() {
        let envelope = ReachEnvelope::default();
        let local = Vector3::new(0.01, 0.5, 0.02);
        let clamped = envelope.clamp(local, 1.0);
        assert_relative_eq!(clamped.x, local.x, epsilon = 1e-12);
        assert_relative_eq!(clamped.y, local.y, epsilon = 1e-12);
        assert_relative_eq!(clamped.z, local.z, epsilon = 1e-12);
    }

    #[test]
    fn test_envelope_asymmetric_curl() {
        // the low side is tighter than the high side at mid reach
        let envelope = ReachEnvelope::default();
        let up = envelope.clamp(Vector3::new(0.0, 0.5, 10.0), 1.0);
        let down = envelope.clamp(Vector3::new(0.0, 0.5, -10.0), 1.0);
        assert!(up.z > -down.z);
    }

    #[test]
    fn test_envelope_guards_degenerate_reach() {
        // zero reach must not divide by zero or produce NaN
        let envelope = ReachEnvelope::default();
        let clamped = envelope.clamp(Vector3::new(1.0, 1.0, 1.0), 0.0);
        assert!(clamped.x.is_finite() && clamped.y.is_finite() && clamped.z.is_finite());
    }

    #[test]
    fn test_envelope_rejects_bad_min_extension() {
        let curve: Arc<dyn LimitCurve> = Arc::new(PiecewiseLinearCurve::constant(0.5));
        let result = ReachEnvelope::new(curve.clone(), curve.clone(), curve, 0.0);
        assert!(result.is_err());
    }
}
