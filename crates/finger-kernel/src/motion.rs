//! Motion planning: turn the current attention target into a clamped
//! local-space goal and blend toward it.
//!
//! Local frame convention: Y extends away from the mounting surface, Z
//! curls toward the faced direction, X is the small out-of-plane deviation.
//! The observing routine rotates the base so the faced direction stays in
//! the surface plane, which keeps this convention stable while tracking.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use crate::config::MotionConfig;
use crate::curves::ReachEnvelope;
use crate::noise::Wobble;

/// Degenerate-direction guard for plane projections and slerp.
const DIRECTION_EPSILON: f64 = 1e-9;

/// Mutable motion state carried by one finger across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    /// Current world base orientation (consumed by the IK solver)
    pub orientation: UnitQuaternion<f64>,
    /// Current interpolated local-space target (consumed by the IK solver)
    pub target_local: Vector3<f64>,
}

impl MotionState {
    /// Initial state: resting pose in the mount orientation.
    pub fn at_rest(
        config: &MotionConfig,
        reach_length: f64,
        orientation: UnitQuaternion<f64>,
    ) -> Self {
        Self {
            orientation,
            target_local: rest_target(config, reach_length),
        }
    }
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            orientation: UnitQuaternion::identity(),
            target_local: Vector3::zeros(),
        }
    }
}

/// The resting local target: partially extended, slightly curled.
fn rest_target(config: &MotionConfig, reach_length: f64) -> Vector3<f64> {
    Vector3::new(0.0, config.rest_extension * reach_length, config.rest_curl)
}

/// Exponential approach: close `rate * dt` of the remaining distance,
/// saturating at the goal. Frame-rate independent in the small-dt limit.
fn approach(current: Vector3<f64>, goal: Vector3<f64>, rate: f64, dt: f64) -> Vector3<f64> {
    current + (goal - current) * (rate * dt).min(1.0)
}

/// Per-finger motion planner.
///
/// Holds the tuning, the reach envelope, and the finger's wobble signal;
/// all frame-to-frame state lives in [`MotionState`].
#[derive(Debug, Clone)]
pub struct MotionPlanner {
    config: MotionConfig,
    envelope: ReachEnvelope,
    wobble: Wobble,
}

impl MotionPlanner {
    /// Create the planner for one finger.
    pub fn new(config: MotionConfig, envelope: ReachEnvelope, finger_id: u64) -> Self {
        Self {
            config,
            envelope,
            wobble: Wobble::new(finger_id),
        }
    }

    /// Idle routine: sway gently around the resting pose, independent of
    /// any point of interest. Orientation is left untouched.
    pub fn step_idle(&self, state: &mut MotionState, reach_length: f64, time_s: f64, dt: f64) {
        let amplitude = self.config.wobble_amplitude * reach_length;
        let goal = rest_target(&self.config, reach_length)
            + self
                .wobble
                .offset(time_s, &self.config.idle_wobble_rates, amplitude);
        state.target_local = approach(state.target_local, goal, self.config.idle_blend_rate, dt);
    }

    /// Observing routine: rotate the base to face the target along the
    /// mounting surface, then chase a clamped local goal with faster sway
    /// and faster blending than idle.
    pub fn step_observing(
        &self,
        state: &mut MotionState,
        base: &Point3<f64>,
        surface_normal: &Unit<Vector3<f64>>,
        world_target: &Point3<f64>,
        reach_length: f64,
        time_s: f64,
        dt: f64,
    ) {
        let to_target = world_target - base;

        // face the target within the surface plane, up = surface normal
        let planar = to_target - surface_normal.as_ref() * to_target.dot(surface_normal);
        if let Some(facing) = Unit::try_new(planar, DIRECTION_EPSILON) {
            let desired = UnitQuaternion::face_towards(&facing, surface_normal);
            let t = (self.config.rotation_blend_rate * dt).min(1.0);
            state.orientation = state
                .orientation
                .try_slerp(&desired, t, DIRECTION_EPSILON)
                .unwrap_or(desired);
        }

        let local = state.orientation.inverse_transform_vector(&to_target);
        let amplitude = self.config.wobble_amplitude * reach_length;
        let goal = local
            + self
                .wobble
                .offset(time_s, &self.config.observing_wobble_rates, amplitude);
        let clamped = self.envelope.clamp(goal, reach_length);
        state.target_local = approach(
            state.target_local,
            clamped,
            self.config.observing_blend_rate,
            dt,
        );
    }

    /// The reach envelope this planner clamps against.
    pub fn envelope(&self) -> &ReachEnvelope {
        &self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn planner() -> MotionPlanner {
        MotionPlanner::new(MotionConfig::default(), ReachEnvelope::default(), 0)
    }

    fn mounted_state(reach: f64) -> MotionState {
        MotionState::at_rest(&MotionConfig::default(), reach, UnitQuaternion::identity())
    }

    #[test]
    fn test_approach_blend_law() {
        let current = Vector3::new(0.0, 0.0, 0.0);
        let goal = Vector3::new(1.0, 2.0, 3.0);
        let dt = 0.1;
        let next = approach(current, goal, 1.0, dt);
        // next = P + (G - P) * min(1, dt)
        assert_relative_eq!(next.x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(next.y, 0.2, epsilon = 1e-12);
        assert_relative_eq!(next.z, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_approach_saturates_at_goal() {
        let current = Vector3::new(1.0, 0.0, 0.0);
        let goal = Vector3::new(2.0, 0.0, 0.0);
        let next = approach(current, goal, 3.0, 10.0);
        assert_relative_eq!(next.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_approach_converges() {
        let goal = Vector3::new(0.5, 0.8, -0.2);
        let mut current = Vector3::zeros();
        for _ in 0..2000 {
            current = approach(current, goal, 1.0, 0.016);
        }
        assert!((goal - current).norm() < 1e-6);
    }

    #[test]
    fn test_observing_blend_outpaces_idle_blend() {
        // rate 3 closes distance faster than rate 1 under the same frames
        let goal = Vector3::new(1.0, 0.0, 0.0);
        let dt = 0.016;
        let mut slow = Vector3::zeros();
        let mut fast = Vector3::zeros();
        for _ in 0..60 {
            slow = approach(slow, goal, 1.0, dt);
            fast = approach(fast, goal, 3.0, dt);
        }
        let slow_remaining = (goal - slow).norm();
        let fast_remaining = (goal - fast).norm();
        assert!(fast_remaining < slow_remaining);
        // sixty 16ms frames at rate 3: roughly 1 - (1 - 3*0.016)^60
        assert!(fast_remaining < 0.1);
        assert!(slow_remaining > 0.3);
    }

    #[test]
    fn test_rotation_rate_sits_between_blend_rates() {
        let config = MotionConfig::default();
        assert!(config.idle_blend_rate < config.rotation_blend_rate);
        assert!(config.rotation_blend_rate < config.observing_blend_rate);
    }

    #[test]
    fn test_three_rate_ordering_over_fixed_frames() {
        // the three blend laws at rates 1 / 2 / 3 with fixed dt: each rate
        // leaves strictly less remaining distance than the one below it
        let goal = Vector3::new(1.0, 0.0, 0.0);
        let dt = 0.016;
        let remaining = |rate: f64| {
            let mut current = Vector3::zeros();
            for _ in 0..40 {
                current = approach(current, goal, rate, dt);
            }
            (goal - current).norm()
        };
        let idle = remaining(1.0);
        let rotation = remaining(2.0);
        let observing = remaining(3.0);
        assert!(observing < rotation);
        assert!(rotation < idle);
        // each step closes rate * dt of the remainder
        assert_relative_eq!(idle, (1.0 - dt).powi(40), epsilon = 1e-9);
        assert_relative_eq!(rotation, (1.0 - 2.0 * dt).powi(40), epsilon = 1e-9);
        assert_relative_eq!(observing, (1.0 - 3.0 * dt).powi(40), epsilon = 1e-9);
    }

    #[test]
    fn test_idle_stays_near_rest_pose() {
        let planner = planner();
        let reach = 1.0;
        let mut state = mounted_state(reach);
        for frame in 0..600 {
            planner.step_idle(&mut state, reach, frame as f64 * 0.016, 0.016);
        }
        let rest = Vector3::new(0.0, 0.7, 0.2);
        // wobble amplitude bounds the drift from rest
        assert!((state.target_local - rest).norm() <= 0.4 * 3.0_f64.sqrt() + 1e-9);
    }

    #[test]
    fn test_idle_leaves_orientation_alone() {
        let planner = planner();
        let mut state = mounted_state(1.0);
        let before = state.orientation;
        planner.step_idle(&mut state, 1.0, 0.5, 0.016);
        assert_eq!(state.orientation, before);
    }

    #[test]
    fn test_observing_target_respects_envelope() {
        let planner = planner();
        let reach = 1.0;
        let base = Point3::origin();
        let normal = Vector3::y_axis();
        let target = Point3::new(2.0, 0.3, 1.5);
        let mut state = mounted_state(reach);
        for frame in 0..400 {
            planner.step_observing(
                &mut state,
                &base,
                &normal,
                &target,
                reach,
                frame as f64 * 0.016,
                0.016,
            );
            let local = state.target_local;
            assert!(local.y >= 0.2 * reach - 1e-9 && local.y <= reach + 1e-9);
        }
    }

    #[test]
    fn test_observing_faces_target_within_surface_plane() {
        let planner = planner();
        let base = Point3::origin();
        let normal = Vector3::y_axis();
        let target = Point3::new(3.0, 5.0, 0.0);
        let mut state = mounted_state(1.0);
        for frame in 0..600 {
            planner.step_observing(
                &mut state,
                &base,
                &normal,
                &target,
                1.0,
                frame as f64 * 0.016,
                0.016,
            );
        }
        // local z axis should settle on the planar direction toward the target
        let forward = state.orientation * Vector3::z();
        assert_relative_eq!(forward.dot(&Vector3::y()), 0.0, epsilon = 1e-6);
        assert!(forward.dot(&Vector3::x()) > 0.99);
        // up stays aligned with the surface normal
        let up = state.orientation * Vector3::y();
        assert!(up.dot(&Vector3::y()) > 0.99);
    }

    #[test]
    fn test_observing_handles_target_along_normal() {
        // target straight above the mount: planar projection is degenerate,
        // orientation must survive unchanged and the step must not panic
        let planner = planner();
        let base = Point3::origin();
        let normal = Vector3::y_axis();
        let target = Point3::new(0.0, 2.0, 0.0);
        let mut state = mounted_state(1.0);
        let before = state.orientation;
        planner.step_observing(&mut state, &base, &normal, &target, 1.0, 0.1, 0.016);
        assert_eq!(state.orientation, before);
        assert!(state.target_local.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_state_transition_keeps_blend_continuity() {
        // switching observing -> idle must not teleport the target; the
        // first idle frame moves at most rate * dt of the remaining distance
        let planner = planner();
        let reach = 1.0;
        let base = Point3::origin();
        let normal = Vector3::y_axis();
        let target = Point3::new(2.0, 0.3, 0.5);
        let mut state = mounted_state(reach);
        for frame in 0..120 {
            planner.step_observing(
                &mut state,
                &base,
                &normal,
                &target,
                reach,
                frame as f64 * 0.016,
                0.016,
            );
        }
        let before = state.target_local;
        planner.step_idle(&mut state, reach, 120.0 * 0.016, 0.016);
        let moved = (state.target_local - before).norm();
        // remaining distance to any idle goal is bounded by the pose span
        assert!(moved <= 0.016 * (before.norm() + 0.7 + 0.2 + 0.4 * 3.0) + 1e-9);
    }
}
