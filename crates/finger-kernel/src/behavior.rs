//! Behavior classification: Idle vs Observing.

use serde::Serialize;

/// The two behavior states a finger moves between.
///
/// State is recomputed from proximity every frame: a pure, memoryless
/// classification with no debounce. Flicker when proximity oscillates near
/// the detection boundary is accepted behavior, not a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BehaviorState {
    /// Relaxed resting pose with gentle sway
    #[default]
    Idle,
    /// Tracking the object of interest
    Observing,
}

impl BehaviorState {
    /// Check if this is the observing state.
    pub fn is_observing(self) -> bool {
        matches!(self, Self::Observing)
    }
}

impl std::fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Observing => write!(f, "observing"),
        }
    }
}

/// Classify from proximity to the object of interest's frame origin.
///
/// `Observing` iff proximity < multiplier * reach. Strict: a finger exactly
/// at the detection range is idle.
pub fn classify(proximity: f64, reach_length: f64, detection_range_multiplier: f64) -> BehaviorState {
    if proximity < reach_length * detection_range_multiplier {
        BehaviorState::Observing
    } else {
        BehaviorState::Idle
    }
}
