//! Error types for field construction and configuration.
//!
//! Every failure here is a precondition violation detected once at setup.
//! Per-frame updates are total functions over clamped inputs and never fail.

use thiserror::Error;

/// Errors surfaced while assembling or configuring a finger field.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    /// The shared point-of-interest list has no entries.
    ///
    /// Every finger needs at least one frame to select from; an empty list
    /// would make attention selection undefined, so construction refuses it.
    #[error("point-of-interest list is empty")]
    EmptyPointsOfInterest,

    /// A mount's base and tip frames coincide (or nearly so).
    #[error("finger {id} has degenerate reach geometry (length {length})")]
    DegenerateReach {
        /// The finger whose geometry is degenerate.
        id: u64,
        /// The measured base-to-tip distance.
        length: f64,
    },

    /// A limit curve could not be constructed.
    #[error("invalid limit curve: {reason}")]
    InvalidCurve {
        /// Description of what is wrong with the curve keys.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the offending value.
        reason: String,
    },
}

impl FieldError {
    /// Create an invalid curve error.
    pub fn invalid_curve(reason: impl Into<String>) -> Self {
        Self::InvalidCurve {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration-value error (as opposed to geometry
    /// or point-list problems).
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::InvalidCurve { .. })
    }
}
