//! Finger Kernel: decentralized attention and motion for actuator fields.
//!
//! This crate implements the per-finger behavioral controller for a field
//! of independent surface-mounted finger actuators: each finger selects a
//! point of interest on its own randomized schedule, classifies itself as
//! idle or observing from proximity, and blends a clamped local-space reach
//! target for an external IK solver. There is no central choreography;
//! the organic look of the field comes from per-finger timing and noise.

pub mod actors;
pub mod attention;
pub mod behavior;
pub mod config;
pub mod curves;
pub mod error;
pub mod field;
pub mod messages;
pub mod motion;
pub mod noise;
pub mod points;

pub use attention::{AttentionSelector, AttentionStep};
pub use behavior::{BehaviorState, classify};
pub use config::{AttentionConfig, BehaviorConfig, FieldConfig, MotionConfig};
pub use curves::{LimitCurve, PiecewiseLinearCurve, ReachEnvelope};
pub use error::FieldError;
pub use field::{FieldBuilder, FingerId, FingerPose, FrameResult, Mount};
pub use messages::{Frame, FrameComplete, Halt, RegisterFrameDriver};
pub use motion::{MotionPlanner, MotionState};
pub use noise::{ValueNoise, Wobble};
pub use points::{PoiFrame, SharedPoints, shared_points};
