//! Message types for acton-reactive actor communication.
//!
//! The frame pipeline is single-phase, so messages correlate on the frame
//! sequence number instead of string correlation IDs.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::field::{FingerId, FingerPose, FrameResult};

/// Frame trigger - sent to the FieldCoordinator to start one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Current timestamp on the shared frame clock
    pub now_ms: u64,
}

/// Per-finger frame step - broadcast to all FingerActors.
#[derive(Debug, Clone)]
pub struct StepFrame {
    /// Frame sequence number (correlates pose reports)
    pub seq: u64,
    /// Current timestamp (drives the wobble clock)
    pub now_ms: u64,
    /// Elapsed time since the previous frame, seconds
    pub dt: f64,
}

/// One finger's pose for a frame - broadcast back to the coordinator.
#[derive(Debug, Clone)]
pub struct PoseReport {
    /// Frame sequence number matching the originating StepFrame
    pub seq: u64,
    /// The finger's pose after this frame's update
    pub pose: FingerPose,
}

/// Frame completion notification - sent to the registered frame driver.
#[derive(Debug, Clone)]
pub struct FrameComplete {
    /// Result of the frame
    pub result: FrameResult,
}

/// Register finger actors with the coordinator.
///
/// Sent by the field builder after spawning all FingerActors.
#[derive(Debug, Clone)]
pub struct RegisterFingers {
    /// Map of finger IDs to their actor handles
    pub actors: HashMap<FingerId, acton_reactive::prelude::ActorHandle>,
}

/// Register the frame driver handle with the coordinator.
///
/// The coordinator will send FrameComplete messages to this handle.
#[derive(Debug, Clone)]
pub struct RegisterFrameDriver {
    /// The frame driver's actor handle
    pub handle: acton_reactive::prelude::ActorHandle,
}

/// Attention refresh result - sent from a finger's refresh task to its own
/// actor. `None` fields mean "keep the current selection".
#[derive(Debug, Clone)]
pub struct AttentionUpdate {
    /// Newly selected object-of-interest index, if rerolled this cycle
    pub object_index: Option<usize>,
    /// Newly selected aim offset (local to the object), if rerolled
    pub local_offset: Option<Vector3<f64>>,
}

/// Field teardown - broadcast so every finger aborts its attention loop
/// before the runtime shuts down. No orphaned timers.
#[derive(Debug, Clone)]
pub struct Halt;
