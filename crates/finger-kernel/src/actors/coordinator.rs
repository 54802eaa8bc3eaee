//! FieldCoordinator: orchestrates the frame loop with FingerActors.
//!
//! Fingers never interact, so a frame is a single fan-out:
//! 1. On Frame: stamp dt from the previous frame, broadcast StepFrame
//! 2. FingerActors update themselves and broadcast PoseReport
//! 3. When every registered finger has reported, send FrameComplete
//!    to the registered frame driver

use std::collections::HashMap;

use acton_reactive::prelude::*;
use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::field::{FingerId, FingerPose, FrameResult};
use crate::messages::{
    Frame, FrameComplete, PoseReport, RegisterFingers, RegisterFrameDriver, StepFrame,
};

/// Poses collected for an in-flight frame.
#[derive(Debug, Clone)]
struct PendingFrame {
    /// Expected number of reports (one per registered finger)
    expected_count: usize,
    /// Received poses
    poses: Vec<FingerPose>,
}

impl PendingFrame {
    fn new(expected_count: usize) -> Self {
        Self {
            expected_count,
            poses: Vec::with_capacity(expected_count),
        }
    }

    fn is_complete(&self) -> bool {
        self.poses.len() >= self.expected_count
    }
}

/// Actor state for the FieldCoordinator.
pub struct FieldCoordinatorState {
    /// Handles to FingerActors (one per finger)
    fingers: DashMap<FingerId, ActorHandle>,
    /// In-flight frames by sequence number
    pending_frames: HashMap<u64, PendingFrame>,
    /// Handle to the frame driver for sending FrameComplete
    frame_driver: Option<ActorHandle>,
    /// Sequence number of the most recent frame
    frame_seq: u64,
    /// Timestamp of the previous frame, for dt
    last_now_ms: Option<u64>,
}

impl Default for FieldCoordinatorState {
    fn default() -> Self {
        Self {
            fingers: DashMap::new(),
            pending_frames: HashMap::new(),
            frame_driver: None,
            frame_seq: 0,
            last_now_ms: None,
        }
    }
}

impl Clone for FieldCoordinatorState {
    fn clone(&self) -> Self {
        let fingers = DashMap::new();
        for entry in self.fingers.iter() {
            fingers.insert(*entry.key(), entry.value().clone());
        }
        Self {
            fingers,
            pending_frames: self.pending_frames.clone(),
            frame_driver: self.frame_driver.clone(),
            frame_seq: self.frame_seq,
            last_now_ms: self.last_now_ms,
        }
    }
}

impl std::fmt::Debug for FieldCoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCoordinatorState")
            .field("fingers", &self.fingers.len())
            .field("pending_frames", &self.pending_frames.len())
            .field("frame_driver", &self.frame_driver.is_some())
            .field("frame_seq", &self.frame_seq)
            .finish()
    }
}

/// Central coordinator actor for one finger field.
///
/// Holds no per-finger behavior; it only stamps frame timing, fans the tick
/// out, and aggregates the poses for the frame driver.
pub struct FieldCoordinator;

impl FieldCoordinator {
    /// Spawn the coordinator.
    ///
    /// FingerActors are spawned separately by the field builder, which
    /// registers their handles via `RegisterFingers`.
    pub async fn spawn(self, runtime: &mut ActorRuntime) -> ActorHandle {
        let mut actor =
            runtime.new_actor_with_name::<FieldCoordinatorState>("FieldCoordinator".to_string());

        // Subscribe to pose report broadcasts BEFORE starting
        actor.handle().subscribe::<PoseReport>().await;

        configure_handlers(&mut actor);

        actor.start().await
    }
}

/// Configure all message handlers for the coordinator.
fn configure_handlers(actor: &mut ManagedActor<Idle, FieldCoordinatorState>) {
    // Handle finger registration from the field builder
    actor.mutate_on::<RegisterFingers>(|actor, context| {
        let msg = context.message();
        actor.model.fingers.clear();
        for (finger_id, handle) in &msg.actors {
            actor.model.fingers.insert(*finger_id, handle.clone());
        }
        debug!(fingers = actor.model.fingers.len(), "Registered fingers");
        Reply::ready()
    });

    // Handle frame driver registration
    actor.mutate_on::<RegisterFrameDriver>(|actor, context| {
        let handle = context.message().handle.clone();
        actor.model.frame_driver = Some(handle);
        debug!("Registered frame driver");
        Reply::ready()
    });

    // Handle Frame - stamp dt and fan the step out to every finger
    actor.mutate_on::<Frame>(|actor, context| {
        let now_ms = context.message().now_ms;

        actor.model.frame_seq += 1;
        let seq = actor.model.frame_seq;

        // dt = 0 on the first frame: state classification still runs, no
        // translation occurs
        let dt = actor
            .model
            .last_now_ms
            .map(|prev| now_ms.saturating_sub(prev) as f64 / 1000.0)
            .unwrap_or(0.0);
        actor.model.last_now_ms = Some(now_ms);

        let expected_count = actor.model.fingers.len();

        trace!(seq, dt, fingers = expected_count, "Frame started");

        if expected_count == 0 {
            // nothing to step; complete immediately so the driver never hangs
            warn!(seq, "Frame on a field with no registered fingers");
            let result = FrameResult {
                seq,
                ..FrameResult::default()
            };
            if let Some(driver) = actor.model.frame_driver.clone() {
                return Reply::pending(async move {
                    driver.send(FrameComplete { result }).await;
                });
            }
            return Reply::ready();
        }

        actor
            .model
            .pending_frames
            .insert(seq, PendingFrame::new(expected_count));

        let broker = actor.broker().clone();
        Reply::pending(async move {
            broker.broadcast(StepFrame { seq, now_ms, dt }).await;
        })
    });

    // Handle PoseReport - collect and complete the frame
    actor.mutate_on::<PoseReport>(|actor, context| {
        let report = context.message().clone();
        let seq = report.seq;

        let Some(pending) = actor.model.pending_frames.get_mut(&seq) else {
            warn!(seq, "Received pose report for unknown frame");
            return Reply::ready();
        };

        pending.poses.push(report.pose);

        if !pending.is_complete() {
            return Reply::ready();
        }

        let Some(pending) = actor.model.pending_frames.remove(&seq) else {
            return Reply::ready();
        };

        let mut poses = pending.poses;
        poses.sort_by_key(|pose| pose.id);
        let observing = poses.iter().filter(|p| p.state.is_observing()).count();
        let idle = poses.len() - observing;

        debug!(seq, observing, idle, "Frame complete");

        let result = FrameResult {
            seq,
            poses,
            observing,
            idle,
        };

        if let Some(driver) = actor.model.frame_driver.clone() {
            return Reply::pending(async move {
                driver.send(FrameComplete { result }).await;
            });
        }

        Reply::ready()
    });
}
