//! FingerActor: autonomous owner of one finger's state.
//!
//! Each finger runs two logically concurrent activities:
//! - the per-frame update (StepFrame broadcast): classify Idle/Observing
//!   from proximity, dispatch the matching motion routine, report the pose
//! - the attention refresh loop: an independent tokio task with a
//!   randomized per-finger period that messages this actor's own mailbox
//!
//! Both touch the actor's fields only through its mailbox, so field-level
//! assignment atomicity needs no locks. The refresh task is aborted on
//! `Halt`, so no orphaned timer outlives its finger.

use std::sync::{Arc, Mutex};

use acton_reactive::prelude::*;
use nalgebra::{Point3, Unit, Vector3, distance};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::attention::AttentionSelector;
use crate::behavior::{BehaviorState, classify};
use crate::config::{BehaviorConfig, FieldConfig};
use crate::curves::ReachEnvelope;
use crate::field::{FingerId, FingerPose, Mount};
use crate::messages::{AttentionUpdate, Halt, PoseReport, StepFrame};
use crate::motion::{MotionPlanner, MotionState};
use crate::points::SharedPoints;

/// Current attention selection: which object, and where on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Attention {
    /// Index into the shared point-of-interest list (always valid once the
    /// finger is constructed)
    pub object_index: usize,
    /// Aim offset local to the object of interest
    pub local_offset: Vector3<f64>,
}

/// Actor state for a single finger.
#[derive(Clone)]
pub struct FingerActorState {
    /// Unique finger identifier
    pub id: FingerId,
    /// World position of the base frame
    pub base: Point3<f64>,
    /// Surface normal at the mount ("up")
    pub surface_normal: Unit<Vector3<f64>>,
    /// Fixed base-to-tip reach length
    pub reach_length: f64,
    /// Behavior classification tuning
    pub behavior: BehaviorConfig,
    /// Motion planner (tuning + envelope + wobble signal)
    pub planner: Option<MotionPlanner>,
    /// Interpolated orientation and local target
    pub motion: MotionState,
    /// Current attention selection (written only by AttentionUpdate)
    pub attention: Attention,
    /// Behavior state recomputed each frame
    pub state: BehaviorState,
    /// Shared read-only point-of-interest list
    pub points: Option<SharedPoints>,
    /// Attention refresh task, aborted on Halt
    pub refresh_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Default for FingerActorState {
    fn default() -> Self {
        Self {
            id: FingerId::default(),
            base: Point3::origin(),
            surface_normal: Vector3::y_axis(),
            reach_length: 0.0,
            behavior: BehaviorConfig::default(),
            planner: None,
            motion: MotionState::default(),
            attention: Attention::default(),
            state: BehaviorState::Idle,
            points: None,
            refresh_task: Arc::new(Mutex::new(None)),
        }
    }
}

impl std::fmt::Debug for FingerActorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerActorState")
            .field("id", &self.id)
            .field("reach_length", &self.reach_length)
            .field("state", &self.state)
            .field("attention", &self.attention)
            .finish()
    }
}

/// Actor representing one finger in the field.
///
/// Handles:
/// - `StepFrame` - classify, plan motion, broadcast the pose
/// - `AttentionUpdate` - adopt the refresh task's new selection
/// - `Halt` - abort the refresh task
pub struct FingerActor {
    /// Unique finger identifier
    pub id: FingerId,
    /// Placement geometry
    pub mount: Mount,
    /// Seed for this finger's private RNG stream
    pub seed: u64,
    /// Field configuration
    pub config: FieldConfig,
    /// Reach envelope shared by the field
    pub envelope: ReachEnvelope,
    /// Shared point-of-interest list
    pub points: SharedPoints,
}

impl FingerActor {
    /// Spawn this finger in the given runtime.
    ///
    /// The actor will:
    /// 1. Subscribe to `StepFrame` and `Halt` broadcasts
    /// 2. Pick its initial object of interest (so the selection is valid
    ///    from the first frame)
    /// 3. Start its attention refresh loop as a detached task
    pub async fn spawn(self, runtime: &mut ActorRuntime) -> ActorHandle {
        let mut actor = runtime.new_actor_with_name::<FingerActorState>(self.id.to_string());

        let reach_length = self.mount.reach_length();
        // the builder guarantees a non-empty list; the floor of 1 keeps a
        // directly spawned finger from drawing over an empty range
        let object_count = self
            .points
            .read()
            .map(|frames| frames.len())
            .unwrap_or(0)
            .max(1);

        let mut selector = AttentionSelector::new(self.seed, self.config.attention.clone());

        actor.model.id = self.id;
        actor.model.base = self.mount.base;
        actor.model.surface_normal = self.mount.surface_normal;
        actor.model.reach_length = reach_length;
        actor.model.behavior = self.config.behavior.clone();
        actor.model.planner = Some(MotionPlanner::new(
            self.config.motion.clone(),
            self.envelope,
            self.id.raw(),
        ));
        actor.model.motion = MotionState::at_rest(
            &self.config.motion,
            reach_length,
            self.mount.initial_orientation(),
        );
        actor.model.attention = Attention {
            object_index: selector.initial_object(object_count),
            local_offset: Vector3::zeros(),
        };
        actor.model.points = Some(self.points);

        // Subscribe to broadcast messages BEFORE starting
        actor.handle().subscribe::<StepFrame>().await;
        actor.handle().subscribe::<Halt>().await;

        // Attention refresh loop: reroll, apply via our own mailbox, then
        // sleep a fresh random delay. Unbounded; runs until aborted.
        let handle = actor.handle().clone();
        let task = tokio::spawn(async move {
            loop {
                let step = selector.step(object_count);
                handle
                    .send(AttentionUpdate {
                        object_index: step.object_index,
                        local_offset: step.local_offset,
                    })
                    .await;
                tokio::time::sleep(step.delay).await;
            }
        });
        actor.model.refresh_task = Arc::new(Mutex::new(Some(task)));

        configure_finger(&mut actor);

        actor.start().await
    }
}

/// Configure message handlers for the FingerActor.
fn configure_finger(actor: &mut ManagedActor<Idle, FingerActorState>) {
    // Handle AttentionUpdate - plain field assignments, nothing else
    actor.mutate_on::<AttentionUpdate>(|actor, context| {
        let msg = context.message();
        if let Some(index) = msg.object_index {
            actor.model.attention.object_index = index;
        }
        if let Some(offset) = msg.local_offset {
            actor.model.attention.local_offset = offset;
        }
        trace!(
            finger = %actor.model.id,
            object = actor.model.attention.object_index,
            "Attention refreshed"
        );
        Reply::ready()
    });

    // Handle StepFrame - classify, plan, report
    actor.mutate_on::<StepFrame>(|actor, context| {
        let msg = context.message().clone();

        let Some(points) = actor.model.points.clone() else {
            warn!(finger = %actor.model.id, "StepFrame before points were set");
            return Reply::ready();
        };

        // one short read of the shared list; only this finger's object is copied
        let object = match points.read() {
            Ok(frames) => frames.get(actor.model.attention.object_index).cloned(),
            Err(_) => {
                warn!(finger = %actor.model.id, "point-of-interest lock poisoned");
                None
            }
        };
        let Some(object) = object else {
            warn!(
                finger = %actor.model.id,
                object = actor.model.attention.object_index,
                "object of interest is out of range"
            );
            return Reply::ready();
        };

        let Some(planner) = actor.model.planner.clone() else {
            warn!(finger = %actor.model.id, "StepFrame before planner was set");
            return Reply::ready();
        };

        // proximity uses the object's frame origin only, not the aim offset
        let proximity = distance(&actor.model.base, &object.position);
        let state = classify(
            proximity,
            actor.model.reach_length,
            actor.model.behavior.detection_range_multiplier,
        );
        actor.model.state = state;

        let time_s = msg.now_ms as f64 / 1000.0;
        match state {
            BehaviorState::Idle => {
                planner.step_idle(
                    &mut actor.model.motion,
                    actor.model.reach_length,
                    time_s,
                    msg.dt,
                );
            }
            BehaviorState::Observing => {
                let world_target = object.world_point(&actor.model.attention.local_offset);
                planner.step_observing(
                    &mut actor.model.motion,
                    &actor.model.base,
                    &actor.model.surface_normal,
                    &world_target,
                    actor.model.reach_length,
                    time_s,
                    msg.dt,
                );
            }
        }

        let pose = FingerPose {
            id: actor.model.id,
            state,
            target_local: actor.model.motion.target_local,
            orientation: actor.model.motion.orientation,
        };

        let broker = actor.broker().clone();
        Reply::pending(async move {
            broker.broadcast(PoseReport { seq: msg.seq, pose }).await;
        })
    });

    // Handle Halt - abort the attention refresh loop promptly
    actor.mutate_on::<Halt>(|actor, _context| {
        if let Ok(mut slot) = actor.model.refresh_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
                trace!(finger = %actor.model.id, "Attention loop cancelled");
            }
        }
        Reply::ready()
    });
}
