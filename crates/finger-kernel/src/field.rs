//! Field assembly: mounts, identity, and the builder that spawns a field.
//!
//! ## Usage
//!
//! ```ignore
//! use finger_kernel::{FieldBuilder, FieldConfig, Mount, ReachEnvelope, shared_points};
//! use acton_reactive::prelude::*;
//!
//! let mut runtime = ActonApp::launch_async().await;
//!
//! let points = shared_points(frames)?;
//! let coordinator = FieldBuilder::new(FieldConfig::default(), ReachEnvelope::default(), points, seed)?
//!     .with_mounts(mounts)
//!     .spawn(&mut runtime)
//!     .await?;
//!
//! // Register a frame driver, then send Frame { now_ms } to run the field.
//! coordinator.send(Frame { now_ms: 0 }).await;
//! ```

use std::collections::HashMap;

use acton_reactive::prelude::*;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3, distance};

use crate::actors::{FieldCoordinator, FingerActor};
use crate::behavior::BehaviorState;
use crate::config::FieldConfig;
use crate::curves::ReachEnvelope;
use crate::error::FieldError;
use crate::messages::RegisterFingers;
use crate::points::SharedPoints;

/// Base-to-tip distances below this are degenerate geometry.
const MIN_REACH_LENGTH: f64 = 1e-6;

/// Unique identifier for a finger within a field.
///
/// Assigned from the builder-owned counter at spawn; monotonically
/// increasing within a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct FingerId(pub u64);

impl FingerId {
    /// Get the raw ID value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FingerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "finger-{}", self.0)
    }
}

/// Placement geometry for one finger, supplied by the layout collaborator.
#[derive(Debug, Clone)]
pub struct Mount {
    /// World position of the base frame
    pub base: Point3<f64>,
    /// World position of the tip reference frame (defines reach length)
    pub tip: Point3<f64>,
    /// Unit surface normal at the placement point (the finger's "up")
    pub surface_normal: Unit<Vector3<f64>>,
}

impl Mount {
    /// Reach length: the fixed base-to-tip distance.
    pub fn reach_length(&self) -> f64 {
        distance(&self.base, &self.tip)
    }

    /// Initial base orientation: local Y along the surface normal, facing
    /// an arbitrary tangent until the first observing frame takes over.
    pub fn initial_orientation(&self) -> UnitQuaternion<f64> {
        let normal = self.surface_normal.as_ref();
        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::z()
        };
        let tangent = reference - normal * reference.dot(normal);
        match Unit::try_new(tangent, MIN_REACH_LENGTH) {
            Some(facing) => UnitQuaternion::face_towards(&facing, &self.surface_normal),
            None => UnitQuaternion::identity(),
        }
    }
}

/// One finger's output for one frame, consumed by the external IK solver.
#[derive(Debug, Clone)]
pub struct FingerPose {
    /// The finger this pose belongs to
    pub id: FingerId,
    /// Behavior state the pose was planned under
    pub state: BehaviorState,
    /// Local-space reach goal
    pub target_local: Vector3<f64>,
    /// World-space base orientation
    pub orientation: UnitQuaternion<f64>,
}

/// Result of a single frame across the whole field.
#[derive(Debug, Default, Clone)]
pub struct FrameResult {
    /// Frame sequence number
    pub seq: u64,
    /// Poses reported by every finger, ordered by finger id
    pub poses: Vec<FingerPose>,
    /// Fingers observing this frame
    pub observing: usize,
    /// Fingers idling this frame
    pub idle: usize,
}

/// Builder for spawning a finger field.
///
/// Owns the id counter (ids are injected at construction, not read from
/// process globals) and validates every precondition before any actor
/// spawns: configuration values, the non-empty point list, and each mount's
/// reach geometry.
pub struct FieldBuilder {
    config: FieldConfig,
    envelope: ReachEnvelope,
    points: SharedPoints,
    seed: u64,
    mounts: Vec<Mount>,
    next_id: u64,
}

impl FieldBuilder {
    /// Create a builder. Fails fast on invalid configuration or an empty
    /// point-of-interest list.
    pub fn new(
        config: FieldConfig,
        envelope: ReachEnvelope,
        points: SharedPoints,
        seed: u64,
    ) -> Result<Self, FieldError> {
        config.validate()?;
        let count = points
            .read()
            .map_err(|_| FieldError::invalid_config("point-of-interest lock poisoned"))?
            .len();
        if count == 0 {
            return Err(FieldError::EmptyPointsOfInterest);
        }
        Ok(Self {
            config,
            envelope,
            points,
            seed,
            mounts: Vec::new(),
            next_id: 0,
        })
    }

    /// Add one mount.
    pub fn add_mount(mut self, mount: Mount) -> Self {
        self.mounts.push(mount);
        self
    }

    /// Add a batch of mounts.
    pub fn with_mounts(mut self, mounts: impl IntoIterator<Item = Mount>) -> Self {
        self.mounts.extend(mounts);
        self
    }

    /// Spawn the coordinator and one FingerActor per mount.
    ///
    /// Returns the coordinator's actor handle. To run frames:
    /// 1. Register a frame driver via `RegisterFrameDriver`
    /// 2. Send `Frame { now_ms }` messages
    /// 3. Receive `FrameComplete { result }` on the driver
    pub async fn spawn(self, runtime: &mut ActorRuntime) -> Result<ActorHandle, FieldError> {
        if self.mounts.is_empty() {
            return Err(FieldError::invalid_config("field has no mounts"));
        }

        // validate all geometry before spawning anything
        let mut next_id = self.next_id;
        let mut planned = Vec::with_capacity(self.mounts.len());
        for mount in self.mounts {
            let id = FingerId(next_id);
            next_id += 1;
            let length = mount.reach_length();
            if length < MIN_REACH_LENGTH {
                return Err(FieldError::DegenerateReach {
                    id: id.raw(),
                    length,
                });
            }
            planned.push((id, mount));
        }

        let coordinator_handle = FieldCoordinator.spawn(runtime).await;

        let mut actors: HashMap<FingerId, ActorHandle> = HashMap::new();
        for (id, mount) in planned {
            let finger = FingerActor {
                id,
                mount,
                seed: finger_seed(self.seed, id.raw()),
                config: self.config.clone(),
                envelope: self.envelope.clone(),
                points: self.points.clone(),
            };
            let handle = finger.spawn(runtime).await;
            actors.insert(id, handle);
        }

        coordinator_handle.send(RegisterFingers { actors }).await;

        Ok(coordinator_handle)
    }
}

/// Derive a finger's RNG seed from the field seed and its id.
///
/// Distinct ids map to distinct seeds, keeping every finger's stream
/// statistically independent while the whole field stays reproducible.
fn finger_seed(field_seed: u64, id: u64) -> u64 {
    field_seed ^ id.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17)
}
