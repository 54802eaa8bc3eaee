//! Acton-reactive actors for the finger field.
//!
//! ```text
//! Frame → FieldCoordinator
//!   ├─ StepFrame (broadcast) → FingerActors
//!   │   └─ classify → plan → PoseReport (broadcast) → Coordinator
//!   └─ FrameComplete → frame driver (when every finger reported)
//!
//! per finger, independently:
//!   refresh task ── AttentionUpdate ──► FingerActor mailbox
//!   (random 0.5–1.0 s period; aborted on Halt)
//! ```
//!
//! FingerActors own their state; the per-frame update and the attention
//! refresh are serialized by the mailbox, so no field needs a lock. The
//! only cross-actor shared state is the read-only point-of-interest list.

mod coordinator;
mod finger_actor;

pub use coordinator::{FieldCoordinator, FieldCoordinatorState};
pub use finger_actor::{Attention, FingerActor, FingerActorState};
