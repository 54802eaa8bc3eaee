//! Frame driver actor for receiving FrameComplete from the coordinator.
//!
//! This simple actor bridges the kernel's actor-based frame loop with the
//! experiment harness by forwarding FrameComplete results to an mpsc
//! channel.

use acton_reactive::prelude::*;
use tokio::sync::mpsc;

use finger_kernel::FrameResult;
use finger_kernel::messages::FrameComplete;

/// State for the frame driver actor.
#[derive(Default, Clone)]
pub struct FrameDriverState {
    /// Channel sender for forwarding frame results
    pub tx: Option<mpsc::Sender<FrameResult>>,
}

impl std::fmt::Debug for FrameDriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriverState")
            .field("has_tx", &self.tx.is_some())
            .finish()
    }
}

/// Actor that receives FrameComplete messages and forwards them to a
/// channel.
///
/// The harness creates this actor and registers it with the coordinator via
/// RegisterFrameDriver. When the coordinator completes a frame, it sends
/// FrameComplete here, which forwards the result for the harness loop to
/// receive.
pub struct FrameDriverActor {
    /// Channel sender for forwarding frame results
    tx: mpsc::Sender<FrameResult>,
}

impl FrameDriverActor {
    /// Create a new frame driver actor with the given channel sender.
    pub fn new(tx: mpsc::Sender<FrameResult>) -> Self {
        Self { tx }
    }

    /// Spawn the actor in the runtime.
    ///
    /// Returns the actor handle which should be sent to the coordinator
    /// via RegisterFrameDriver.
    pub async fn spawn(self, runtime: &mut ActorRuntime) -> ActorHandle {
        let mut actor = runtime.new_actor_with_name::<FrameDriverState>("FrameDriver".to_string());

        actor.model.tx = Some(self.tx);

        actor.act_on::<FrameComplete>(|actor, context| {
            let result = context.message().result.clone();
            let tx = actor.model.tx.clone();

            Reply::pending(async move {
                if let Some(tx) = tx {
                    // Ignore send errors - receiver may have been dropped
                    let _ = tx.send(result).await;
                }
            })
        });

        actor.start().await
    }
}
