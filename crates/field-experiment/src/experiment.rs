//! Field runner: assemble a field, drive the frame loop, collect results.
//!
//! The frame clock is external to the kernel: this harness advances the
//! scenario, sends `Frame` to the coordinator, and waits for the matching
//! `FrameComplete` before the next tick. Timestamps come from a simulated
//! clock (frame x interval) so runs are reproducible for a given seed.

use std::time::Instant;

use acton_reactive::prelude::*;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use finger_kernel::messages::{Frame, RegisterFrameDriver};
use finger_kernel::{FieldBuilder, FieldConfig, FrameResult, Halt, Mount, ReachEnvelope};

use crate::driver::FrameDriverActor;
use crate::results::{FrameMetrics, RunSummary};
use crate::scenario::OrbitScenario;

/// Configuration for one field run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of frames to drive
    pub frames: usize,
    /// Random seed for the field
    pub seed: u64,
    /// Sleep the frame interval between ticks (wall-clock pacing)
    pub realtime: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            seed: 0,
            realtime: false,
        }
    }
}

/// Runs one field to completion.
pub struct FieldRunner {
    run: RunConfig,
    field: FieldConfig,
    mounts: Vec<Mount>,
    scenario: OrbitScenario,
}

impl FieldRunner {
    /// Create a runner over the given placement and scenario.
    pub fn new(
        run: RunConfig,
        field: FieldConfig,
        mounts: Vec<Mount>,
        scenario: OrbitScenario,
    ) -> Self {
        Self {
            run,
            field,
            mounts,
            scenario,
        }
    }

    /// Drive the field for the configured number of frames.
    pub async fn run(self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start = Instant::now();
        let finger_count = self.mounts.len();
        let interval_ms = self.field.frame_interval_ms;

        let mut runtime = ActonApp::launch_async().await;

        let coordinator = FieldBuilder::new(
            self.field.clone(),
            ReachEnvelope::default(),
            self.scenario.points(),
            self.run.seed,
        )
        .context("field configuration rejected")?
        .with_mounts(self.mounts)
        .spawn(&mut runtime)
        .await
        .context("field failed to spawn")?;

        // Observer for FrameComplete results
        let (frame_tx, mut frame_rx) = tokio::sync::mpsc::channel::<FrameResult>(64);
        let driver_handle = FrameDriverActor::new(frame_tx).spawn(&mut runtime).await;
        coordinator
            .send(RegisterFrameDriver {
                handle: driver_handle,
            })
            .await;

        info!(
            fingers = finger_count,
            frames = self.run.frames,
            seed = self.run.seed,
            "Starting field run"
        );

        let mut frame_metrics = Vec::with_capacity(self.run.frames);
        let mut observing_finger_frames = 0usize;
        let mut idle_finger_frames = 0usize;

        for frame in 0..self.run.frames {
            let now_ms = frame as u64 * interval_ms;

            // the tracker moves first, then the field sees the new frames
            self.scenario.advance(now_ms);
            coordinator.send(Frame { now_ms }).await;

            let Some(result) = frame_rx.recv().await else {
                info!("FrameComplete channel closed unexpectedly");
                break;
            };

            observing_finger_frames += result.observing;
            idle_finger_frames += result.idle;
            debug!(
                seq = result.seq,
                observing = result.observing,
                idle = result.idle,
                "Frame recorded"
            );
            frame_metrics.push(FrameMetrics::from_result(&result));

            if self.run.realtime {
                tokio::time::sleep(std::time::Duration::from_millis(interval_ms)).await;
            }
        }

        // Tear the field down: abort every attention loop, then stop actors
        runtime.broker().broadcast(Halt).await;
        let _ = runtime.shutdown_all().await;

        let summary = RunSummary {
            seed: self.run.seed,
            fingers: finger_count,
            frames: frame_metrics.len(),
            started_at,
            ended_at: Utc::now(),
            observing_finger_frames,
            idle_finger_frames,
            frame_metrics,
        };

        info!(
            frames = summary.frames,
            observing_finger_frames = summary.observing_finger_frames,
            idle_finger_frames = summary.idle_finger_frames,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Field run complete"
        );

        Ok(summary)
    }
}
