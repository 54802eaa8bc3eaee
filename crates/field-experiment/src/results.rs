//! Results collection and output for field runs.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use finger_kernel::FrameResult;

/// Per-frame metrics kept in the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Frame sequence number
    pub seq: u64,
    /// Fingers observing this frame
    pub observing: usize,
    /// Fingers idling this frame
    pub idle: usize,
    /// Mean local target extension (local Y) across the field
    pub mean_extension: f64,
}

impl FrameMetrics {
    /// Summarize one frame result.
    pub fn from_result(result: &FrameResult) -> Self {
        let mean_extension = if result.poses.is_empty() {
            0.0
        } else {
            result.poses.iter().map(|p| p.target_local.y).sum::<f64>()
                / result.poses.len() as f64
        };
        Self {
            seq: result.seq,
            observing: result.observing,
            idle: result.idle,
            mean_extension,
        }
    }
}

/// Summary of a single field run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Random seed the run used
    pub seed: u64,
    /// Number of fingers in the field
    pub fingers: usize,
    /// Number of frames driven
    pub frames: usize,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub ended_at: DateTime<Utc>,
    /// Total finger-frames spent observing
    pub observing_finger_frames: usize,
    /// Total finger-frames spent idle
    pub idle_finger_frames: usize,
    /// Per-frame metrics
    pub frame_metrics: Vec<FrameMetrics>,
}

impl RunSummary {
    /// Write the summary as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Generate a timestamped output path from the given path.
/// e.g., "summary.json" -> "summary-20260108-010530.json"
pub fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("summary");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}-{}.{}", stem, timestamp, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use finger_kernel::{BehaviorState, FingerId, FingerPose};
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_frame_metrics_mean_extension() {
        let result = FrameResult {
            seq: 1,
            poses: vec![
                FingerPose {
                    id: FingerId(0),
                    state: BehaviorState::Observing,
                    target_local: Vector3::new(0.0, 0.4, 0.0),
                    orientation: UnitQuaternion::identity(),
                },
                FingerPose {
                    id: FingerId(1),
                    state: BehaviorState::Idle,
                    target_local: Vector3::new(0.0, 0.8, 0.0),
                    orientation: UnitQuaternion::identity(),
                },
            ],
            observing: 1,
            idle: 1,
        };
        let metrics = FrameMetrics::from_result(&result);
        assert_eq!(metrics.observing, 1);
        assert!((metrics.mean_extension - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_empty_frame_has_zero_extension() {
        let metrics = FrameMetrics::from_result(&FrameResult::default());
        assert_eq!(metrics.mean_extension, 0.0);
    }

    #[test]
    fn test_timestamped_path_keeps_stem_and_extension() {
        let path = timestamped_path(Path::new("out/summary.json"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("summary-"));
        assert!(name.ends_with(".json"));
        assert_eq!(path.parent().unwrap(), Path::new("out"));
    }
}
