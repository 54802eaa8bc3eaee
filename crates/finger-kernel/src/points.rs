//! Points of interest: the shared, read-only frames fingers aim at.

use std::sync::{Arc, RwLock};

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::error::FieldError;

/// One trackable world-space frame (a body part, in the reference setup).
#[derive(Debug, Clone)]
pub struct PoiFrame {
    /// World position of the frame origin
    pub position: Point3<f64>,
    /// World orientation of the frame
    pub orientation: UnitQuaternion<f64>,
}

impl PoiFrame {
    /// Create a frame at a position with identity orientation.
    pub fn at(position: Point3<f64>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Resolve an offset local to this frame into a world point.
    pub fn world_point(&self, local_offset: &Vector3<f64>) -> Point3<f64> {
        self.position + self.orientation * local_offset
    }
}

/// Shared point-of-interest list.
///
/// Written by the external tracker, read by every finger. The list length
/// is fixed for the session; only the frames' positions/orientations move.
pub type SharedPoints = Arc<RwLock<Vec<PoiFrame>>>;

/// Wrap a frame list for sharing across the field.
///
/// An empty list is a fatal configuration error: attention selection over
/// zero objects is undefined, so it is refused here rather than discovered
/// at runtime.
pub fn shared_points(frames: Vec<PoiFrame>) -> Result<SharedPoints, FieldError> {
    if frames.is_empty() {
        return Err(FieldError::EmptyPointsOfInterest);
    }
    Ok(Arc::new(RwLock::new(frames)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_empty_list() {
        assert_eq!(
            shared_points(Vec::new()).unwrap_err(),
            FieldError::EmptyPointsOfInterest
        );
    }

    #[test]
    fn test_accepts_single_frame() {
        let points = shared_points(vec![PoiFrame::at(Point3::new(1.0, 2.0, 3.0))]).unwrap();
        assert_eq!(points.read().unwrap().len(), 1);
    }

    #[test]
    fn test_world_point_applies_orientation() {
        let frame = PoiFrame {
            position: Point3::new(1.0, 0.0, 0.0),
            orientation: UnitQuaternion::from_axis_angle(
                &Vector3::y_axis(),
                std::f64::consts::FRAC_PI_2,
            ),
        };
        // a local +x offset rotated a quarter turn around +y lands on -z
        let world = frame.world_point(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(world.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(world.z, -1.0, epsilon = 1e-12);
    }
}
