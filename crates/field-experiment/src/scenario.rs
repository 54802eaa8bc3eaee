//! Simulated points of interest: orbiting body-part frames.
//!
//! The tracker is external to the kernel; this scenario stands in for it by
//! rewriting the shared frames each tick. Orbits are sized so the paths
//! cross the fingers' detection boundary, exercising both behaviors and the
//! transitions between them.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use tracing::warn;

use finger_kernel::{PoiFrame, SharedPoints, shared_points};

/// One circular path in a horizontal plane.
#[derive(Debug, Clone)]
pub struct OrbitPath {
    /// Center of the orbit
    pub center: Point3<f64>,
    /// Orbit radius, world units
    pub radius: f64,
    /// Angular velocity, radians per second
    pub angular_velocity: f64,
    /// Phase offset, radians
    pub phase: f64,
}

impl OrbitPath {
    /// Position along the orbit at time `t` seconds.
    fn position(&self, t: f64) -> Point3<f64> {
        let angle = self.angular_velocity * t + self.phase;
        self.center + Vector3::new(angle.cos(), 0.0, angle.sin()) * self.radius
    }

    /// Frame along the orbit at time `t`: positioned on the circle, yawed
    /// to face along the direction of travel.
    fn frame(&self, t: f64) -> PoiFrame {
        let angle = self.angular_velocity * t + self.phase;
        PoiFrame {
            position: self.position(t),
            orientation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -angle),
        }
    }
}

/// Scenario driving the shared point-of-interest list.
pub struct OrbitScenario {
    paths: Vec<OrbitPath>,
    points: SharedPoints,
}

impl OrbitScenario {
    /// Build the scenario and the shared list it writes, initialized at
    /// t = 0.
    pub fn new(paths: Vec<OrbitPath>) -> Result<Self, finger_kernel::FieldError> {
        let frames = paths.iter().map(|path| path.frame(0.0)).collect();
        let points = shared_points(frames)?;
        Ok(Self { paths, points })
    }

    /// The shared list fingers read from.
    pub fn points(&self) -> SharedPoints {
        self.points.clone()
    }

    /// Advance every frame to the given time.
    pub fn advance(&self, now_ms: u64) {
        let t = now_ms as f64 / 1000.0;
        let Ok(mut frames) = self.points.write() else {
            warn!("point-of-interest lock poisoned; scenario frozen");
            return;
        };
        for (frame, path) in frames.iter_mut().zip(&self.paths) {
            *frame = path.frame(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_orbit() -> OrbitPath {
        OrbitPath {
            center: Point3::new(0.0, 1.0, 0.0),
            radius: 2.0,
            angular_velocity: std::f64::consts::PI,
            phase: 0.0,
        }
    }

    #[test]
    fn test_scenario_requires_at_least_one_path() {
        assert!(OrbitScenario::new(Vec::new()).is_err());
    }

    #[test]
    fn test_orbit_stays_on_circle() {
        let path = one_orbit();
        for i in 0..100 {
            let p = path.position(i as f64 * 0.1);
            let planar = Vector3::new(p.x, 0.0, p.z);
            assert_relative_eq!(planar.norm(), 2.0, epsilon = 1e-9);
            assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_advance_moves_the_shared_frames() {
        let scenario = OrbitScenario::new(vec![one_orbit()]).unwrap();
        let before = scenario.points().read().unwrap()[0].position;
        scenario.advance(500);
        let after = scenario.points().read().unwrap()[0].position;
        assert!((after - before).norm() > 0.1);
    }

    #[test]
    fn test_half_period_is_antipodal() {
        let path = one_orbit();
        let start = path.position(0.0);
        let half = path.position(1.0); // pi rad/s for 1 s
        assert_relative_eq!(start.x, -half.x, epsilon = 1e-9);
    }
}
