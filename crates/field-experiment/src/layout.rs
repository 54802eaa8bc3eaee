//! Grid layout of fingers across room surfaces.
//!
//! This is the external FieldLayout collaborator: deterministic setup glue
//! that instantiates mounts on surfaces and wires the field to the shared
//! point-of-interest list. No behavior lives here.

use nalgebra::{Point3, Unit, Vector3};

use finger_kernel::Mount;

/// A rectangular surface fingers can be mounted on.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Corner of the surface rectangle
    pub origin: Point3<f64>,
    /// Outward surface normal (the mounted fingers' "up")
    pub normal: Unit<Vector3<f64>>,
    /// First in-plane edge direction
    pub tangent: Unit<Vector3<f64>>,
    /// Extent along the tangent, world units
    pub extent_u: f64,
    /// Extent along the bitangent (tangent x normal), world units
    pub extent_v: f64,
}

impl Surface {
    /// A horizontal floor patch at the given height.
    pub fn floor(origin: Point3<f64>, extent_u: f64, extent_v: f64) -> Self {
        Self {
            origin,
            normal: Vector3::y_axis(),
            tangent: Vector3::x_axis(),
            extent_u,
            extent_v,
        }
    }

    /// A wall patch facing +x.
    pub fn wall_facing_x(origin: Point3<f64>, extent_u: f64, extent_v: f64) -> Self {
        Self {
            origin,
            normal: Vector3::x_axis(),
            tangent: Vector3::z_axis(),
            extent_u,
            extent_v,
        }
    }

    /// Second in-plane edge direction.
    pub fn bitangent(&self) -> Vector3<f64> {
        self.tangent.cross(&self.normal)
    }
}

/// Place a rows x cols grid of mounts across a surface.
///
/// Cells are centered: a 1x1 grid puts its single finger in the middle of
/// the rectangle. Tips extend along the surface normal.
pub fn grid_mounts(
    surface: &Surface,
    rows: usize,
    cols: usize,
    finger_length: f64,
) -> Vec<Mount> {
    let bitangent = surface.bitangent();
    let mut mounts = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let u = surface.extent_u * ((col as f64 + 0.5) / cols as f64);
            let v = surface.extent_v * ((row as f64 + 0.5) / rows as f64);
            let base = surface.origin + surface.tangent.as_ref() * u + bitangent * v;
            let tip = base + surface.normal.as_ref() * finger_length;
            mounts.push(Mount {
                base,
                tip,
                surface_normal: surface.normal,
            });
        }
    }
    mounts
}
