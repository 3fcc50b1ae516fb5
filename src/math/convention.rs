use super::{Point3, Vector3};

/// Conversion between the building convention (Z up) and the geometry
/// convention (Y up) used by plane and ray computations.
///
/// The mapping is a rigid rotation about X, so distances and angles are
/// preserved and `to_building(to_geometry(p)) == p` exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisConvention;

impl AxisConvention {
    /// Maps a building-space point `(x, y, z)` to geometry space `(x, z, -y)`.
    #[must_use]
    pub fn point_to_geometry(self, p: &Point3) -> Point3 {
        Point3::new(p.x, p.z, -p.y)
    }

    /// Maps a building-space vector to geometry space.
    #[must_use]
    pub fn vector_to_geometry(self, v: &Vector3) -> Vector3 {
        Vector3::new(v.x, v.z, -v.y)
    }

    /// Maps a geometry-space point `(x, y, z)` back to building space `(x, -z, y)`.
    #[must_use]
    pub fn point_to_building(self, p: &Point3) -> Point3 {
        Point3::new(p.x, -p.z, p.y)
    }
}
