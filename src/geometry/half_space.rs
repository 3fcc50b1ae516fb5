use crate::error::Result;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Placement, Plane};

/// An unbounded volume on one side of a plane, used only as a boolean
/// subtraction operand.
///
/// The boundary plane is the local XY plane of `placement`; the removed
/// material lies behind its normal. Coordinates are relative to the solid
/// the half-space is subtracted from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HalfSpace {
    pub placement: Placement,
}

impl HalfSpace {
    /// Creates a half-space offset `offset` along the local X axis and
    /// rotated by `rotation` (Euler angles, radians).
    #[must_use]
    pub fn along_axis(offset: f64, rotation: Vector3) -> Self {
        Self {
            placement: Placement {
                position: Point3::new(offset, 0.0, 0.0),
                rotation,
            },
        }
    }

    /// Offset of the boundary plane along the local X axis.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.placement.position.x
    }

    /// Returns the boundary plane in the solid's local coordinates.
    ///
    /// # Errors
    ///
    /// Never fails for a finite placement; the error is kept for the plane
    /// constructor's contract.
    pub fn boundary_plane(&self) -> Result<Plane> {
        let iso = self.placement.to_isometry();
        Plane::from_normal(self.placement.position, iso.rotation * Vector3::z())
    }

    /// Whether `point` (solid-local) lies in the removed volume. Points on
    /// the boundary plane count as removed.
    ///
    /// # Errors
    ///
    /// Propagates [`HalfSpace::boundary_plane`] errors.
    pub fn contains(&self, point: &Point3) -> Result<bool> {
        let plane = self.boundary_plane()?;
        Ok(plane.signed_distance(point) <= TOLERANCE)
    }
}
