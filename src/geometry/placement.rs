use nalgebra::{Translation3, UnitQuaternion};

use crate::math::{Isometry3, Point3, Vector3};

/// Position and orientation of an object.
///
/// `rotation` holds Euler angles in radians about X, Y and Z, composed in
/// that order: `R = Rx · Ry · Rz`. Walls and openings only ever set the Z
/// component (yaw); half-spaces use X and Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point3,
    pub rotation: Vector3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Vector3::zeros(),
        }
    }
}

impl Placement {
    /// Rotation about the vertical axis.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        self.rotation.z
    }

    /// Converts the placement into a rigid transform.
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3 {
        let r = &self.rotation;
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), r.x)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), r.y)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), r.z);
        Isometry3::from_parts(Translation3::from(self.position.coords), rotation)
    }
}
