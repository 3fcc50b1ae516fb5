use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// An infinite plane in 3D space, defined by a point on it and a unit normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    origin: Point3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from a coplanar point and a normal vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            normal: normal / len,
        })
    }

    /// Creates the plane through three points.
    ///
    /// The normal is `(c - b) × (a - b)`, so the winding of the points
    /// decides which side is the front.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are collinear or coincident.
    pub fn from_coplanar_points(a: &Point3, b: &Point3, c: &Point3) -> Result<Self> {
        let normal = (c - b).cross(&(a - b));
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("plane points are collinear".into()).into());
        }
        Self::from_normal(*b, normal)
    }

    /// Returns the reference point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit normal of the plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Distance of `point` from the plane, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&(point - self.origin))
    }

    /// Orthogonally projects a point onto the plane.
    #[must_use]
    pub fn project_point(&self, point: &Point3) -> Point3 {
        point - self.normal * self.signed_distance(point)
    }

    /// Where the infinite line through `origin` along `direction` crosses
    /// the plane. Both directions of the line count.
    ///
    /// Returns `None` when the line runs parallel to the plane, including
    /// when it lies inside it.
    #[must_use]
    pub fn line_crossing(&self, origin: &Point3, direction: &Vector3) -> Option<Point3> {
        let along = self.normal.dot(direction);
        if along.abs() < TOLERANCE {
            return None;
        }
        let t = -self.signed_distance(origin) / along;
        Some(origin + direction * t)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::from_normal(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn collinear_points_are_rejected() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        assert!(Plane::from_coplanar_points(&a, &b, &c).is_err());
    }

    #[test]
    fn coplanar_points_give_unit_normal() {
        let a = Point3::new(0.0, 0.0, 1.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(4.0, 0.0, 0.0);
        let plane = Plane::from_coplanar_points(&a, &b, &c).unwrap();
        assert_relative_eq!(plane.normal().norm(), 1.0);
        assert_relative_eq!(plane.normal().y.abs(), 1.0);
    }

    #[test]
    fn projection_drops_normal_component() {
        let plane = Plane::from_normal(Point3::new(0.0, 2.0, 0.0), Vector3::y()).unwrap();
        let projected = plane.project_point(&Point3::new(3.0, 7.0, -1.0));
        assert_relative_eq!(projected, Point3::new(3.0, 2.0, -1.0));
    }

    #[test]
    fn signed_distance_follows_normal() {
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -3.0))
            .unwrap();
        assert_relative_eq!(plane.signed_distance(&Point3::origin()), 2.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(5.0, 1.0, 2.0)), 0.0);
    }

    #[test]
    fn line_crosses_behind_its_origin() {
        let plane = Plane::from_normal(Point3::new(-2.0, 0.0, 0.0), Vector3::x()).unwrap();
        let hit = plane.line_crossing(&Point3::new(0.0, 1.0, 0.0), &Vector3::x());
        assert_relative_eq!(hit.unwrap(), Point3::new(-2.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn oblique_line_crossing() {
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 4.0), Vector3::z()).unwrap();
        let hit = plane.line_crossing(&Point3::origin(), &Vector3::new(1.0, 0.0, 2.0));
        assert_relative_eq!(hit.unwrap(), Point3::new(2.0, 0.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn parallel_line_never_crosses() {
        let plane = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        assert!(plane.line_crossing(&Point3::new(0.0, 0.0, 1.0), &Vector3::x()).is_none());
        assert!(plane.line_crossing(&Point3::new(1.0, 1.0, 0.0), &Vector3::y()).is_none());
    }
}
