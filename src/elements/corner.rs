use std::f64::consts::FRAC_PI_2;

use tracing::info;

use crate::error::{CornerError, ElementError, Result};
use crate::geometry::{HalfSpace, Plane};
use crate::math::{up, AxisConvention, Point3, Vector3, TOLERANCE};
use crate::mesh::MeshService;

use super::{Model, WallAxis, WallId};

/// Which endpoint of a wall takes part in a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallEnd {
    Start,
    End,
}

impl WallEnd {
    fn point(self, axis: &WallAxis) -> Point3 {
        match self {
            Self::Start => axis.start,
            Self::End => axis.end,
        }
    }

    fn opposite_point(self, axis: &WallAxis) -> Point3 {
        match self {
            Self::Start => axis.end,
            Self::End => axis.start,
        }
    }

    /// Unit vector pointing from the opposite endpoint towards this one.
    fn outward(self, axis: &WallAxis) -> Vector3 {
        match self {
            Self::Start => -axis.direction,
            Self::End => axis.direction,
        }
    }
}

/// Moves one endpoint of `wall` to where its axis meets the axis of
/// `target`, then updates both walls.
pub struct ExtendWall {
    wall: WallId,
    target: WallId,
    end: WallEnd,
}

impl ExtendWall {
    #[must_use]
    pub fn new(wall: WallId, target: WallId, end: WallEnd) -> Self {
        Self { wall, target, end }
    }

    /// Computes the meeting point without touching either wall.
    ///
    /// # Errors
    ///
    /// Returns [`CornerError::ParallelAxes`] when the axes never meet,
    /// [`CornerError::CollapsedWall`] when the wall would end up with zero
    /// length, [`CornerError::ReversedWall`] when the point lies past the
    /// opposite endpoint, and element errors for missing or zero-length
    /// walls.
    pub fn resolve<S: MeshService>(&self, model: &Model<S>) -> Result<Point3> {
        if self.wall == self.target {
            return Err(ElementError::SameWall.into());
        }
        let axis = model.wall(self.wall)?.axis()?;
        let target = model.wall(self.target)?.axis()?;

        let point = meeting_point(&axis, &target, self.end)?;
        let anchor = self.end.opposite_point(&axis);
        if nalgebra::distance(&point, &anchor) < TOLERANCE {
            return Err(CornerError::CollapsedWall.into());
        }
        // The endpoint may grow or shrink but never cross the fixed one.
        if (point - anchor).dot(&self.end.outward(&axis)) <= TOLERANCE {
            return Err(CornerError::ReversedWall.into());
        }
        Ok(point)
    }

    /// Moves the endpoint and updates both walls. Returns the new endpoint.
    ///
    /// Nothing is mutated when the point cannot be resolved. If the
    /// updates themselves fail, the moved endpoint is kept.
    ///
    /// # Errors
    ///
    /// See [`ExtendWall::resolve`] and [`Model::update_wall`].
    pub fn execute<S: MeshService>(&self, model: &mut Model<S>) -> Result<Point3> {
        let point = self.resolve(model)?;

        let wall = model.wall_mut(self.wall)?;
        match self.end {
            WallEnd::Start => wall.start_point = point,
            WallEnd::End => wall.end_point = point,
        }
        model.update_wall(self.wall)?;
        model.update_wall(self.target)?;

        info!(
            x = point.x,
            y = point.y,
            z = point.z,
            end = ?self.end,
            "wall extended to corner"
        );
        Ok(point)
    }
}

/// Intersects the axis line of `wall` through its chosen endpoint with the
/// vertical plane containing the axis of `target`.
///
/// The computation runs in the geometry convention; inputs are converted
/// on the way in and the result on the way out.
fn meeting_point(wall: &WallAxis, target: &WallAxis, end: WallEnd) -> Result<Point3> {
    let convention = AxisConvention;
    let normal = target.direction.cross(&up());
    let plane = Plane::from_normal(
        convention.point_to_geometry(&target.start),
        convention.vector_to_geometry(&normal),
    )?;

    let direction = match end {
        WallEnd::Start => wall.direction,
        WallEnd::End => -wall.direction,
    };
    let origin = convention.point_to_geometry(&end.point(wall));
    let direction = convention.vector_to_geometry(&direction);

    let point = plane
        .line_crossing(&origin, &direction)
        .ok_or(CornerError::ParallelAxes)?;
    Ok(convention.point_to_building(&point))
}

/// Result of [`AddCorner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Shared corner point.
    pub point: Point3,
    /// Yaw of the target wall minus yaw of the extended wall.
    pub angle: f64,
    /// Half-space appended to the extended wall.
    pub wall_cut: HalfSpace,
    /// Half-space appended to the target wall.
    pub target_cut: HalfSpace,
}

/// Closes the joint between two walls: extends `wall` onto `target` and
/// miters both solids with one half-space subtraction each.
pub struct AddCorner {
    wall: WallId,
    target: WallId,
    end: WallEnd,
}

impl AddCorner {
    #[must_use]
    pub fn new(wall: WallId, target: WallId, end: WallEnd) -> Self {
        Self { wall, target, end }
    }

    /// Executes the corner.
    ///
    /// The two walls are mutated one after the other without rollback: an
    /// update failure after the extension leaves the extension in place.
    ///
    /// # Errors
    ///
    /// Returns [`CornerError::DegenerateAngle`] for near-parallel walls,
    /// before anything is mutated, plus every [`ExtendWall`] error.
    pub fn execute<S: MeshService>(&self, model: &mut Model<S>) -> Result<Corner> {
        let before = self.angle(model)?;
        if before.sin().abs() < model.config().min_corner_sin {
            return Err(CornerError::DegenerateAngle { angle: before }.into());
        }

        let point = ExtendWall::new(self.wall, self.target, self.end).execute(model)?;

        let wall = model.wall(self.wall)?;
        let target = model.wall(self.target)?;
        let (axis, target_axis) = (wall.axis()?, target.axis()?);
        let wall_width = model.wall_type(wall.wall_type())?.width;
        let target_width = model.wall_type(target.wall_type())?.width;

        let angle = target_axis.yaw() - axis.yaw();
        let sin = angle.sin();

        let cos_between = (axis.direction.dot(&target_axis.direction)
            / (axis.direction.norm() * target_axis.direction.norm()))
        .clamp(-1.0, 1.0);
        let skew = cos_between.asin();
        let sign = if (skew < 0.0 && self.end == WallEnd::End)
            || (skew > 0.0 && self.end == WallEnd::Start)
        {
            -1.0
        } else {
            1.0
        };

        let wall_distance = nalgebra::distance(&axis.mid_point(), &point);
        let target_distance = nalgebra::distance(&target_axis.mid_point(), &point);

        let wall_cut = HalfSpace::along_axis(
            wall_distance - wall_width / (2.0 * sin),
            Vector3::new(FRAC_PI_2, angle, 0.0),
        );
        let target_cut = HalfSpace::along_axis(
            sign * target_distance + target_width / (2.0 * sin),
            Vector3::new(-FRAC_PI_2, angle, 0.0),
        );

        let (walls, mut scene) = model.parts();
        let [wall, target] = walls
            .get_disjoint_mut([self.wall, self.target])
            .ok_or(ElementError::NotFound("wall"))?;
        wall.add_subtraction(scene.store, wall_cut);
        target.add_subtraction(scene.store, target_cut);
        target.update(&mut scene)?;
        wall.update(&mut scene)?;

        info!(angle, offset = wall_cut.offset(), "corner added");
        Ok(Corner {
            point,
            angle,
            wall_cut,
            target_cut,
        })
    }

    fn angle<S: MeshService>(&self, model: &Model<S>) -> Result<f64> {
        if self.wall == self.target {
            return Err(ElementError::SameWall.into());
        }
        let axis = model.wall(self.wall)?.axis()?;
        let target = model.wall(self.target)?.axis()?;
        Ok(target.yaw() - axis.yaw())
    }
}
