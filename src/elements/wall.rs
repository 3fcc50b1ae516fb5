use std::collections::BTreeSet;

use slotmap::SlotMap;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{ElementError, Result};
use crate::geometry::{Extrusion, HalfSpace, Placement, RectangleProfile};
use crate::math::{Point3, Vector2, Vector3, TOLERANCE};
use crate::mesh::{MeshReceiver, MeshService};
use crate::store::{EntityRecord, EntityStore, ExpressId};

use super::{ModelId, Opening, OpeningBinder, OpeningId, WallType, WallTypeId};

/// Validated wall axis: two distinct endpoints and the unit direction
/// between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallAxis {
    pub start: Point3,
    pub end: Point3,
    pub direction: Vector3,
    pub length: f64,
}

impl WallAxis {
    /// # Errors
    ///
    /// Returns [`ElementError::ZeroLengthWall`] if the points coincide.
    pub fn new(start: Point3, end: Point3) -> Result<Self> {
        let delta = end - start;
        let length = delta.norm();
        if length < TOLERANCE {
            return Err(ElementError::ZeroLengthWall.into());
        }
        Ok(Self {
            start,
            end,
            direction: delta / length,
            length,
        })
    }

    #[must_use]
    pub fn mid_point(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }

    /// Rotation about the vertical axis, derived from the direction.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        self.direction.y.atan2(self.direction.x)
    }
}

/// Everything a wall touches during an update besides itself.
pub(crate) struct Scene<'a> {
    pub model: ModelId,
    pub store: &'a mut EntityStore,
    pub types: &'a SlotMap<WallTypeId, WallType>,
    pub openings: &'a mut SlotMap<OpeningId, Opening>,
    pub mesh: &'a mut dyn MeshService,
}

/// Record identifiers owned by a wall.
#[derive(Debug, Clone, Copy)]
struct WallRecords {
    entity: ExpressId,
    placement: ExpressId,
    shape: ExpressId,
    representation: ExpressId,
}

/// A straight wall swept from a rectangular profile along its axis.
///
/// `start_point`, `end_point` and `height` are the editable parameters;
/// everything else is derived by [`SimpleWall::update`].
#[derive(Debug)]
pub struct SimpleWall {
    records: WallRecords,
    wall_type: WallTypeId,
    pub start_point: Point3,
    pub end_point: Point3,
    pub height: f64,
    placement: Placement,
    body: Extrusion,
    pub(crate) geometries: BTreeSet<ExpressId>,
    openings: OpeningBinder,
    pub(crate) pending: Option<MeshReceiver>,
}

impl SimpleWall {
    pub(crate) fn new(
        store: &mut EntityStore,
        wall_type: WallTypeId,
        start_point: Point3,
        end_point: Point3,
        height: f64,
    ) -> Self {
        let profile = RectangleProfile::new(store);
        let body = Extrusion::new(store, profile);

        let placement = Placement::default();
        let placement_id = store.insert(EntityRecord::LocalPlacement(placement));
        let representation = store.insert(EntityRecord::ShapeRepresentation {
            items: vec![body.item()],
        });
        let shape = store.insert(EntityRecord::ProductShape {
            representations: vec![representation],
        });
        let entity = store.insert(EntityRecord::Element {
            placement: placement_id,
            shape,
        });

        Self {
            records: WallRecords {
                entity,
                placement: placement_id,
                shape,
                representation,
            },
            wall_type,
            start_point,
            end_point,
            height,
            placement,
            geometries: BTreeSet::from([body.item()]),
            body,
            openings: OpeningBinder::default(),
            pending: None,
        }
    }

    /// Identifier of the wall's element record.
    #[must_use]
    pub fn entity(&self) -> ExpressId {
        self.records.entity
    }

    #[must_use]
    pub fn wall_type(&self) -> WallTypeId {
        self.wall_type
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        nalgebra::distance(&self.start_point, &self.end_point)
    }

    #[must_use]
    pub fn mid_point(&self) -> Point3 {
        nalgebra::center(&self.start_point, &self.end_point)
    }

    /// Unit vector from start to end.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::ZeroLengthWall`] if the endpoints coincide.
    pub fn direction(&self) -> Result<Vector3> {
        Ok(self.axis()?.direction)
    }

    /// # Errors
    ///
    /// Returns [`ElementError::ZeroLengthWall`] if the endpoints coincide.
    pub fn axis(&self) -> Result<WallAxis> {
        WallAxis::new(self.start_point, self.end_point)
    }

    /// Placement written by the last update.
    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The wall's solid.
    #[must_use]
    pub fn body(&self) -> &Extrusion {
        &self.body
    }

    /// Current geometry identifiers, as of the last applied regeneration.
    #[must_use]
    pub fn geometries(&self) -> &BTreeSet<ExpressId> {
        &self.geometries
    }

    #[must_use]
    pub fn openings(&self) -> &OpeningBinder {
        &self.openings
    }

    /// Whether a requested regeneration has not been applied yet.
    #[must_use]
    pub fn is_regenerating(&self) -> bool {
        self.pending.is_some()
    }

    /// Recomputes the solid, placement and bound openings from the current
    /// parameters and requests a new mesh.
    ///
    /// Idempotent: unchanged parameters produce identical records. The
    /// geometry identifiers change only once the regeneration is applied.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::ZeroLengthWall`] before touching anything if
    /// the endpoints coincide, or [`ElementError::NotFound`] if the wall
    /// type or an owned record is gone.
    pub(crate) fn update(&mut self, scene: &mut Scene<'_>) -> Result<()> {
        let axis = self.axis()?;
        let width = scene
            .types
            .get(self.wall_type)
            .ok_or(ElementError::NotFound("wall type"))?
            .width;
        let yaw = axis.yaw();

        self.openings
            .update_all(&axis, yaw, scene.openings, scene.store)?;

        self.body.profile.dimension = Vector2::new(axis.length, width);
        self.body.depth = self.height;
        self.body.update(scene.store)?;

        self.placement.rotation.z = yaw;
        self.placement.position = axis.mid_point();
        scene
            .store
            .set(self.records.placement, EntityRecord::LocalPlacement(self.placement))?;
        scene
            .store
            .set_representation_items(self.records.entity, vec![self.body.item()])?;

        self.request_regeneration(scene);
        Ok(())
    }

    /// Binds an opening and requests a new mesh.
    pub(crate) fn add_opening(&mut self, id: OpeningId, scene: &mut Scene<'_>) -> Result<f64> {
        let axis = self.axis()?;
        let opening = scene
            .openings
            .get_mut(id)
            .ok_or(ElementError::NotFound("opening"))?;
        let distance = self.openings.set_opening(&axis, id, opening, scene.store)?;
        self.request_regeneration(scene);
        Ok(distance)
    }

    /// Unbinds an opening and requests a new mesh.
    pub(crate) fn remove_opening(&mut self, id: OpeningId, scene: &mut Scene<'_>) -> bool {
        let removed = self.openings.remove(id).is_some();
        self.request_regeneration(scene);
        removed
    }

    pub(crate) fn add_subtraction(&mut self, store: &mut EntityStore, half_space: HalfSpace) {
        self.body.add_subtraction(store, half_space);
    }

    /// Removes every record the wall owns. Half-spaces it added to other
    /// walls are not touched.
    pub(crate) fn release(&self, store: &mut EntityStore) {
        self.body.release(store);
        let WallRecords {
            entity,
            placement,
            shape,
            representation,
        } = self.records;
        for id in [entity, shape, representation, placement] {
            store.remove(id);
        }
    }

    fn request_regeneration(&mut self, scene: &mut Scene<'_>) {
        let (done, receiver) = oneshot::channel();
        scene
            .mesh
            .stream_meshes(scene.store, scene.model, &[self.records.entity], done);
        if self.pending.replace(receiver).is_some() {
            debug!(wall = %self.records.entity, "pending regeneration superseded");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn axis_rejects_coincident_points() {
        let p = Point3::new(1.0, 1.0, 0.0);
        assert!(WallAxis::new(p, p).is_err());
    }

    #[test]
    fn axis_derives_length_direction_and_yaw() {
        let axis = WallAxis::new(Point3::new(1.0, 1.0, 0.0), Point3::new(4.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(axis.length, 18.0_f64.sqrt());
        assert_relative_eq!(axis.direction.norm(), 1.0);
        assert_relative_eq!(axis.yaw(), FRAC_PI_4);
        assert_relative_eq!(axis.mid_point(), Point3::new(2.5, 2.5, 0.0));
    }
}
