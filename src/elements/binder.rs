use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::Plane;
use crate::math::{up, Vector2};
use crate::store::EntityStore;

use super::{Opening, OpeningId, WallAxis};

/// Axis-relative anchor of an opening bound to a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningBinding {
    /// Key into the model's opening registry. Not owning.
    pub opening: OpeningId,
    /// Signed plan distance from the wall start along its direction.
    /// Negative when the opening sits behind the start point.
    pub distance: f64,
}

/// Openings bound to one wall, keyed by opening identity.
#[derive(Debug, Clone, Default)]
pub struct OpeningBinder {
    bindings: SecondaryMap<OpeningId, OpeningBinding>,
}

impl OpeningBinder {
    #[must_use]
    pub fn get(&self, opening: OpeningId) -> Option<&OpeningBinding> {
        self.bindings.get(opening)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpeningBinding> {
        self.bindings.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Snaps `opening` onto the wall's vertical plane and records its
    /// distance along the axis, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall axis is vertical (no vertical plane
    /// through it is defined) or the opening's placement record is gone.
    pub fn set_opening(
        &mut self,
        axis: &WallAxis,
        id: OpeningId,
        opening: &mut Opening,
        store: &mut EntityStore,
    ) -> Result<f64> {
        let raised = axis.start + up();
        let plane = Plane::from_coplanar_points(&raised, &axis.start, &axis.end)?;
        let projected = plane.project_point(&opening.placement.position);
        opening.placement.position = projected;
        opening.update(store)?;

        // Measured in plan so the vertical offset of the opening never
        // leaks into the stored distance.
        let offset = projected - axis.start;
        let planar = Vector2::new(axis.direction.x, axis.direction.y);
        let distance = Vector2::new(offset.x, offset.y).dot(&planar) / planar.norm_squared();

        debug!(opening = %opening.entity(), distance, "opening bound");
        self.bindings.insert(id, OpeningBinding { opening: id, distance });
        Ok(distance)
    }

    /// Moves every bound opening to its stored distance along `axis`,
    /// keeping its height, and aligns it with the wall yaw.
    ///
    /// Bindings whose opening no longer exists are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if an opening's placement record is gone.
    pub fn update_all(
        &mut self,
        axis: &WallAxis,
        yaw: f64,
        openings: &mut SlotMap<OpeningId, Opening>,
        store: &mut EntityStore,
    ) -> Result<()> {
        let mut dangling = Vec::new();
        for (id, binding) in &self.bindings {
            let Some(opening) = openings.get_mut(id) else {
                dangling.push(id);
                continue;
            };
            let target = axis.start + axis.direction * binding.distance;
            opening.placement.position.x = target.x;
            opening.placement.position.y = target.y;
            opening.placement.rotation.z = yaw;
            opening.update(store)?;
        }
        for id in dangling {
            warn!(?id, "dropping binding to a removed opening");
            self.bindings.remove(id);
        }
        Ok(())
    }

    /// Forgets the binding. The opening keeps its last position.
    pub fn remove(&mut self, opening: OpeningId) -> Option<OpeningBinding> {
        self.bindings.remove(opening)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::elements::OpeningParams;
    use crate::math::Point3;

    fn setup(position: Point3) -> (EntityStore, SlotMap<OpeningId, Opening>, OpeningId) {
        let mut store = EntityStore::new();
        let mut openings = SlotMap::with_key();
        let params = OpeningParams {
            position,
            ..OpeningParams::default()
        };
        let id = openings.insert(Opening::new(&mut store, &params));
        (store, openings, id)
    }

    fn axis(start: Point3, end: Point3) -> WallAxis {
        WallAxis::new(start, end).unwrap()
    }

    #[test]
    fn set_opening_projects_onto_wall_plane() {
        let (mut store, mut openings, id) = setup(Point3::new(2.0, 0.7, 1.0));
        let mut binder = OpeningBinder::default();
        let wall = axis(Point3::origin(), Point3::new(5.0, 0.0, 0.0));

        let distance = binder
            .set_opening(&wall, id, &mut openings[id], &mut store)
            .unwrap();

        assert_relative_eq!(distance, 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            openings[id].placement.position,
            Point3::new(2.0, 0.0, 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn distance_is_negative_behind_start() {
        let (mut store, mut openings, id) = setup(Point3::new(-1.5, 3.0, 0.0));
        let mut binder = OpeningBinder::default();
        let wall = axis(Point3::origin(), Point3::new(5.0, 0.0, 0.0));

        let distance = binder
            .set_opening(&wall, id, &mut openings[id], &mut store)
            .unwrap();
        assert_relative_eq!(distance, -1.5, epsilon = 1e-12);
    }

    #[test]
    fn rebinding_overwrites() {
        let (mut store, mut openings, id) = setup(Point3::new(1.0, 0.0, 0.0));
        let mut binder = OpeningBinder::default();
        let wall = axis(Point3::origin(), Point3::new(5.0, 0.0, 0.0));

        binder.set_opening(&wall, id, &mut openings[id], &mut store).unwrap();
        openings[id].placement.position.x = 3.0;
        binder.set_opening(&wall, id, &mut openings[id], &mut store).unwrap();

        assert_eq!(binder.len(), 1);
        assert_relative_eq!(binder.get(id).unwrap().distance, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn update_all_follows_a_rotated_axis() {
        let (mut store, mut openings, id) = setup(Point3::new(2.0, 0.0, 1.2));
        let mut binder = OpeningBinder::default();
        let wall = axis(Point3::origin(), Point3::new(5.0, 0.0, 0.0));
        binder.set_opening(&wall, id, &mut openings[id], &mut store).unwrap();

        let turned = axis(Point3::origin(), Point3::new(0.0, 5.0, 0.0));
        binder
            .update_all(&turned, FRAC_PI_2, &mut openings, &mut store)
            .unwrap();

        let placement = openings[id].placement;
        assert_relative_eq!(placement.position, Point3::new(0.0, 2.0, 1.2), epsilon = 1e-12);
        assert_relative_eq!(placement.rotation.z, FRAC_PI_2);
    }

    #[test]
    fn removed_opening_binding_is_dropped() {
        let (mut store, mut openings, id) = setup(Point3::new(2.0, 0.0, 0.0));
        let mut binder = OpeningBinder::default();
        let wall = axis(Point3::origin(), Point3::new(5.0, 0.0, 0.0));
        binder.set_opening(&wall, id, &mut openings[id], &mut store).unwrap();

        openings.remove(id);
        binder.update_all(&wall, 0.0, &mut openings, &mut store).unwrap();
        assert!(binder.is_empty());
    }

    #[test]
    fn remove_keeps_last_position() {
        let (mut store, mut openings, id) = setup(Point3::new(2.0, 0.0, 0.0));
        let mut binder = OpeningBinder::default();
        let wall = axis(Point3::origin(), Point3::new(5.0, 0.0, 0.0));
        binder.set_opening(&wall, id, &mut openings[id], &mut store).unwrap();

        assert!(binder.remove(id).is_some());
        let moved = axis(Point3::new(1.0, 0.0, 0.0), Point3::new(6.0, 0.0, 0.0));
        binder.update_all(&moved, 0.0, &mut openings, &mut store).unwrap();
        assert_relative_eq!(openings[id].placement.position.x, 2.0);
    }
}
