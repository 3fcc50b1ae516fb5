use crate::error::Result;
use crate::geometry::Placement;
use crate::math::Point3;
use crate::store::{EntityRecord, EntityStore, ExpressId};

/// Parameters for a new opening.
#[derive(Debug, Clone, Copy)]
pub struct OpeningParams {
    pub width: f64,
    pub height: f64,
    pub position: Point3,
}

impl Default for OpeningParams {
    fn default() -> Self {
        Self {
            width: 0.9,
            height: 2.1,
            position: Point3::origin(),
        }
    }
}

/// An opening (door or window void) that may be bound to a wall.
///
/// The opening itself is owned by the model registry; walls only keep a
/// key to it.
#[derive(Debug, Clone)]
pub struct Opening {
    entity: ExpressId,
    placement_id: ExpressId,
    shape_id: ExpressId,
    representation_id: ExpressId,
    pub placement: Placement,
    pub width: f64,
    pub height: f64,
    revision: u64,
}

impl Opening {
    pub(crate) fn new(store: &mut EntityStore, params: &OpeningParams) -> Self {
        let placement = Placement {
            position: params.position,
            ..Placement::default()
        };
        let placement_id = store.insert(EntityRecord::LocalPlacement(placement));
        let representation_id =
            store.insert(EntityRecord::ShapeRepresentation { items: Vec::new() });
        let shape_id = store.insert(EntityRecord::ProductShape {
            representations: vec![representation_id],
        });
        let entity = store.insert(EntityRecord::Element {
            placement: placement_id,
            shape: shape_id,
        });
        Self {
            entity,
            placement_id,
            shape_id,
            representation_id,
            placement,
            width: params.width,
            height: params.height,
            revision: 0,
        }
    }

    /// Identifier of the opening's element record.
    #[must_use]
    pub fn entity(&self) -> ExpressId {
        self.entity
    }

    /// Number of times [`Opening::update`] has run.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Writes the current placement to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the placement record has been removed.
    pub fn update(&mut self, store: &mut EntityStore) -> Result<()> {
        store.set(self.placement_id, EntityRecord::LocalPlacement(self.placement))?;
        self.revision += 1;
        Ok(())
    }

    pub(crate) fn release(&self, store: &mut EntityStore) {
        for id in [
            self.entity,
            self.shape_id,
            self.representation_id,
            self.placement_id,
        ] {
            store.remove(id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn update_writes_placement_record() {
        let mut store = EntityStore::new();
        let mut opening = Opening::new(&mut store, &OpeningParams::default());
        opening.placement.position = Point3::new(2.0, 0.0, 1.0);
        opening.update(&mut store).unwrap();

        assert_eq!(opening.revision(), 1);
        assert_eq!(
            store.get(opening.placement_id).unwrap(),
            &EntityRecord::LocalPlacement(opening.placement)
        );
    }

    #[test]
    fn release_removes_records() {
        let mut store = EntityStore::new();
        let opening = Opening::new(&mut store, &OpeningParams::default());
        assert_eq!(store.len(), 4);
        opening.release(&mut store);
        assert!(store.is_empty());
    }
}
