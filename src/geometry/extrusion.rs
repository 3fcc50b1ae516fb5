use tracing::debug;

use crate::error::Result;
use crate::math::{Vector2, Vector3};
use crate::store::{EntityRecord, EntityStore, ExpressId};

use super::HalfSpace;

/// Rectangular cross-section centred on its local origin.
#[derive(Debug, Clone)]
pub struct RectangleProfile {
    id: ExpressId,
    /// `x` runs along the sweep's local X axis, `y` across it.
    pub dimension: Vector2,
}

impl RectangleProfile {
    /// Creates a unit profile and its record.
    pub fn new(store: &mut EntityStore) -> Self {
        let dimension = Vector2::new(1.0, 1.0);
        let id = store.insert(Self::record(&dimension));
        Self { id, dimension }
    }

    #[must_use]
    pub fn id(&self) -> ExpressId {
        self.id
    }

    /// Writes the current dimensions to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile record has been removed.
    pub fn update(&self, store: &mut EntityStore) -> Result<()> {
        store.set(self.id, Self::record(&self.dimension))
    }

    fn record(dimension: &Vector2) -> EntityRecord {
        EntityRecord::RectangleProfile {
            x_dim: dimension.x,
            y_dim: dimension.y,
        }
    }
}

#[derive(Debug, Clone)]
struct Subtraction {
    half_space: HalfSpace,
    half_space_id: ExpressId,
    clipping_id: ExpressId,
}

/// A profile swept vertically by `depth`, minus an ordered list of
/// half-spaces.
///
/// The solid's current item is the swept area when nothing is subtracted,
/// otherwise the last boolean clipping of the chain
/// `((sweep - h0) - h1) - ...`. Appending a subtraction yields a new item;
/// updating never does.
#[derive(Debug, Clone)]
pub struct Extrusion {
    id: ExpressId,
    pub profile: RectangleProfile,
    pub depth: f64,
    subtractions: Vec<Subtraction>,
}

impl Extrusion {
    /// Creates an extrusion of `profile` with unit depth.
    pub fn new(store: &mut EntityStore, profile: RectangleProfile) -> Self {
        let depth = 1.0;
        let id = store.insert(Self::sweep_record(profile.id(), depth));
        Self {
            id,
            profile,
            depth,
            subtractions: Vec::new(),
        }
    }

    /// Identifier of the swept-area record.
    #[must_use]
    pub fn id(&self) -> ExpressId {
        self.id
    }

    /// Identifier of the item that represents the finished solid.
    #[must_use]
    pub fn item(&self) -> ExpressId {
        self.subtractions
            .last()
            .map_or(self.id, |sub| sub.clipping_id)
    }

    /// Half-spaces subtracted from the sweep, in application order.
    pub fn subtractions(&self) -> impl ExactSizeIterator<Item = &HalfSpace> {
        self.subtractions.iter().map(|sub| &sub.half_space)
    }

    /// Appends a half-space to the subtraction list.
    ///
    /// The records are created immediately; call [`Extrusion::update`] to
    /// refresh the chain after other edits.
    pub fn add_subtraction(&mut self, store: &mut EntityStore, half_space: HalfSpace) {
        let first = self.item();
        let half_space_id = store.insert(EntityRecord::HalfSpace {
            placement: half_space.placement,
        });
        let clipping_id = store.insert(EntityRecord::BooleanClipping {
            first,
            second: half_space_id,
        });
        debug!(%clipping_id, count = self.subtractions.len() + 1, "subtraction added");
        self.subtractions.push(Subtraction {
            half_space,
            half_space_id,
            clipping_id,
        });
    }

    /// Rewrites the profile, sweep and clipping records in place.
    ///
    /// # Errors
    ///
    /// Returns an error if any owned record has been removed from the store.
    pub fn update(&self, store: &mut EntityStore) -> Result<()> {
        self.profile.update(store)?;
        store.set(self.id, Self::sweep_record(self.profile.id(), self.depth))?;

        let mut first = self.id;
        for sub in &self.subtractions {
            store.set(
                sub.half_space_id,
                EntityRecord::HalfSpace {
                    placement: sub.half_space.placement,
                },
            )?;
            store.set(
                sub.clipping_id,
                EntityRecord::BooleanClipping {
                    first,
                    second: sub.half_space_id,
                },
            )?;
            first = sub.clipping_id;
        }
        Ok(())
    }

    /// Removes every record owned by this solid.
    pub fn release(&self, store: &mut EntityStore) {
        for sub in &self.subtractions {
            store.remove(sub.clipping_id);
            store.remove(sub.half_space_id);
        }
        store.remove(self.id);
        store.remove(self.profile.id());
    }

    fn sweep_record(profile: ExpressId, depth: f64) -> EntityRecord {
        EntityRecord::ExtrudedArea {
            profile,
            direction: Vector3::z(),
            depth,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn extrusion(store: &mut EntityStore) -> Extrusion {
        let profile = RectangleProfile::new(store);
        Extrusion::new(store, profile)
    }

    #[test]
    fn item_is_sweep_without_subtractions() {
        let mut store = EntityStore::new();
        let solid = extrusion(&mut store);
        assert_eq!(solid.item(), solid.id());
        assert_eq!(solid.subtractions().len(), 0);
    }

    #[test]
    fn update_writes_dimensions_and_depth() {
        let mut store = EntityStore::new();
        let mut solid = extrusion(&mut store);
        solid.profile.dimension = Vector2::new(4.0, 0.25);
        solid.depth = 2.5;
        solid.update(&mut store).unwrap();

        assert_eq!(
            store.get(solid.profile.id()).unwrap(),
            &EntityRecord::RectangleProfile {
                x_dim: 4.0,
                y_dim: 0.25
            }
        );
        match store.get(solid.id()).unwrap() {
            EntityRecord::ExtrudedArea { depth, .. } => assert!((depth - 2.5).abs() < 1e-12),
            other => panic!("expected ExtrudedArea, got {other:?}"),
        }
    }

    #[test]
    fn subtractions_chain_in_order() {
        let mut store = EntityStore::new();
        let mut solid = extrusion(&mut store);
        solid.add_subtraction(&mut store, HalfSpace::along_axis(1.0, Vector3::zeros()));
        let first_item = solid.item();
        solid.add_subtraction(&mut store, HalfSpace::along_axis(2.0, Vector3::zeros()));
        let second_item = solid.item();

        assert_ne!(first_item, solid.id());
        assert_ne!(second_item, first_item);
        match store.get(second_item).unwrap() {
            EntityRecord::BooleanClipping { first, .. } => assert_eq!(*first, first_item),
            other => panic!("expected BooleanClipping, got {other:?}"),
        }

        solid.update(&mut store).unwrap();
        assert_eq!(solid.item(), second_item);
        let offsets: Vec<f64> = solid.subtractions().map(HalfSpace::offset).collect();
        assert_eq!(offsets, vec![1.0, 2.0]);
    }

    #[test]
    fn release_removes_every_record() {
        let mut store = EntityStore::new();
        let mut solid = extrusion(&mut store);
        solid.add_subtraction(&mut store, HalfSpace::default());
        assert_eq!(store.len(), 4);
        solid.release(&mut store);
        assert!(store.is_empty());
    }
}
