//! Persisted entity records.
//!
//! The store is an opaque record table keyed by [`ExpressId`]. Elements
//! write their placement, representation and solid records here; nothing is
//! validated against a schema.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ElementError, Result};
use crate::geometry::Placement;
use crate::math::Vector3;

/// Identifier of a record in the [`EntityStore`].
///
/// Geometry identifiers handed out by mesh regeneration live in the same
/// space, as they name the representation item a mesh was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpressId(u32);

impl ExpressId {
    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ExpressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A persisted record.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    /// A building element (wall or opening).
    Element {
        placement: ExpressId,
        shape: ExpressId,
    },
    LocalPlacement(Placement),
    ProductShape {
        representations: Vec<ExpressId>,
    },
    ShapeRepresentation {
        items: Vec<ExpressId>,
    },
    RectangleProfile {
        x_dim: f64,
        y_dim: f64,
    },
    ExtrudedArea {
        profile: ExpressId,
        direction: Vector3,
        depth: f64,
    },
    HalfSpace {
        placement: Placement,
    },
    /// `first` minus `second`.
    BooleanClipping {
        first: ExpressId,
        second: ExpressId,
    },
}

/// Record table keyed by [`ExpressId`].
#[derive(Debug)]
pub struct EntityStore {
    records: HashMap<ExpressId, EntityRecord>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            next_id: 1,
        }
    }
}

impl EntityStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record under a fresh identifier.
    pub fn insert(&mut self, record: EntityRecord) -> ExpressId {
        let id = ExpressId(self.next_id);
        self.next_id += 1;
        self.records.insert(id, record);
        id
    }

    /// Returns the record stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NotFound`] if no such record exists.
    pub fn get(&self, id: ExpressId) -> Result<&EntityRecord> {
        self.records
            .get(&id)
            .ok_or_else(|| ElementError::NotFound("entity record").into())
    }

    /// Overwrites the record stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NotFound`] if `id` was never inserted or has
    /// been removed.
    pub fn set(&mut self, id: ExpressId, record: EntityRecord) -> Result<()> {
        let slot = self
            .records
            .get_mut(&id)
            .ok_or(ElementError::NotFound("entity record"))?;
        *slot = record;
        Ok(())
    }

    /// Removes a record, returning it if it existed.
    pub fn remove(&mut self, id: ExpressId) -> Option<EntityRecord> {
        self.records.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ExpressId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Follows element → product shape → first representation and returns
    /// its item list.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NotFound`] if any link is missing or has an
    /// unexpected record kind.
    pub fn representation_items(&self, element: ExpressId) -> Result<&[ExpressId]> {
        let representation = self.first_representation(element)?;
        match self.get(representation)? {
            EntityRecord::ShapeRepresentation { items } => Ok(items),
            _ => Err(ElementError::NotFound("shape representation").into()),
        }
    }

    /// Replaces the item list of an element's first shape representation.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NotFound`] if the representation chain is broken.
    pub fn set_representation_items(
        &mut self,
        element: ExpressId,
        items: Vec<ExpressId>,
    ) -> Result<()> {
        let representation = self.first_representation(element)?;
        self.set(representation, EntityRecord::ShapeRepresentation { items })
    }

    fn first_representation(&self, element: ExpressId) -> Result<ExpressId> {
        let EntityRecord::Element { shape, .. } = self.get(element)? else {
            return Err(ElementError::NotFound("element").into());
        };
        match self.get(*shape)? {
            EntityRecord::ProductShape { representations } => representations
                .first()
                .copied()
                .ok_or_else(|| ElementError::NotFound("shape representation").into()),
            _ => Err(ElementError::NotFound("product shape").into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn element_with_items(store: &mut EntityStore, items: Vec<ExpressId>) -> ExpressId {
        let placement = store.insert(EntityRecord::LocalPlacement(Placement::default()));
        let representation = store.insert(EntityRecord::ShapeRepresentation { items });
        let shape = store.insert(EntityRecord::ProductShape {
            representations: vec![representation],
        });
        store.insert(EntityRecord::Element { placement, shape })
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut store = EntityStore::new();
        let a = store.insert(EntityRecord::HalfSpace {
            placement: Placement::default(),
        });
        let b = store.insert(EntityRecord::HalfSpace {
            placement: Placement::default(),
        });
        assert!(b > a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn set_on_missing_record_fails() {
        let mut store = EntityStore::new();
        let id = store.insert(EntityRecord::RectangleProfile {
            x_dim: 1.0,
            y_dim: 1.0,
        });
        store.remove(id);
        assert!(store
            .set(
                id,
                EntityRecord::RectangleProfile {
                    x_dim: 2.0,
                    y_dim: 2.0
                }
            )
            .is_err());
        assert!(store.get(id).is_err());
    }

    #[test]
    fn representation_items_follow_the_chain() {
        let mut store = EntityStore::new();
        let item = store.insert(EntityRecord::RectangleProfile {
            x_dim: 1.0,
            y_dim: 0.2,
        });
        let element = element_with_items(&mut store, vec![]);
        assert!(store.representation_items(element).unwrap().is_empty());

        store.set_representation_items(element, vec![item]).unwrap();
        assert_eq!(store.representation_items(element).unwrap(), &[item]);
    }

    #[test]
    fn representation_items_reject_non_element() {
        let mut store = EntityStore::new();
        let id = store.insert(EntityRecord::RectangleProfile {
            x_dim: 1.0,
            y_dim: 1.0,
        });
        assert!(store.representation_items(id).is_err());
    }
}
