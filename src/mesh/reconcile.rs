use std::collections::BTreeSet;

use tracing::debug;

use crate::elements::{WallId, WallType};
use crate::error::{RegenerationError, Result};
use crate::store::ExpressId;

use super::StreamedMesh;

/// Swaps a wall's geometry identifier for the one carried by `mesh`.
///
/// The wall's identifier set is replaced by the single new identifier and
/// every slot the wall held in the type's draw-batch and geometry maps is
/// re-keyed, so map sizes never change. A mesh without geometry for the
/// element leaves everything untouched.
pub(crate) fn reconcile(
    wall: WallId,
    element: ExpressId,
    current: &mut BTreeSet<ExpressId>,
    wall_type: &mut WallType,
    mesh: &StreamedMesh,
) -> Result<ExpressId> {
    let new_id = mesh
        .geometry_for(element)
        .ok_or(RegenerationError::EmptyMesh)?;

    let stale: Vec<ExpressId> = current.iter().copied().filter(|&id| id != new_id).collect();
    match stale.first() {
        Some(&old_id) => wall_type.rekey(old_id, new_id, element, wall),
        None if current.contains(&new_id) => return Ok(new_id),
        None => wall_type.register(new_id, element, wall),
    }
    for &extra in stale.iter().skip(1) {
        wall_type.release(extra);
    }

    current.clear();
    current.insert(new_id);
    debug!(%element, geometry = %new_id, stale = stale.len(), "geometry identifiers swapped");
    Ok(new_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slotmap::SlotMap;

    use super::*;
    use crate::mesh::MeshGeometry;
    use crate::store::{EntityRecord, EntityStore};

    struct Fixture {
        wall: WallId,
        element: ExpressId,
        old: ExpressId,
        new: ExpressId,
        wall_type: WallType,
    }

    fn fixture() -> Fixture {
        let mut walls: SlotMap<WallId, ()> = SlotMap::with_key();
        let wall = walls.insert(());
        let mut store = EntityStore::new();
        let mut id = || {
            store.insert(EntityRecord::RectangleProfile {
                x_dim: 1.0,
                y_dim: 1.0,
            })
        };
        let (element, old, new, other) = (id(), id(), id(), id());
        let mut wall_type = WallType::new(0.2);
        wall_type.register(old, element, wall);
        wall_type.register(other, other, wall);
        Fixture {
            wall,
            element,
            old,
            new,
            wall_type,
        }
    }

    fn mesh(element: ExpressId, geometry: ExpressId) -> StreamedMesh {
        StreamedMesh {
            geometries: vec![MeshGeometry { element, geometry }],
        }
    }

    #[test]
    fn swap_moves_both_map_slots() {
        let mut f = fixture();
        let mut current = BTreeSet::from([f.old]);
        let sizes = (f.wall_type.draw_batches().len(), f.wall_type.geometries().len());

        let done = mesh(f.element, f.new);
        let id = reconcile(f.wall, f.element, &mut current, &mut f.wall_type, &done).unwrap();

        assert_eq!(id, f.new);
        assert_eq!(current, BTreeSet::from([f.new]));
        assert!(!f.wall_type.draw_batches().contains_key(&f.old));
        assert!(!f.wall_type.geometries().contains_key(&f.old));
        assert!(f.wall_type.draw_batches().contains_key(&f.new));
        assert_eq!(f.wall_type.geometries().get(&f.new), Some(&f.wall));
        assert_eq!(
            sizes,
            (f.wall_type.draw_batches().len(), f.wall_type.geometries().len())
        );
    }

    #[test]
    fn same_identifier_is_a_no_op() {
        let mut f = fixture();
        let mut current = BTreeSet::from([f.old]);
        let done = mesh(f.element, f.old);
        let id = reconcile(f.wall, f.element, &mut current, &mut f.wall_type, &done).unwrap();
        assert_eq!(id, f.old);
        assert_eq!(current, BTreeSet::from([f.old]));
        assert!(f.wall_type.geometries().contains_key(&f.old));
    }

    #[test]
    fn empty_mesh_leaves_identifiers_unchanged() {
        let mut f = fixture();
        let mut current = BTreeSet::from([f.old]);
        let result = reconcile(
            f.wall,
            f.element,
            &mut current,
            &mut f.wall_type,
            &StreamedMesh::default(),
        );
        assert!(result.is_err());
        assert_eq!(current, BTreeSet::from([f.old]));
        assert!(f.wall_type.geometries().contains_key(&f.old));
    }
}
