use std::collections::HashMap;

use tracing::warn;

use crate::store::ExpressId;

use super::WallId;

/// Render batch for one geometry: the elements drawn with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawBatch {
    pub instances: Vec<ExpressId>,
}

impl DrawBatch {
    #[must_use]
    pub fn single(element: ExpressId) -> Self {
        Self {
            instances: vec![element],
        }
    }
}

/// Shared wall type.
///
/// Supplies the width of every wall bound to it and owns two
/// geometry-keyed maps. Each wall is the only writer of the slots keyed by
/// its own geometry identifiers.
#[derive(Debug, Clone)]
pub struct WallType {
    pub width: f64,
    draw_batches: HashMap<ExpressId, DrawBatch>,
    geometries: HashMap<ExpressId, WallId>,
}

impl WallType {
    #[must_use]
    pub fn new(width: f64) -> Self {
        Self {
            width,
            draw_batches: HashMap::new(),
            geometries: HashMap::new(),
        }
    }

    /// Draw batches keyed by geometry identifier.
    #[must_use]
    pub fn draw_batches(&self) -> &HashMap<ExpressId, DrawBatch> {
        &self.draw_batches
    }

    /// Owning wall of each geometry identifier.
    #[must_use]
    pub fn geometries(&self) -> &HashMap<ExpressId, WallId> {
        &self.geometries
    }

    /// Creates the slots for a freshly created geometry.
    pub(crate) fn register(&mut self, geometry: ExpressId, element: ExpressId, wall: WallId) {
        self.draw_batches.insert(geometry, DrawBatch::single(element));
        self.geometries.insert(geometry, wall);
    }

    /// Moves the slots keyed by `old` to `new`, keeping one entry per slot.
    pub(crate) fn rekey(
        &mut self,
        old: ExpressId,
        new: ExpressId,
        element: ExpressId,
        wall: WallId,
    ) {
        let batch = self.draw_batches.remove(&old).unwrap_or_else(|| {
            warn!(geometry = %old, "draw batch slot missing, recreating");
            DrawBatch::single(element)
        });
        self.draw_batches.insert(new, batch);

        if self.geometries.remove(&old).is_none() {
            warn!(geometry = %old, "geometry slot missing, recreating");
        }
        self.geometries.insert(new, wall);
    }

    /// Drops both slots keyed by `geometry`.
    pub(crate) fn release(&mut self, geometry: ExpressId) {
        self.draw_batches.remove(&geometry);
        self.geometries.remove(&geometry);
    }
}
