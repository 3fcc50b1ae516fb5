//! Asynchronous mesh regeneration.
//!
//! [`Model::update_wall`](crate::elements::Model::update_wall) only *requests*
//! a new mesh. The service answers through a one-shot completion; the wall's
//! geometry identifiers are swapped when that completion is consumed through
//! [`Model::regenerated`](crate::elements::Model::regenerated) or
//! [`Model::poll_regeneration`](crate::elements::Model::poll_regeneration).

mod local;
mod reconcile;

pub use local::{Delivery, LocalMeshService};
pub(crate) use reconcile::reconcile;

use tokio::sync::oneshot;

use crate::elements::ModelId;
use crate::store::{EntityStore, ExpressId};

/// One regenerated geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshGeometry {
    /// Element the geometry belongs to.
    pub element: ExpressId,
    /// Identifier of the new geometry.
    pub geometry: ExpressId,
}

/// Result of one [`MeshService::stream_meshes`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamedMesh {
    pub geometries: Vec<MeshGeometry>,
}

impl StreamedMesh {
    /// First geometry produced for `element`.
    #[must_use]
    pub fn geometry_for(&self, element: ExpressId) -> Option<ExpressId> {
        self.geometries
            .iter()
            .find(|g| g.element == element)
            .map(|g| g.geometry)
    }
}

/// Completion handle handed to a [`MeshService`]. Fires at most once.
pub type MeshSender = oneshot::Sender<StreamedMesh>;

/// Receiving side of a regeneration request.
pub type MeshReceiver = oneshot::Receiver<StreamedMesh>;

/// External service that turns element records into meshes.
///
/// Implementations may complete `done` synchronously or later. Dropping
/// `done` without sending is treated as a failed regeneration.
pub trait MeshService {
    fn stream_meshes(
        &mut self,
        store: &EntityStore,
        model: ModelId,
        elements: &[ExpressId],
        done: MeshSender,
    );
}
