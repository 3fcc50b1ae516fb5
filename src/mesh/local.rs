use tracing::{debug, warn};

use crate::elements::ModelId;
use crate::store::{EntityStore, ExpressId};

use super::{MeshGeometry, MeshSender, MeshService, StreamedMesh};

/// When a [`LocalMeshService`] answers requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Complete inside `stream_meshes`.
    #[default]
    Immediate,
    /// Queue until [`LocalMeshService::flush`].
    Deferred,
}

/// In-process mesh service.
///
/// The geometry identifier of an element is the first item of its shape
/// representation, so unchanged solids regenerate to the same identifier.
/// Results are captured at request time.
#[derive(Debug, Default)]
pub struct LocalMeshService {
    delivery: Delivery,
    queue: Vec<(StreamedMesh, MeshSender)>,
    requests: usize,
}

impl LocalMeshService {
    #[must_use]
    pub fn new(delivery: Delivery) -> Self {
        Self {
            delivery,
            queue: Vec::new(),
            requests: 0,
        }
    }

    /// Total number of `stream_meshes` calls received.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Number of queued, not yet delivered results.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Delivers every queued result. Returns how many were delivered.
    pub fn flush(&mut self) -> usize {
        let queued = std::mem::take(&mut self.queue);
        let count = queued.len();
        for (mesh, done) in queued {
            deliver(mesh, done);
        }
        count
    }

    /// Drops every queued completion without answering it.
    pub fn abandon(&mut self) -> usize {
        let count = self.queue.len();
        if count > 0 {
            warn!(count, "abandoning queued mesh regenerations");
        }
        self.queue.clear();
        count
    }
}

impl MeshService for LocalMeshService {
    fn stream_meshes(
        &mut self,
        store: &EntityStore,
        model: ModelId,
        elements: &[ExpressId],
        done: MeshSender,
    ) {
        self.requests += 1;
        let geometries = elements
            .iter()
            .filter_map(|&element| match store.representation_items(element) {
                Ok(items) => items.first().map(|&geometry| MeshGeometry { element, geometry }),
                Err(err) => {
                    warn!(%element, %err, "cannot mesh element");
                    None
                }
            })
            .collect();
        let mesh = StreamedMesh { geometries };
        debug!(model = model.get(), elements = elements.len(), "mesh requested");

        match self.delivery {
            Delivery::Immediate => deliver(mesh, done),
            Delivery::Deferred => self.queue.push((mesh, done)),
        }
    }
}

fn deliver(mesh: StreamedMesh, done: MeshSender) {
    if done.send(mesh).is_err() {
        debug!("mesh result discarded: request was superseded");
    }
}
