use slotmap::SlotMap;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info};

use crate::error::{ElementError, RegenerationError, Result};
use crate::math::Point3;
use crate::mesh::{reconcile, LocalMeshService, MeshService, StreamedMesh};
use crate::store::{EntityStore, ExpressId};

use super::{
    Opening, OpeningId, OpeningParams, Scene, SimpleWall, WallId, WallType, WallTypeId,
};

/// Identifier of a model, passed through to the mesh service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(u32);

impl ModelId {
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Defaults and guards applied by a [`Model`].
#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    /// Height of newly created walls.
    pub wall_height: f64,
    /// Start point of newly created walls.
    pub wall_start: Point3,
    /// End point of newly created walls.
    pub wall_end: Point3,
    /// Corners whose `|sin(angle)|` falls below this are rejected.
    pub min_corner_sin: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            wall_height: 3.0,
            wall_start: Point3::new(0.0, 0.0, 0.0),
            wall_end: Point3::new(1.0, 0.0, 0.0),
            min_corner_sin: 1e-6,
        }
    }
}

/// Arena that owns walls, wall types, openings and their records.
///
/// Elements reference each other through typed keys: a wall names its
/// type and its bound openings by key and never owns them.
#[derive(Debug)]
pub struct Model<S = LocalMeshService> {
    id: ModelId,
    config: ModelConfig,
    store: EntityStore,
    types: SlotMap<WallTypeId, WallType>,
    openings: SlotMap<OpeningId, Opening>,
    walls: SlotMap<WallId, SimpleWall>,
    mesh: S,
}

impl Model<LocalMeshService> {
    /// Creates an empty model with default configuration and an
    /// immediately answering local mesh service.
    #[must_use]
    pub fn new(id: ModelId) -> Self {
        Self::with_service(id, ModelConfig::default(), LocalMeshService::default())
    }
}

impl<S: MeshService> Model<S> {
    #[must_use]
    pub fn with_service(id: ModelId, config: ModelConfig, mesh: S) -> Self {
        Self {
            id,
            config,
            store: EntityStore::new(),
            types: SlotMap::with_key(),
            openings: SlotMap::with_key(),
            walls: SlotMap::with_key(),
            mesh,
        }
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    #[must_use]
    pub fn mesh_service(&self) -> &S {
        &self.mesh
    }

    pub fn mesh_service_mut(&mut self) -> &mut S {
        &mut self.mesh
    }

    // --- Wall types ---

    pub fn add_wall_type(&mut self, width: f64) -> WallTypeId {
        self.types.insert(WallType::new(width))
    }

    /// # Errors
    ///
    /// Returns an error if the type does not exist.
    pub fn wall_type(&self, id: WallTypeId) -> Result<&WallType> {
        self.types
            .get(id)
            .ok_or_else(|| ElementError::NotFound("wall type").into())
    }

    /// Mutable access to a shared type. Walls using it pick up a new width
    /// on their next update.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist.
    pub fn wall_type_mut(&mut self, id: WallTypeId) -> Result<&mut WallType> {
        self.types
            .get_mut(id)
            .ok_or_else(|| ElementError::NotFound("wall type").into())
    }

    // --- Walls ---

    /// Creates a wall of the given type with the configured default
    /// endpoints and height. The wall is not updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist.
    pub fn add_wall(&mut self, wall_type: WallTypeId) -> Result<WallId> {
        let Self {
            config,
            store,
            types,
            walls,
            ..
        } = self;
        let ty = types
            .get_mut(wall_type)
            .ok_or(ElementError::NotFound("wall type"))?;
        let wall = SimpleWall::new(
            store,
            wall_type,
            config.wall_start,
            config.wall_end,
            config.wall_height,
        );
        let (entity, geometries) = (wall.entity(), wall.geometries().clone());
        let id = walls.insert(wall);
        for geometry in geometries {
            ty.register(geometry, entity, id);
        }
        debug!(wall = %entity, "wall created");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns an error if the wall does not exist.
    pub fn wall(&self, id: WallId) -> Result<&SimpleWall> {
        self.walls
            .get(id)
            .ok_or_else(|| ElementError::NotFound("wall").into())
    }

    /// Mutable access for editing the wall's parameters. Call
    /// [`Model::update_wall`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist.
    pub fn wall_mut(&mut self, id: WallId) -> Result<&mut SimpleWall> {
        self.walls
            .get_mut(id)
            .ok_or_else(|| ElementError::NotFound("wall").into())
    }

    pub fn walls(&self) -> impl Iterator<Item = (WallId, &SimpleWall)> {
        self.walls.iter()
    }

    /// Recomputes a wall from its current parameters: bound openings,
    /// profile `(length, width)`, depth `height`, yaw and midpoint
    /// placement. Then requests a new mesh.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::ZeroLengthWall`] before anything changes if
    /// the endpoints coincide, and [`ElementError::NotFound`] for a missing
    /// wall, type or record.
    pub fn update_wall(&mut self, id: WallId) -> Result<()> {
        let (walls, mut scene) = self.parts();
        walls
            .get_mut(id)
            .ok_or(ElementError::NotFound("wall"))?
            .update(&mut scene)
    }

    /// Destroys a wall, releasing its records and its slots in the type
    /// maps.
    ///
    /// Half-spaces this wall contributed to a neighbour during corner
    /// resolution stay on the neighbour's solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist.
    pub fn remove_wall(&mut self, id: WallId) -> Result<()> {
        let wall = self
            .walls
            .remove(id)
            .ok_or(ElementError::NotFound("wall"))?;
        if let Some(ty) = self.types.get_mut(wall.wall_type()) {
            for &geometry in wall.geometries() {
                ty.release(geometry);
            }
        }
        wall.release(&mut self.store);
        info!(wall = %wall.entity(), "wall removed");
        Ok(())
    }

    // --- Openings ---

    pub fn add_opening(&mut self, params: &OpeningParams) -> OpeningId {
        let opening = Opening::new(&mut self.store, params);
        self.openings.insert(opening)
    }

    /// # Errors
    ///
    /// Returns an error if the opening does not exist.
    pub fn opening(&self, id: OpeningId) -> Result<&Opening> {
        self.openings
            .get(id)
            .ok_or_else(|| ElementError::NotFound("opening").into())
    }

    /// # Errors
    ///
    /// Returns an error if the opening does not exist.
    pub fn opening_mut(&mut self, id: OpeningId) -> Result<&mut Opening> {
        self.openings
            .get_mut(id)
            .ok_or_else(|| ElementError::NotFound("opening").into())
    }

    /// Deletes an opening. Walls still bound to it drop the binding on
    /// their next update.
    ///
    /// # Errors
    ///
    /// Returns an error if the opening does not exist.
    pub fn remove_opening(&mut self, id: OpeningId) -> Result<()> {
        let opening = self
            .openings
            .remove(id)
            .ok_or(ElementError::NotFound("opening"))?;
        opening.release(&mut self.store);
        Ok(())
    }

    /// Binds an opening to a wall: snaps it onto the wall plane, stores its
    /// axis distance and requests a new wall mesh. Returns the distance.
    ///
    /// # Errors
    ///
    /// Returns an error if either element is missing or the wall is
    /// degenerate.
    pub fn bind_opening(&mut self, wall: WallId, opening: OpeningId) -> Result<f64> {
        let (walls, mut scene) = self.parts();
        walls
            .get_mut(wall)
            .ok_or(ElementError::NotFound("wall"))?
            .add_opening(opening, &mut scene)
    }

    /// Unbinds an opening and requests a new wall mesh. Returns whether a
    /// binding existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist.
    pub fn unbind_opening(&mut self, wall: WallId, opening: OpeningId) -> Result<bool> {
        let (walls, mut scene) = self.parts();
        Ok(walls
            .get_mut(wall)
            .ok_or(ElementError::NotFound("wall"))?
            .remove_opening(opening, &mut scene))
    }

    // --- Regeneration ---

    /// Waits for the wall's pending regeneration and applies it. Returns
    /// the wall's new geometry identifier.
    ///
    /// Dropping the returned future before it resolves leaves the request
    /// pending, so it can still be awaited or polled later.
    ///
    /// # Errors
    ///
    /// Returns [`RegenerationError::NothingPending`] if no regeneration was
    /// requested, [`RegenerationError::Cancelled`] if the service dropped
    /// it and [`RegenerationError::EmptyMesh`] if it produced nothing. In
    /// every error case the identifiers are left unchanged.
    pub async fn regenerated(&mut self, id: WallId) -> Result<ExpressId> {
        let receiver = self
            .wall_mut(id)?
            .pending
            .as_mut()
            .ok_or(RegenerationError::NothingPending)?;
        let outcome = receiver.await;
        self.wall_mut(id)?.pending = None;
        let mesh = outcome.map_err(|_| RegenerationError::Cancelled)?;
        self.apply_mesh(id, &mesh)
    }

    /// Applies the wall's pending regeneration if it has completed.
    ///
    /// Returns `Ok(None)` when nothing is pending or the result has not
    /// arrived yet.
    ///
    /// # Errors
    ///
    /// Same as [`Model::regenerated`], except that nothing pending is not
    /// an error.
    pub fn poll_regeneration(&mut self, id: WallId) -> Result<Option<ExpressId>> {
        let wall = self.wall_mut(id)?;
        let Some(receiver) = wall.pending.as_mut() else {
            return Ok(None);
        };
        let mesh = match receiver.try_recv() {
            Ok(mesh) => mesh,
            Err(TryRecvError::Empty) => return Ok(None),
            Err(TryRecvError::Closed) => {
                wall.pending = None;
                return Err(RegenerationError::Cancelled.into());
            }
        };
        wall.pending = None;
        self.apply_mesh(id, &mesh).map(Some)
    }

    fn apply_mesh(&mut self, id: WallId, mesh: &StreamedMesh) -> Result<ExpressId> {
        let wall = self
            .walls
            .get_mut(id)
            .ok_or(ElementError::NotFound("wall"))?;
        let ty = self
            .types
            .get_mut(wall.wall_type())
            .ok_or(ElementError::NotFound("wall type"))?;
        let entity = wall.entity();
        reconcile(id, entity, &mut wall.geometries, ty, mesh)
    }

    pub(crate) fn parts(&mut self) -> (&mut SlotMap<WallId, SimpleWall>, Scene<'_>) {
        (
            &mut self.walls,
            Scene {
                model: self.id,
                store: &mut self.store,
                types: &self.types,
                openings: &mut self.openings,
                mesh: &mut self.mesh,
            },
        )
    }
}
