mod binder;
mod corner;
mod model;
mod opening;
mod wall;
mod wall_type;

pub use binder::{OpeningBinder, OpeningBinding};
pub use corner::{AddCorner, Corner, ExtendWall, WallEnd};
pub use model::{Model, ModelConfig, ModelId};
pub use opening::{Opening, OpeningParams};
pub use wall::{SimpleWall, WallAxis};
pub use wall_type::{DrawBatch, WallType};

pub(crate) use wall::Scene;

slotmap::new_key_type! {
    /// Unique identifier for a wall in a [`Model`].
    pub struct WallId;

    /// Unique identifier for a wall type in a [`Model`].
    pub struct WallTypeId;

    /// Unique identifier for an opening in a [`Model`].
    pub struct OpeningId;
}
