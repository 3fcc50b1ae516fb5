//! Parametric wall modeling core.
//!
//! Walls are derived from a small parameter set (axis endpoints, height and
//! the width of a shared [`WallType`](elements::WallType)). Editing a
//! parameter and calling [`Model::update_wall`](elements::Model::update_wall)
//! regenerates the wall's solid, keeps bound openings attached and requests
//! a new mesh. Corners between walls are closed with half-space
//! subtractions.

pub mod elements;
pub mod error;
pub mod geometry;
pub mod math;
pub mod mesh;
pub mod store;

#[cfg(test)]
mod test_support;

pub use elements::{AddCorner, ExtendWall, Model, WallEnd, WallId};
pub use error::{Result, WallcraftError};
