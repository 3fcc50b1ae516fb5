pub mod extrusion;
pub mod half_space;
pub mod placement;
pub mod plane;

pub use extrusion::{Extrusion, RectangleProfile};
pub use half_space::HalfSpace;
pub use placement::Placement;
pub use plane::Plane;
