use thiserror::Error;

/// Top-level error type for the wall modeling core.
#[derive(Debug, Error)]
pub enum WallcraftError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Element(#[from] ElementError),

    #[error(transparent)]
    Corner(#[from] CornerError),

    #[error(transparent)]
    Regeneration(#[from] RegenerationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to elements and the records they own.
#[derive(Debug, Error)]
pub enum ElementError {
    #[error("entity not found: {0}")]
    NotFound(&'static str),

    #[error("wall start and end points coincide")]
    ZeroLengthWall,

    #[error("a wall cannot be joined with itself")]
    SameWall,
}

/// Errors raised while resolving a corner between two walls.
///
/// Every variant is returned before either wall is touched.
#[derive(Debug, Error)]
pub enum CornerError {
    #[error("wall axes are parallel and never meet")]
    ParallelAxes,

    #[error("corner angle {angle} rad is too close to 0 or pi to miter")]
    DegenerateAngle { angle: f64 },

    #[error("moving the endpoint to the corner would collapse the wall")]
    CollapsedWall,

    #[error("the corner lies beyond the opposite endpoint and would reverse the wall")]
    ReversedWall,
}

/// Errors related to asynchronous mesh regeneration.
#[derive(Debug, Error)]
pub enum RegenerationError {
    #[error("no regeneration is pending for this wall")]
    NothingPending,

    #[error("mesh regeneration was dropped before completing")]
    Cancelled,

    #[error("regenerated mesh carries no geometry")]
    EmptyMesh,
}

/// Convenience type alias for results using [`WallcraftError`].
pub type Result<T> = std::result::Result<T, WallcraftError>;
