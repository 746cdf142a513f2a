use thiserror::Error;

/// Failures raised by clipping and triangulation on degenerate input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("non-finite coordinate in clipping input")]
    NonFinite,

    #[error("clipping left an open contour at ({x}, {y})")]
    OpenContour { x: f64, y: f64 },

    #[error("triangulation rejected vertex ({x}, {y}): {reason}")]
    VertexRejected { x: f64, y: f64, reason: String },

    #[error("triangulation rejected constraint edge ({ax}, {ay}) -> ({bx}, {by})")]
    ConstraintRejected { ax: f64, ay: f64, bx: f64, by: f64 },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
