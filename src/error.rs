use thiserror::Error;

/// Custom error type for the minigrad engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum MinigradError {
    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Incompatible shapes for operation '{operation}': {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
        operation: String,
    },

    #[error("Unsupported rank {rank} for operation '{operation}': expected a 1-D or 2-D operand")]
    UnsupportedRank { rank: usize, operation: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}
