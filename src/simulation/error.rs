//! Error types for the runner simulation.
//!
//! Only construction and I/O can fail. Degenerate geometry and missing
//! masks or tiles are not errors; those queries simply report no hit.

use thiserror::Error;

use super::entity::EntityId;

/// Main error type for simulation operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A network needs at least an input and an output layer.
    #[error("network topology needs at least two layers, got {0}")]
    EmptyTopology(usize),

    /// A layer with no neurons.
    #[error("layer {0} has zero width")]
    ZeroWidthLayer(usize),

    /// A weight matrix does not connect the layers it sits between.
    #[error("weight matrix {layer} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        /// Index of the offending matrix.
        layer: usize,
        /// Shape implied by the layer sizes.
        expected: (usize, usize),
        /// Shape actually supplied.
        found: (usize, usize),
    },

    /// Input vector length differs from the first layer size.
    #[error("expected {expected} inputs, got {found}")]
    InputLength {
        /// First layer size.
        expected: usize,
        /// Supplied input length.
        found: usize,
    },

    /// Configuration values that cannot produce a runnable simulation.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The handle does not name a live entity.
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// File system errors
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new invalid-parameters error.
    #[must_use]
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParams(msg.into())
    }
}
