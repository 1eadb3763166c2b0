//! Error types for qjulia.

use thiserror::Error;

/// The main error type for qjulia operations.
#[derive(Error, Debug)]
pub enum QjuliaError {
    /// The iterative equation could not be parsed.
    #[error("Error parsing formula -- {0}")]
    Formula(String),

    /// A configuration value is missing, malformed, or out of contract.
    #[error("configuration error: {0}")]
    Config(String),

    /// A triangle was inserted while the mesh was not open for insertion.
    #[error("mesh is not open for triangle insertion")]
    MeshNotOpen,

    /// A finalised mesh was required but the mesh is still open or empty.
    #[error("mesh has not been finalised")]
    MeshNotFinalized,

    /// The mesh contains no triangles, so there is nothing to write.
    #[error("mesh contains no triangles")]
    EmptyMesh,

    /// An allocation for one of the pipeline's large buffers failed.
    #[error("not enough memory")]
    OutOfMemory,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized Result type for qjulia operations.
pub type Result<T> = std::result::Result<T, QjuliaError>;
