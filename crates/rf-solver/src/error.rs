//! Error types for numeric assembly, reduction, and matrix conversion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("matrix is singular")]
    SingularMatrix,

    #[error("numeric error: {0}")]
    Numeric(String),

    /// An external port's net did not survive ground elimination (absent,
    /// or coincides with the ground net itself). Fatal to the sample, not
    /// the whole sweep — the port may be reachable at a different parameter
    /// point if the netlist is parametric, though in practice this almost
    /// always indicates a fixed topology mistake.
    #[error("external port '{port}' net is unresolved after ground elimination")]
    ExternalPortUnresolved { port: String },

    #[error(transparent)]
    Topology(#[from] rf_core::Error),

    #[error(transparent)]
    Parameter(#[from] rf_resolver::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
