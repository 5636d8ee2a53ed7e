//! Error types for circuit topology, component evaluation, and subcircuit mapping.

use thiserror::Error;

/// Errors raised while validating or evaluating a circuit.
#[derive(Debug, Error)]
pub enum Error {
    /// Duplicate component IDs, undeclared external-port net, floating port,
    /// or a disconnected graph. Fatal to the whole build; raised before any
    /// sweep point is evaluated.
    #[error("topology error: {0}")]
    Topology(String),

    /// A component's `ymatrix` raised or returned a non-finite entry.
    /// Fatal to the sample that triggered it, not to the whole sweep.
    #[error("component '{id}' failed to evaluate: {message}")]
    ComponentEvaluation { id: String, message: String },

    /// A subcircuit's interface mapping names an internal net that does not
    /// exist in its inner topology.
    #[error("subcircuit '{component}' interface net '{net}' does not exist")]
    Mapping { component: String, net: String },

    /// A linear-algebra step (matrix conversion, factorization) failed even
    /// after adaptive regularization.
    #[error("numeric error: {0}")]
    Numeric(String),
}

pub type Result<T> = std::result::Result<T, Error>;
