//! Sweep-level error types: fatal (aborts the whole sweep before any point
//! runs) and per-point (recorded as a string against the offending sample).

use thiserror::Error;

/// Fatal to the whole sweep; raised before any evaluation point runs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid sweep specification: {0}")]
    InvalidSpec(String),

    #[error(transparent)]
    Topology(#[from] rf_core::Error),

    /// Global parameters fail to resolve structurally (parse failure, cycle,
    /// undefined identifier) independent of which frequency the sweep visits
    /// first. Every point would fail identically, so this is raised once,
    /// before any point is dispatched, rather than once per point.
    #[error(transparent)]
    GlobalParameter(#[from] rf_resolver::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal to one evaluation point; never propagated out of `run_sweep` — the
/// driver converts this to a string and attaches it to the point's record.
#[derive(Debug, Error)]
pub enum PointError {
    #[error(transparent)]
    Assembly(#[from] rf_solver::Error),

    #[error(transparent)]
    Parameter(#[from] rf_resolver::Error),

    #[error(transparent)]
    Conversion(#[from] rf_core::Error),
}

pub type PointResult<T> = std::result::Result<T, PointError>;
