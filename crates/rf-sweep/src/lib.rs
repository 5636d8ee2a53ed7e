//! Parallel frequency/parameter sweep driver for the RF network simulator.
//!
//! Expands a [`SweepSpec`] into the Cartesian product of its frequency and
//! parameter entries, dispatches each point across `rayon`'s global thread
//! pool, and collects `{freq, parameters, s_matrix-or-error}` records. See
//! `error` for the fatal-vs-per-point error split.

pub mod error;
pub mod sweep;

pub use error::{Error, PointError, Result};
pub use sweep::{
    FrequencySweep, ParameterSweep, PointOutcome, PointRecord, Scale, SweepEntry, SweepPoint, SweepResult,
    SweepSpec, run_sweep,
};
