//! Numeric assembly, Schur-complement reduction, and factorization caching
//! for the RF network simulator.
//!
//! `rf-core` defines the topology-only `StaticPackage`; this crate turns it,
//! plus a resolved set of parameters at a given frequency, into the reduced
//! admittance matrix seen at a circuit's external ports.

pub mod assembler;
pub mod cache;
pub mod error;

pub use assembler::{assemble_and_reduce, resolve_component_context};
pub use error::{Error, Result};
