//! Core circuit representation for the RF network simulator: the
//! `Component` contract, the netlist connectivity graph, the topology-only
//! stamp pattern, and the immutable numeric context that flows through
//! evaluation and caching.
//!
//! This crate has no opinion on how Y-matrices are assembled into a global
//! system or reduced to external ports — that's `rf-solver`. It has no
//! opinion on how parameters are resolved — that's `rf-resolver`. It only
//! defines the shapes those crates operate on.

pub mod component;
pub mod context;
pub mod conversion;
pub mod error;
pub mod netlist;
pub mod pattern;
pub mod static_pkg;

pub use component::{CircuitModel, Component, ExternalPortSpec, FixedImpedance, ReferenceImpedance, y_stamp};
pub use context::NumericContext;
pub use conversion::{s_to_y, s_to_z, y_to_s, z_to_s};
pub use error::{Error, Result};
pub use netlist::{NetlistGraph, PortConnection};
pub use pattern::{compile_pattern, StampPattern};
pub use static_pkg::{build_static_package, StaticPackage};
