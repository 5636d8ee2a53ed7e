//! Built-in RF component library: the concrete `Component` implementations
//! that `rf-core` ties together into a circuit and `rf-solver` assembles.
//!
//! - Passive elements: `Resistor`, `Capacitor`, `Inductor`
//! - Distributed elements: `TransmissionLine`, `DirectionalCoupler`
//! - Measured/black-box elements: `TouchstoneBlackBox` over a tabulated
//!   `TouchstoneOneShot`
//! - `Subcircuit`: a circuit-as-component wrapper for hierarchical netlists

pub mod capacitor;
pub mod directional_coupler;
pub mod error;
pub mod impedance;
pub mod inductor;
pub mod resistor;
pub mod subcircuit;
pub mod touchstone;
pub mod transmission_line;

pub use capacitor::Capacitor;
pub use directional_coupler::DirectionalCoupler;
pub use error::{Error, Result};
pub use impedance::{ExpressionImpedance, TouchstoneImpedance};
pub use inductor::Inductor;
pub use resistor::Resistor;
pub use subcircuit::Subcircuit;
pub use touchstone::{TabulatedOneShot, TouchstoneBlackBox, TouchstoneOneShot};
pub use transmission_line::TransmissionLine;
