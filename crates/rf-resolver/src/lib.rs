//! Symbolic parameter resolver: turns a bag of `{name: expression text}`
//! into concrete `f64` values, honoring unit-literal shortcuts, a small
//! whitelisted expression grammar, and cross-parameter dependencies.
//!
//! This crate knows nothing about circuits, nets, or components — it only
//! resolves named scalars. `rf-core`/`rf-solver` build a `NumericContext`
//! from its output plus the sweep frequency.

pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod units;

pub use error::{Error, Result};
pub use evaluator::resolve_parameters;
pub use expr::{eval, free_identifiers, parse, Expr};
pub use units::parse_unit_literal;
