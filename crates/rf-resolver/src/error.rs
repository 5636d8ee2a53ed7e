//! Errors raised while resolving a bag of parameter expressions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not parse expression '{expr}': {message}")]
    ParseFailure { expr: String, message: String },

    #[error("'{name}' is not defined")]
    UndefinedIdentifier { name: String },

    #[error("evaluating '{name}' produced a non-finite value")]
    NonFinite { name: String },

    #[error("circular dependency among: {}", names.join(", "))]
    Cycle { names: Vec<String> },
}

pub type Result<T> = std::result::Result<T, Error>;
