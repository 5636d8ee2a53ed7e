//! Errors specific to the built-in component library, convertible into
//! `rf_core::Error` at the call site (every `Component::ymatrix` returns
//! `rf_core::Result`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required parameter '{name}' for component '{component}'")]
    MissingParameter { component: String, name: String },

    #[error("component '{component}': {message}")]
    Invalid { component: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for rf_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::MissingParameter { component, name } => rf_core::Error::ComponentEvaluation {
                id: component,
                message: format!("missing required parameter '{name}'"),
            },
            Error::Invalid { component, message } => {
                rf_core::Error::ComponentEvaluation { id: component, message }
            }
        }
    }
}

/// Fetches a required numeric parameter from the context, translating a
/// miss into a component-scoped error.
pub fn require(ctx: &rf_core::NumericContext, component: &str, name: &str) -> Result<f64> {
    ctx.get(name).ok_or_else(|| Error::MissingParameter {
        component: component.to_string(),
        name: name.to_string(),
    })
}
