//! Resolves a bag of raw parameter expressions (unit literals or symbolic
//! expressions referencing other parameters and an external environment such
//! as frequency) into a flat map of `f64` values.
//!
//! Mirrors the original's `core/parameters/resolver.py`: try the unit-literal
//! shape first, fall through to symbolic parsing, order by dependency, then
//! evaluate.

use crate::dependency::topological_order;
use crate::error::{Error, Result};
use crate::expr::{self, Expr};
use crate::units::parse_unit_literal;
use indexmap::IndexMap;

enum Raw {
    Literal(f64),
    Symbolic(Expr),
}

/// Resolves `raw` (parameter name -> expression text) into concrete values.
/// `environment` supplies identifiers that are not themselves parameter
/// names in `raw` — typically just `freq`.
pub fn resolve_parameters(
    raw: &IndexMap<String, String>,
    environment: &dyn Fn(&str) -> Option<f64>,
) -> Result<IndexMap<String, f64>> {
    let mut parsed: IndexMap<String, Raw> = IndexMap::new();
    for (name, text) in raw {
        if let Some(value) = parse_unit_literal(text) {
            parsed.insert(name.clone(), Raw::Literal(value));
            continue;
        }
        let expr = expr::parse(text)?;
        parsed.insert(name.clone(), Raw::Symbolic(expr));
    }

    let symbolic_only: IndexMap<String, Expr> = parsed
        .iter()
        .filter_map(|(name, r)| match r {
            Raw::Symbolic(e) => Some((name.clone(), e.clone())),
            Raw::Literal(_) => None,
        })
        .collect();
    let order = topological_order(&symbolic_only)?;

    let mut resolved: IndexMap<String, f64> = IndexMap::new();
    for (name, raw_entry) in &parsed {
        if let Raw::Literal(value) = raw_entry {
            check_finite(name, *value)?;
            resolved.insert(name.clone(), *value);
        }
    }
    for name in order {
        let Raw::Symbolic(expr) = &parsed[&name] else {
            unreachable!("order only contains symbolic entries");
        };
        let lookup = |id: &str| resolved.get(id).copied().or_else(|| environment(id));
        let value = expr::eval(expr, &lookup)?;
        check_finite(&name, value)?;
        resolved.insert(name, value);
    }

    Ok(resolved)
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFinite { name: name.to_string() })
    }
}
