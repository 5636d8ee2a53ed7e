//! Dependency-ordering for a bag of parameter expressions via Kahn's
//! algorithm, mirroring the original's `symbolic/dependency_resolver.py`.

use crate::error::{Error, Result};
use crate::expr::{self, Expr};
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

/// Builds a dependents-of edge list restricted to identifiers that are
/// themselves keys of `parsed` (identifiers outside the bag, like `freq`,
/// are resolved at evaluation time against the caller's environment instead).
fn dependencies_of(expr: &Expr, known: &IndexSet<String>) -> IndexSet<String> {
    let mut ids = std::collections::HashSet::new();
    expr::free_identifiers(expr, &mut ids);
    ids.into_iter().filter(|id| known.contains(id)).collect()
}

/// Returns parameter names in an order such that every parameter appears
/// after all of the other bag members its expression depends on.
///
/// `parsed` maps each parameter name to its already-parsed expression (unit
/// literals carry no dependencies and are simply not present here).
pub fn topological_order(parsed: &IndexMap<String, Expr>) -> Result<Vec<String>> {
    let known: IndexSet<String> = parsed.keys().cloned().collect();

    let mut deps: IndexMap<String, IndexSet<String>> = IndexMap::new();
    let mut dependents: IndexMap<String, Vec<String>> = IndexMap::new();
    for name in &known {
        dependents.insert(name.clone(), Vec::new());
    }
    for (name, expr) in parsed {
        let d = dependencies_of(expr, &known);
        for dep in &d {
            dependents.entry(dep.clone()).or_default().push(name.clone());
        }
        deps.insert(name.clone(), d);
    }

    let mut indegree: IndexMap<String, usize> = deps
        .iter()
        .map(|(name, d)| (name.clone(), d.len()))
        .collect();

    let mut queue: VecDeque<String> = indegree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(name, _)| name.clone())
        .collect();

    let mut order = Vec::with_capacity(known.len());
    while let Some(name) = queue.pop_front() {
        order.push(name.clone());
        if let Some(children) = dependents.get(&name) {
            for child in children {
                let deg = indegree.get_mut(child).unwrap();
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(child.clone());
                }
            }
        }
    }

    if order.len() != known.len() {
        let remaining: Vec<String> = known.into_iter().filter(|n| !order.contains(n)).collect();
        return Err(Error::Cycle { names: remaining });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(pairs: &[(&str, &str)]) -> IndexMap<String, Expr> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), expr::parse(v).unwrap()))
            .collect()
    }

    #[test]
    fn orders_by_dependency() {
        let p = parsed(&[("b", "a * 2"), ("a", "1 + 1"), ("c", "b + a")]);
        let order = topological_order(&p).unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("b") < pos("c"));
    }

    #[test]
    fn detects_cycle() {
        let p = parsed(&[("a", "b + 1"), ("b", "a + 1")]);
        let err = topological_order(&p).unwrap_err();
        match err {
            Error::Cycle { names } => {
                assert_eq!(names.len(), 2);
            }
            _ => panic!("expected Cycle error"),
        }
    }

    #[test]
    fn identifiers_outside_the_bag_do_not_create_edges() {
        let p = parsed(&[("a", "freq * 2")]);
        let order = topological_order(&p).unwrap();
        assert_eq!(order, vec!["a".to_string()]);
    }
}
