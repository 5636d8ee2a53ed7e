//! The immutable, worker-shippable bundle derived once per netlist (§3
//! "StaticPackage"). Everything here is a pure function of topology.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::component::CircuitModel;
use crate::netlist::NetlistGraph;
use crate::pattern::{compile_pattern, StampPattern};

/// `{rows, cols, component_slices, dim, external_idx, internal_idx,
/// net_to_index, chosen_ground_net_or_none, graph}`. All worker-shippable:
/// no component trait objects, no numeric data, just plain topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPackage {
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
    pub component_slices: Vec<std::ops::Range<usize>>,
    /// Full matrix dimension, including the ground net's row/col if one was
    /// chosen (the pattern is built before ground elimination).
    pub dim: usize,
    /// Indices into the *ground-eliminated* matrix that correspond to
    /// external ports, in external-port declaration order. `None` when an
    /// external port's net does not survive ground elimination (e.g. it *is*
    /// the ground net, or was never a net at all) — reported as a per-point
    /// error by the assembler (§4.6/§7) rather than silently dropped, since
    /// the set of external ports must stay aligned with the declared order.
    pub external_idx: Vec<Option<usize>>,
    /// The remaining (internal) indices of the ground-eliminated matrix, in
    /// ascending order.
    pub internal_idx: Vec<usize>,
    /// net name -> index in the ground-eliminated matrix.
    pub net_to_index: HashMap<String, usize>,
    pub ground_net: Option<String>,
    pub graph: NetlistGraph,
}

impl StaticPackage {
    pub fn pattern(&self) -> StampPattern {
        StampPattern {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            component_slices: self.component_slices.clone(),
        }
    }
}

/// Drops the ground net's entry from `full_index` (if present) and
/// renumbers the remaining entries to pack the range back to `[0, N-1)`.
fn eliminate_reference(
    full_index: &HashMap<String, usize>,
    ground_net: Option<&str>,
) -> HashMap<String, usize> {
    let Some(g) = ground_net else {
        return full_index.clone();
    };
    let Some(&gidx) = full_index.get(g) else {
        return full_index.clone();
    };
    full_index
        .iter()
        .filter(|(name, _)| name.as_str() != g)
        .map(|(name, &idx)| (name.clone(), if idx > gidx { idx - 1 } else { idx }))
        .collect()
}

/// Builds the `StaticPackage` for a validated `CircuitModel`. Callers must
/// run `CircuitModel::validate_topology` first; this function does not
/// re-validate.
pub fn build_static_package(model: &CircuitModel) -> StaticPackage {
    let graph = model.build_graph();
    let ground_net = graph.ground_net();
    let full_index = graph.node_index(ground_net.as_deref());
    let dim = full_index.len();

    let pattern = compile_pattern(model, &graph, &full_index);
    let reduced_index = eliminate_reference(&full_index, ground_net.as_deref());

    let external_idx: Vec<Option<usize>> = model
        .external_ports
        .values()
        .map(|spec| reduced_index.get(&spec.net_name).copied())
        .collect();

    let ext_set: std::collections::HashSet<usize> = external_idx.iter().filter_map(|x| *x).collect();
    let mut internal_idx: Vec<usize> = (0..reduced_index.len())
        .filter(|i| !ext_set.contains(i))
        .collect();
    internal_idx.sort_unstable();

    StaticPackage {
        rows: pattern.rows,
        cols: pattern.cols,
        component_slices: pattern.component_slices,
        dim,
        external_idx,
        internal_idx,
        net_to_index: reduced_index,
        ground_net,
        graph,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ExternalPortSpec, FixedImpedance, Result};
    use crate::context::NumericContext;
    use crate::netlist::PortConnection;
    use indexmap::IndexMap;
    use nalgebra::DMatrix;
    use num_complex::Complex64;
    use std::sync::Arc;

    struct TwoPort {
        id: String,
        ports: Vec<String>,
        local: IndexMap<String, String>,
    }
    impl Component for TwoPort {
        fn id(&self) -> &str {
            &self.id
        }
        fn ports(&self) -> &[String] {
            &self.ports
        }
        fn local_params(&self) -> &IndexMap<String, String> {
            &self.local
        }
        fn ymatrix(&self, _ctx: &NumericContext) -> Result<DMatrix<Complex64>> {
            Ok(DMatrix::zeros(2, 2))
        }
    }

    fn series_resistor_model() -> CircuitModel {
        let mut model = CircuitModel::new();
        model.components.push(Arc::new(TwoPort {
            id: "R1".into(),
            ports: vec!["1".into(), "2".into()],
            local: IndexMap::new(),
        }));
        model.connections.push(PortConnection {
            component_id: "R1".into(),
            port_name: "1".into(),
            net_name: "p1".into(),
        });
        model.connections.push(PortConnection {
            component_id: "R1".into(),
            port_name: "2".into(),
            net_name: "p2".into(),
        });
        model.external_ports.insert(
            "p1".into(),
            ExternalPortSpec {
                name: "p1".into(),
                net_name: "p1".into(),
                impedance: Arc::new(FixedImpedance(Complex64::new(50.0, 0.0))),
            },
        );
        model.external_ports.insert(
            "p2".into(),
            ExternalPortSpec {
                name: "p2".into(),
                net_name: "p2".into(),
                impedance: Arc::new(FixedImpedance(Complex64::new(50.0, 0.0))),
            },
        );
        model
    }

    #[test]
    fn no_ground_net_means_no_internal_nodes() {
        let model = series_resistor_model();
        let pkg = build_static_package(&model);
        assert_eq!(pkg.ground_net, None);
        assert_eq!(pkg.dim, 2);
        assert!(pkg.internal_idx.is_empty());
        assert_eq!(pkg.external_idx.len(), 2);
    }

    #[test]
    fn ground_net_is_dropped_from_reduced_index() {
        let mut model = series_resistor_model();
        model.components.push(Arc::new(TwoPort {
            id: "R2".into(),
            ports: vec!["1".into(), "2".into()],
            local: IndexMap::new(),
        }));
        model.connections.push(PortConnection {
            component_id: "R2".into(),
            port_name: "1".into(),
            net_name: "p1".into(),
        });
        model.connections.push(PortConnection {
            component_id: "R2".into(),
            port_name: "2".into(),
            net_name: "gnd".into(),
        });

        let pkg = build_static_package(&model);
        assert_eq!(pkg.ground_net.as_deref(), Some("gnd"));
        assert!(!pkg.net_to_index.contains_key("gnd"));
        assert_eq!(pkg.dim, 3); // p1, p2, gnd before elimination
    }
}
