//! The `Component` contract (§4.5) and the circuit-level types that own them.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use std::sync::Arc;

use crate::context::NumericContext;
use crate::error::{Error, Result};
use crate::netlist::{NetlistGraph, PortConnection};

/// Per-component Y-matrix callback. Implementations must be idempotent:
/// calling `ymatrix` twice with an equal `NumericContext` must return
/// numerically identical results.
///
/// `ctx` already carries the fully merged and resolved parameter set
/// (globals ⊕ component locals ⊕ sweep overrides) — components never see
/// unresolved expressions.
pub trait Component: Send + Sync {
    /// Identifier, unique within the circuit.
    fn id(&self) -> &str;

    /// Ordered port names; length equals the dimension of the returned
    /// Y-matrix and the order in which `ymatrix`'s rows/cols are read.
    fn ports(&self) -> &[String];

    fn n_ports(&self) -> usize {
        self.ports().len()
    }

    /// Unresolved local parameter expressions, merged with globals before
    /// resolution. Purely descriptive; the resolved values arrive via `ctx`.
    fn local_params(&self) -> &IndexMap<String, String>;

    /// Computes the `n x n` admittance submatrix at `ctx`. `n == n_ports()`.
    fn ymatrix(&self, ctx: &NumericContext) -> Result<DMatrix<Complex64>>;
}

/// Enumerates the `n^2` stamping triplets for a component in row-major order
/// of its Y-matrix. This is the reference ordering the `StampPattern` must
/// match (§4.3/§4.5): rows/cols are the component's port-to-net indices.
pub fn y_stamp(
    component: &dyn Component,
    net_indices: &[usize],
    ctx: &NumericContext,
) -> Result<(Vec<usize>, Vec<usize>, Vec<Complex64>)> {
    let y = component.ymatrix(ctx)?;
    let n = component.n_ports();
    if y.nrows() != n || y.ncols() != n {
        return Err(Error::ComponentEvaluation {
            id: component.id().to_string(),
            message: format!(
                "ymatrix returned {}x{}, expected {}x{}",
                y.nrows(),
                y.ncols(),
                n,
                n
            ),
        });
    }
    if net_indices.len() != n {
        return Err(Error::ComponentEvaluation {
            id: component.id().to_string(),
            message: format!(
                "{} net indices supplied for a {}-port component",
                net_indices.len(),
                n
            ),
        });
    }

    let mut rows = Vec::with_capacity(n * n);
    let mut cols = Vec::with_capacity(n * n);
    let mut data = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let v = y[(i, j)];
            if !v.re.is_finite() || !v.im.is_finite() {
                return Err(Error::ComponentEvaluation {
                    id: component.id().to_string(),
                    message: format!("non-finite Y[{i},{j}] = {v}"),
                });
            }
            rows.push(net_indices[i]);
            cols.push(net_indices[j]);
            data.push(v);
        }
    }
    Ok((rows, cols, data))
}

/// A reference-impedance model: returns a complex Z0 given the fully
/// resolved `(freq, params)` context. Fallible because two of the four
/// concrete variants named in the data model (an expression evaluated per
/// point, a Touchstone-file interpolation) can fail at a given point for the
/// same reasons a component's `ymatrix` can — an undefined parameter, a
/// non-finite result — and that failure must surface as a per-point error
/// rather than a panic.
pub trait ReferenceImpedance: Send + Sync {
    fn get_impedance(&self, ctx: &NumericContext) -> Result<Complex64>;
}

/// A constant, frequency- and parameter-independent reference impedance —
/// the "constant scalar" variant of §3's External Port Spec.
#[derive(Debug, Clone, Copy)]
pub struct FixedImpedance(pub Complex64);

impl ReferenceImpedance for FixedImpedance {
    fn get_impedance(&self, _ctx: &NumericContext) -> Result<Complex64> {
        Ok(self.0)
    }
}

/// An external port: a name, the net it attaches to, and its reference
/// impedance model.
pub struct ExternalPortSpec {
    pub name: String,
    pub net_name: String,
    pub impedance: Arc<dyn ReferenceImpedance>,
}

/// Owns the set of components, external-port specs, connections, and global
/// parameter bindings. Built once by the (out-of-scope) netlist parser and
/// never mutated by the core thereafter.
pub struct CircuitModel {
    pub global_parameters: IndexMap<String, String>,
    pub components: Vec<Arc<dyn Component>>,
    pub external_ports: IndexMap<String, ExternalPortSpec>,
    pub connections: Vec<PortConnection>,
}

impl CircuitModel {
    pub fn new() -> Self {
        Self {
            global_parameters: IndexMap::new(),
            components: Vec::new(),
            external_ports: IndexMap::new(),
            connections: Vec::new(),
        }
    }

    /// Builds the derived `NetlistGraph` view from `connections`.
    pub fn build_graph(&self) -> NetlistGraph {
        let mut graph = NetlistGraph::new();
        for c in &self.connections {
            graph.add_connection(&c.component_id, &c.port_name, &c.net_name);
        }
        graph
    }

    /// Validates topology invariants up front: duplicate component IDs,
    /// floating or conflicting ports, undeclared external-port nets, and
    /// graph connectivity. Fatal to the whole build; no sweep point is ever
    /// evaluated if this fails.
    pub fn validate_topology(&self) -> Result<()> {
        self.check_duplicate_ids()?;
        let graph = self.build_graph();
        self.check_ports_bound(&graph)?;
        self.check_external_ports(&graph)?;
        self.check_connected(&graph)?;
        Ok(())
    }

    fn check_duplicate_ids(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for c in &self.components {
            if !seen.insert(c.id()) {
                return Err(Error::Topology(format!(
                    "duplicate component id '{}'",
                    c.id()
                )));
            }
        }
        Ok(())
    }

    fn check_ports_bound(&self, graph: &NetlistGraph) -> Result<()> {
        for c in &self.components {
            for port in c.ports() {
                let nets: Vec<&str> = graph
                    .connections()
                    .iter()
                    .filter(|conn| conn.component_id == c.id() && conn.port_name == *port)
                    .map(|conn| conn.net_name.as_str())
                    .collect();
                match nets.len() {
                    0 => {
                        return Err(Error::Topology(format!(
                            "floating port: component '{}' port '{}' is unconnected",
                            c.id(),
                            port
                        )));
                    }
                    _ => {
                        let distinct: std::collections::HashSet<&str> =
                            nets.into_iter().collect();
                        if distinct.len() > 1 {
                            return Err(Error::Topology(format!(
                                "component '{}' port '{}' is bound to conflicting nets: {:?}",
                                c.id(),
                                port,
                                distinct
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_external_ports(&self, graph: &NetlistGraph) -> Result<()> {
        let nodes: std::collections::HashSet<String> = graph.nodes().into_iter().collect();
        for (name, spec) in &self.external_ports {
            if !nodes.contains(&spec.net_name) {
                return Err(Error::Topology(format!(
                    "external port '{name}' references undeclared net '{}'",
                    spec.net_name
                )));
            }
        }
        Ok(())
    }

    /// Union-find connectivity check: every net reachable from every other
    /// net through a shared component is required (matches the original
    /// implementation's `networkx`-based connectivity validation).
    fn check_connected(&self, graph: &NetlistGraph) -> Result<()> {
        let nodes = graph.nodes();
        if nodes.len() <= 1 {
            return Ok(());
        }
        let index: std::collections::HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut parent: Vec<usize> = (0..nodes.len()).collect();
        fn find(parent: &mut [usize], x: usize) -> usize {
            if parent[x] != x {
                parent[x] = find(parent, parent[x]);
            }
            parent[x]
        }
        fn union(parent: &mut [usize], a: usize, b: usize) {
            let ra = find(parent, a);
            let rb = find(parent, b);
            if ra != rb {
                parent[ra] = rb;
            }
        }

        for c in &self.components {
            let mut comp_nets: Vec<usize> = Vec::new();
            for port in c.ports() {
                if let Some(conn) = graph
                    .connections()
                    .iter()
                    .find(|conn| conn.component_id == c.id() && conn.port_name == *port)
                {
                    comp_nets.push(index[conn.net_name.as_str()]);
                }
            }
            for w in comp_nets.windows(2) {
                union(&mut parent, w[0], w[1]);
            }
        }

        let root0 = find(&mut parent, 0);
        if (1..nodes.len()).any(|i| find(&mut parent, i) != root0) {
            return Err(Error::Topology(
                "circuit graph is not fully connected".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CircuitModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        id: String,
        ports: Vec<String>,
        local: IndexMap<String, String>,
    }
    impl Component for Stub {
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
            Ok(DMatrix::from_element(2, 2, Complex64::new(1.0, 0.0)))
        }
    }

    fn stub(id: &str) -> Arc<dyn Component> {
        Arc::new(Stub {
            id: id.to_string(),
            ports: vec!["1".to_string(), "2".to_string()],
            local: IndexMap::new(),
        })
    }

    #[test]
    fn floating_port_is_topology_error() {
        let mut model = CircuitModel::new();
        model.components.push(stub("R1"));
        model.connections.push(PortConnection {
            component_id: "R1".into(),
            port_name: "1".into(),
            net_name: "a".into(),
        });
        // port "2" never connected
        let err = model.validate_topology().unwrap_err();
        assert!(matches!(err, Error::Topology(_)));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut model = CircuitModel::new();
        model.components.push(stub("R1"));
        model.components.push(stub("R1"));
        let err = model.validate_topology().unwrap_err();
        assert!(matches!(err, Error::Topology(_)));
    }

    #[test]
    fn fully_connected_two_port_passes() {
        let mut model = CircuitModel::new();
        model.components.push(stub("R1"));
        model.connections.push(PortConnection {
            component_id: "R1".into(),
            port_name: "1".into(),
            net_name: "a".into(),
        });
        model.connections.push(PortConnection {
            component_id: "R1".into(),
            port_name: "2".into(),
            net_name: "b".into(),
        });
        model.validate_topology().unwrap();
    }
}
