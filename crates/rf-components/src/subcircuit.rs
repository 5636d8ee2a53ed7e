//! Subcircuit black box (§4.5): a `Component` that wraps an inner
//! `CircuitModel` outright (no cyclic references — the inner circuit is
//! owned, not borrowed) and exposes a subset of its nets as ports.
//!
//! `ymatrix` builds the inner circuit's global Y at the caller's
//! `(freq, params)` via the same assemble-and-reduce algorithm the top-level
//! solver uses (§4.6), Schur-reducing every inner net that is *not* part of
//! the declared interface, then returns that reduced matrix directly — it is
//! already indexed in interface order because the inner `StaticPackage` was
//! built with the interface nets as its external set.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{build_static_package, CircuitModel, Component, ExternalPortSpec, FixedImpedance, NumericContext, Result, StaticPackage};
use std::sync::Arc;

/// Wraps an inner `CircuitModel` and exposes the nets named by `interface`
/// (outer port name -> inner net name) as an ordinary multi-port component.
pub struct Subcircuit {
    id: String,
    ports: Vec<String>,
    local: IndexMap<String, String>,
    inner_model: CircuitModel,
    inner_pkg: StaticPackage,
}

impl Subcircuit {
    /// Builds a subcircuit from an inner circuit and an outer-port -> inner
    /// -net interface mapping, in declared (interface) order. Any interface
    /// net that does not exist in the inner topology is a `MappingError`
    /// raised immediately, before any sweep point is evaluated — the
    /// interface is fixed topology, not parameter-dependent.
    ///
    /// Overwrites `inner_model.external_ports`: the inner package's external
    /// set is defined entirely by `interface`, since that's what must remain
    /// un-reduced for the outer assembler to read back out.
    pub fn new(
        id: impl Into<String>,
        interface: IndexMap<String, String>,
        mut inner_model: CircuitModel,
    ) -> Result<Self> {
        let id = id.into();
        let nodes = inner_model.build_graph().nodes();
        for net_name in interface.values() {
            if !nodes.contains(net_name) {
                return Err(rf_core::Error::Mapping {
                    component: id.clone(),
                    net: net_name.clone(),
                });
            }
        }

        inner_model.external_ports.clear();
        for (port_name, net_name) in &interface {
            inner_model.external_ports.insert(
                port_name.clone(),
                ExternalPortSpec {
                    name: port_name.clone(),
                    net_name: net_name.clone(),
                    // Unused: the inner assembly never converts to S, only
                    // Schur-reduces to the interface nets.
                    impedance: Arc::new(FixedImpedance(Complex64::new(50.0, 0.0))),
                },
            );
        }
        inner_model.validate_topology()?;

        let inner_pkg = build_static_package(&inner_model);
        let ports: Vec<String> = interface.keys().cloned().collect();

        Ok(Self {
            id,
            ports,
            local: IndexMap::new(),
            inner_model,
            inner_pkg,
        })
    }
}

impl Component for Subcircuit {
    fn id(&self) -> &str {
        &self.id
    }

    fn ports(&self) -> &[String] {
        &self.ports
    }

    fn local_params(&self) -> &IndexMap<String, String> {
        &self.local
    }

    fn ymatrix(&self, ctx: &NumericContext) -> Result<DMatrix<Complex64>> {
        let overrides: IndexMap<String, f64> = ctx.params().iter().cloned().collect();
        rf_solver::assemble_and_reduce(&self.inner_model, &self.inner_pkg, ctx.freq(), &overrides)
            .map_err(|e| rf_core::Error::ComponentEvaluation {
                id: self.id.clone(),
                message: e.to_string(),
            })
    }
}
