//! Numeric assembly and Schur-complement reduction (§4.6): stamps every
//! component's Y-matrix into the precompiled pattern, eliminates the ground
//! reference, and reduces internal nodes out via a linear solve — never an
//! explicit matrix inverse.

use std::collections::HashMap;

use faer::prelude::*;
use faer::sparse::{SparseColMat, Triplet};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{CircuitModel, Component, NumericContext, StaticPackage};

use crate::cache::solve_cached;
use crate::error::Result;

/// Merges `model.global_parameters` with `component.local_params()` (locals
/// win on name collision), resolves the combination against `freq`, then
/// applies `overrides` last — sweep overrides win over everything, per the
/// original worker's merge order. A collision between an override and a
/// component-local name is logged, not rejected.
pub fn resolve_component_context(
    model: &CircuitModel,
    component: &dyn Component,
    freq: f64,
    overrides: &IndexMap<String, f64>,
) -> Result<NumericContext> {
    let mut raw: IndexMap<String, String> = model.global_parameters.clone();
    for (name, expr) in component.local_params() {
        if overrides.contains_key(name) {
            log::warn!(
                "component '{}': sweep override for '{name}' shadows its local definition",
                component.id()
            );
        }
        raw.insert(name.clone(), expr.clone());
    }

    let env = move |id: &str| if id == "freq" { Some(freq) } else { None };
    let mut resolved = rf_resolver::resolve_parameters(&raw, &env)?;
    for (name, value) in overrides {
        resolved.insert(name.clone(), *value);
    }

    Ok(NumericContext::new(freq, resolved))
}

fn c64_from(z: Complex64) -> c64 {
    c64::new(z.re, z.im)
}

fn complex64_from(z: c64) -> Complex64 {
    Complex64::new(z.re, z.im)
}

fn dense_from_faer(m: &Mat<c64>) -> DMatrix<Complex64> {
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| complex64_from(m[(i, j)]))
}

fn faer_from_dense(m: &DMatrix<Complex64>) -> Mat<c64> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| c64_from(m[(i, j)]))
}

/// Stamps every component's Y-matrix into the pattern's flat data array, in
/// the same row-major-per-component order `StampPattern` was compiled with.
fn stamp_all(
    model: &CircuitModel,
    static_pkg: &StaticPackage,
    freq: f64,
    overrides: &IndexMap<String, f64>,
) -> Result<Vec<Complex64>> {
    let mut data = vec![Complex64::new(0.0, 0.0); static_pkg.rows.len()];
    for (component, slice) in model.components.iter().zip(static_pkg.component_slices.iter()) {
        let ctx = resolve_component_context(model, component.as_ref(), freq, overrides)?;
        let y = component.ymatrix(&ctx)?;
        let n = component.n_ports();
        for i in 0..n {
            for j in 0..n {
                data[slice.start + i * n + j] = y[(i, j)];
            }
        }
    }
    Ok(data)
}

/// Drops the ground net's row/col (always index 0 when present, per
/// `NetlistGraph::node_index`) from the full triplet set and renumbers the
/// rest down by one.
fn eliminate_ground(
    rows: &[u32],
    cols: &[u32],
    data: &[Complex64],
    has_ground: bool,
) -> Vec<(usize, usize, Complex64)> {
    rows.iter()
        .zip(cols.iter())
        .zip(data.iter())
        .filter_map(|((&r, &c), &v)| {
            if has_ground && (r == 0 || c == 0) {
                return None;
            }
            let r = if has_ground { r - 1 } else { r } as usize;
            let c = if has_ground { c - 1 } else { c } as usize;
            Some((r, c, v))
        })
        .collect()
}

/// Computes the `n_ext x n_ext` admittance matrix seen at the circuit's
/// external ports, at `freq` with the given sweep-point parameter
/// `overrides` (flat name -> value, applied after resolution).
pub fn assemble_and_reduce(
    model: &CircuitModel,
    static_pkg: &StaticPackage,
    freq: f64,
    overrides: &IndexMap<String, f64>,
) -> Result<DMatrix<Complex64>> {
    let n_ext = static_pkg.external_idx.len();
    for (port_name, idx) in model.external_ports.keys().zip(static_pkg.external_idx.iter()) {
        if idx.is_none() {
            return Err(crate::error::Error::ExternalPortUnresolved {
                port: port_name.clone(),
            });
        }
    }

    let data = stamp_all(model, static_pkg, freq, overrides)?;
    let has_ground = static_pkg.ground_net.is_some();
    let reduced = eliminate_ground(&static_pkg.rows, &static_pkg.cols, &data, has_ground);

    let n_int = static_pkg.internal_idx.len();

    // local position within the external/internal index groups
    let ext_pos: HashMap<usize, usize> = static_pkg
        .external_idx
        .iter()
        .enumerate()
        .map(|(k, idx)| (idx.expect("checked above"), k))
        .collect();
    let int_pos: HashMap<usize, usize> = static_pkg
        .internal_idx
        .iter()
        .enumerate()
        .map(|(k, &idx)| (idx, k))
        .collect();

    let mut y_ee = DMatrix::<Complex64>::zeros(n_ext, n_ext);
    let mut y_ei = DMatrix::<Complex64>::zeros(n_ext, n_int);
    let mut y_ie = DMatrix::<Complex64>::zeros(n_int, n_ext);
    let mut ii_triplets: Vec<Triplet<usize, usize, c64>> = Vec::new();

    for (r, c, v) in reduced {
        match (ext_pos.get(&r), ext_pos.get(&c), int_pos.get(&r), int_pos.get(&c)) {
            (Some(&er), Some(&ec), _, _) => y_ee[(er, ec)] += v,
            (Some(&er), _, _, Some(&ic)) => y_ei[(er, ic)] += v,
            (_, Some(&ec), Some(&ir), _) => y_ie[(ir, ec)] += v,
            (_, _, Some(&ir), Some(&ic)) => ii_triplets.push(Triplet::new(ir, ic, c64_from(v))),
            _ => {}
        }
    }

    if n_int == 0 {
        return Ok(y_ee);
    }

    let y_ii = SparseColMat::try_new_from_triplets(n_int, n_int, &ii_triplets)
        .map_err(|_| crate::error::Error::Numeric("failed to build internal sparsity".to_string()))?;
    let rhs = faer_from_dense(&y_ie);
    let x = solve_cached(&y_ii, &rhs)?;
    let x_dense = dense_from_faer(&x);

    Ok(y_ee - &y_ei * &x_dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::{build_static_package, ExternalPortSpec, FixedImpedance, PortConnection};
    use std::sync::Arc;

    struct TwoPortResistor {
        id: String,
        ports: Vec<String>,
        local: IndexMap<String, String>,
    }

    impl Component for TwoPortResistor {
        fn id(&self) -> &str {
            &self.id
        }
        fn ports(&self) -> &[String] {
            &self.ports
        }
        fn local_params(&self) -> &IndexMap<String, String> {
            &self.local
        }
        fn ymatrix(&self, ctx: &NumericContext) -> rf_core::Result<DMatrix<Complex64>> {
            let r = ctx.get("R").unwrap();
            let y = Complex64::new(1.0 / r, 0.0);
            Ok(DMatrix::from_row_slice(2, 2, &[y, -y, -y, y]))
        }
    }

    fn series_resistor_model(r: &str) -> CircuitModel {
        let mut model = CircuitModel::new();
        let mut local = IndexMap::new();
        local.insert("R".to_string(), r.to_string());
        model.components.push(Arc::new(TwoPortResistor {
            id: "R1".into(),
            ports: vec!["1".into(), "2".into()],
            local,
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
    fn series_resistor_has_no_internal_nodes() {
        let model = series_resistor_model("1000");
        let pkg = build_static_package(&model);
        let y = assemble_and_reduce(&model, &pkg, 1e9, &IndexMap::new()).unwrap();
        assert!((y[(0, 0)].re - 1e-3).abs() < 1e-12);
        assert!((y[(0, 1)].re + 1e-3).abs() < 1e-12);
    }

    #[test]
    fn two_series_resistors_through_internal_node_equal_one_combined() {
        let mut model = CircuitModel::new();
        let mut local1 = IndexMap::new();
        local1.insert("R".to_string(), "500".to_string());
        model.components.push(Arc::new(TwoPortResistor {
            id: "R1".into(),
            ports: vec!["1".into(), "2".into()],
            local: local1,
        }));
        model.connections.push(PortConnection {
            component_id: "R1".into(),
            port_name: "1".into(),
            net_name: "p1".into(),
        });
        model.connections.push(PortConnection {
            component_id: "R1".into(),
            port_name: "2".into(),
            net_name: "mid".into(),
        });

        let mut local2 = IndexMap::new();
        local2.insert("R".to_string(), "500".to_string());
        model.components.push(Arc::new(TwoPortResistor {
            id: "R2".into(),
            ports: vec!["1".into(), "2".into()],
            local: local2,
        }));
        model.connections.push(PortConnection {
            component_id: "R2".into(),
            port_name: "1".into(),
            net_name: "mid".into(),
        });
        model.connections.push(PortConnection {
            component_id: "R2".into(),
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

        let pkg = build_static_package(&model);
        let y = assemble_and_reduce(&model, &pkg, 1e9, &IndexMap::new()).unwrap();
        let single = series_resistor_model("1000");
        let single_pkg = build_static_package(&single);
        let y_single = assemble_and_reduce(&single, &single_pkg, 1e9, &IndexMap::new()).unwrap();

        for i in 0..2 {
            for j in 0..2 {
                assert!((y[(i, j)] - y_single[(i, j)]).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn sweep_override_wins_over_component_local() {
        let model = series_resistor_model("1000");
        let mut overrides = IndexMap::new();
        overrides.insert("R".to_string(), 2000.0);
        let pkg = build_static_package(&model);
        let y = assemble_and_reduce(&model, &pkg, 1e9, &overrides).unwrap();
        assert!((y[(0, 0)].re - 1.0 / 2000.0).abs() < 1e-12);
    }
}
