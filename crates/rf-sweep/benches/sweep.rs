//! Benchmarks for sweep expansion and parallel dispatch over a small circuit.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{
    build_static_package, CircuitModel, Component, ExternalPortSpec, FixedImpedance, NumericContext,
    PortConnection, Result as CoreResult,
};
use rf_sweep::{FrequencySweep, Scale, SweepEntry, SweepSpec, run_sweep};
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
    fn ymatrix(&self, ctx: &NumericContext) -> CoreResult<DMatrix<Complex64>> {
        let r = ctx.get("R").unwrap_or(1000.0);
        let y = Complex64::new(1.0 / r, 0.0);
        Ok(DMatrix::from_row_slice(2, 2, &[y, -y, -y, y]))
    }
}

fn series_resistor_model() -> CircuitModel {
    let mut model = CircuitModel::new();
    let mut local = IndexMap::new();
    local.insert("R".to_string(), "1000".to_string());
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

fn bench_run_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_sweep");
    let model = series_resistor_model();
    let pkg = build_static_package(&model);

    for points in [31, 101, 501] {
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |bencher, &points| {
            let spec = SweepSpec::new(vec![SweepEntry::Frequency(FrequencySweep {
                range: (1e6, 1e9),
                points,
                scale: Scale::Log,
            })]);
            bencher.iter(|| run_sweep(black_box(&model), black_box(&pkg), black_box(&spec)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_run_sweep);
criterion_main!(benches);
