use criterion::{black_box, criterion_group, criterion_main, Criterion};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{CircuitModel, Component, NumericContext, PortConnection};
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
    fn ymatrix(&self, _ctx: &NumericContext) -> rf_core::Result<DMatrix<Complex64>> {
        Ok(DMatrix::zeros(2, 2))
    }
}

fn ladder_network(n: usize) -> CircuitModel {
    let mut model = CircuitModel::new();
    for i in 0..n {
        let id = format!("R{i}");
        model.components.push(Arc::new(TwoPort {
            id: id.clone(),
            ports: vec!["1".into(), "2".into()],
            local: IndexMap::new(),
        }));
        model.connections.push(PortConnection {
            component_id: id.clone(),
            port_name: "1".into(),
            net_name: format!("n{i}"),
        });
        model.connections.push(PortConnection {
            component_id: id,
            port_name: "2".into(),
            net_name: format!("n{}", i + 1),
        });
    }
    model
}

fn bench_pattern_compile(c: &mut Criterion) {
    let model = ladder_network(200);
    c.bench_function("compile_pattern_200_series", |b| {
        b.iter(|| {
            let pkg = rf_core::build_static_package(black_box(&model));
            black_box(pkg);
        })
    });
}

criterion_group!(benches, bench_pattern_compile);
criterion_main!(benches);
