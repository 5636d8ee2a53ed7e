use criterion::{black_box, criterion_group, criterion_main, Criterion};
use indexmap::IndexMap;
use rf_resolver::resolve_parameters;

fn chained_params(n: usize) -> IndexMap<String, String> {
    let mut raw = IndexMap::new();
    raw.insert("p0".to_string(), "1000 ohm".to_string());
    for i in 1..n {
        raw.insert(format!("p{i}"), format!("p{} * 1.001", i - 1));
    }
    raw
}

fn bench_resolve_chain(c: &mut Criterion) {
    let raw = chained_params(200);
    c.bench_function("resolve_200_chained_params", |b| {
        b.iter(|| {
            let resolved = resolve_parameters(black_box(&raw), &|_| None).unwrap();
            black_box(resolved);
        })
    });
}

criterion_group!(benches, bench_resolve_chain);
criterion_main!(benches);
