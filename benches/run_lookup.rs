//! Run lookup benchmarks
//!
//! Benchmarks for the storage and lookup path:
//! - Run construction (sort + validation)
//! - Time lookup (conservative)
//! - Quality lookup (optimistic)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use std::sync::Arc;

use bench_data::dimension::{DimensionDirection, DimensionType};
use bench_data::parser::default_parser;
use bench_data::storage::{
    ColumnSpec, DataFactory, DataPointRef, LongEncodedDataFactory, NumericValue, PointLayout,
    PrimitiveType,
};

fn factory() -> LongEncodedDataFactory {
    let layout = PointLayout::new(vec![
        ColumnSpec {
            name: "FEs".to_string(),
            primitive_type: PrimitiveType::Long,
            direction: DimensionDirection::IncreasingStrictly,
            dimension_type: DimensionType::IterationFe,
        },
        ColumnSpec {
            name: "f".to_string(),
            primitive_type: PrimitiveType::Double,
            direction: DimensionDirection::Decreasing,
            dimension_type: DimensionType::QualityProblemDependent,
        },
    ]);
    LongEncodedDataFactory::new(
        Arc::new(layout),
        vec![
            default_parser(PrimitiveType::Long),
            default_parser(PrimitiveType::Double),
        ],
    )
}

/// A progress log of `len` improvements with random gaps
fn create_points(factory: &LongEncodedDataFactory, len: usize) -> Vec<DataPointRef> {
    let mut rng = rand::thread_rng();
    let mut fes = 0_i64;
    let mut quality = 1.0e6_f64;
    (0..len)
        .map(|_| {
            fes += rng.gen_range(1..100);
            quality -= rng.gen_range(0.0..10.0);
            factory
                .parse_numbers(&[NumericValue::Long(fes), NumericValue::Double(quality)])
                .unwrap()
        })
        .collect()
}

/// Benchmark run construction
fn bench_run_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_construction");
    let f = factory();

    for size in [100, 1_000, 10_000].iter() {
        let mut points = create_points(&f, *size);
        points.reverse();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let run = f.create_run(points.clone()).unwrap();
                black_box(run);
            });
        });
    }

    group.finish();
}

/// Benchmark time and quality lookups
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_find");
    let f = factory();
    let mut rng = rand::thread_rng();

    for size in [100, 10_000, 1_000_000].iter() {
        let run = f.create_run(create_points(&f, *size)).unwrap();
        let last_fes = run.last().get(0).as_long();
        let best = run.last().get(1).as_double();
        let time_queries: Vec<i64> = (0..1_024).map(|_| rng.gen_range(0..=last_fes)).collect();
        let quality_queries: Vec<f64> =
            (0..1_024).map(|_| rng.gen_range(best..1.0e6)).collect();

        group.bench_with_input(BenchmarkId::new("time", size), size, |b, _| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % time_queries.len();
                black_box(run.find_long(0, time_queries[i]));
            });
        });

        group.bench_with_input(BenchmarkId::new("quality", size), size, |b, _| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % quality_queries.len();
                black_box(run.find_double(1, quality_queries[i]));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_run_construction, bench_find);
criterion_main!(benches);
