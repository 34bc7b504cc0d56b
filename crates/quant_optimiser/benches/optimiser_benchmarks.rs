//! Benchmarks for quant_optimiser.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quant_optimiser::constraints::project_capped_simplex;
use quant_optimiser::{
    optimise, MomentEstimate, OptimisationRequest, ReturnSeries, WeightBounds,
};

/// Deterministic daily returns for `n_assets` assets.
fn generate_returns(n_assets: usize, n_days: usize) -> ReturnSeries {
    let assets = (0..n_assets).map(|i| format!("ASSET{}", i)).collect();
    let rows = (0..n_days)
        .map(|t| {
            (0..n_assets)
                .map(|i| {
                    let k = (i + 1) as f64;
                    0.0003 * k + 0.012 * ((t as f64) * (0.2 + 0.31 * k) + k).sin()
                })
                .collect()
        })
        .collect();
    ReturnSeries::from_complete_rows(assets, rows).unwrap()
}

fn benchmark_projection(c: &mut Criterion) {
    let v: Vec<f64> = (0..20).map(|i| (i as f64 * 0.37).sin()).collect();

    c.bench_function("project_capped_simplex_20", |b| {
        b.iter(|| project_capped_simplex(black_box(&v), 0.0, 0.2))
    });
}

fn benchmark_moments(c: &mut Criterion) {
    let series = generate_returns(10, 1_260);

    c.bench_function("moment_estimate_10x1260", |b| {
        b.iter(|| MomentEstimate::from_returns(black_box(&series), 252.0))
    });
}

fn benchmark_optimise(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimise_max_sharpe");

    for n_assets in [3, 5, 10] {
        let series = generate_returns(n_assets, 756);
        let request = OptimisationRequest::new(
            series.assets().to_vec(),
            &series,
            0.1175,
            WeightBounds::new(0.02, 0.40).unwrap(),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n_assets), &request, |b, req| {
            b.iter(|| optimise(black_box(req)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_projection, benchmark_moments, benchmark_optimise);
criterion_main!(benches);
