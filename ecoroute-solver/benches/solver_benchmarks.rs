//! Criterion benchmarks for the local search solver.
//!
//! Measures construction alone and construction followed by a fixed number of
//! guided local search passes across problem sizes (25, 50, 100 stops).
//! Iteration caps keep the measured work independent of the wall clock.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package ecoroute-solver
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![expect(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ecoroute_core::{SearchParameters, SolveRequest, Solver};
use ecoroute_solver::LocalSearchSolver;


use bench_support::{BENCHMARK_SEED, generate_clustered_points, generate_request};

/// Problem sizes to benchmark.
const PROBLEM_SIZES: &[usize] = &[25, 50, 100];

/// Guided local search passes per measured solve.
const SEARCH_PASSES: u64 = 50;

fn build_request(size: usize, iterations: u64) -> SolveRequest {
    let points = generate_clustered_points(size, BENCHMARK_SEED);
    generate_request(&points, BENCHMARK_SEED).with_parameters(
        SearchParameters::default()
            .with_time_limit(Duration::from_secs(600))
            .with_iteration_limit(iterations),
    )
}

fn bench_group(c: &mut Criterion, name: &str, iterations: u64) {
    let mut group = c.benchmark_group(name);
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let solver = LocalSearchSolver::new();
    for &size in PROBLEM_SIZES {
        let request = build_request(size, iterations);
        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::new("stops", size), &request, |b, request| {
            b.iter(|| {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Benchmarking solve performance, result is intentionally discarded"
                )]
                let _ = solver.solve(request);
            });
        });
    }

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    bench_group(c, "construction", 0);
}

fn bench_guided_search(c: &mut Criterion) {
    bench_group(c, "guided_search", SEARCH_PASSES);
}

criterion_group!(benches, bench_construction, bench_guided_search);
criterion_main!(benches);
