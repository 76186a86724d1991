//! Performance benchmarks for the SEIRD solvers
//!
//! # What We're Measuring
//!
//! 1. **Forward Euler on the grid model**:
//!    - 1 right-hand side evaluation per step
//!    - cost ∝ cells × steps
//!
//! 2. **Sequential vs parallel cell evaluation** (feature `parallel`):
//!    - the same grid step with the rayon threshold forced above / below the grid size
//!
//! 3. **Dormand–Prince on the lumped model**:
//!    - cost driven by the number of accepted/rejected steps, not by the output grid
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all solver benchmarks
//! cargo bench --bench solver_performance
//!
//! # Only the grid model
//! cargo bench --bench solver_performance spatial
//!
//! # Only the lumped model
//! cargo bench --bench solver_performance lumped
//! ```
//!
//! # Understanding Results
//!
//! ```text
//! spatial_euler/50        time:   [4.1 ms 4.2 ms 4.3 ms]
//! spatial_euler/100       time:   [16.5 ms 16.7 ms 16.9 ms]
//! ```
//!
//! Doubling the grid side quadruples the cells, so time should grow about 4×.
//! Much more than that points at cache effects or allocation overhead.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use seird_rs::config::SimulationConfig;
use seird_rs::physics::{CompartmentVector, EpidemicModel, ParameterSet};
use seird_rs::solver::{set_parallel_threshold, parallel_threshold, DormandPrinceSolver, Solver, SolverConfiguration, Tolerance};
use std::hint::black_box;
use std::time::Duration;

// =================================================================================================
// Grid model
// =================================================================================================

/// Forward Euler on square grids of increasing size
///
/// 20 steps of the reference configuration per iteration. Time should scale
/// with the number of cells.
fn benchmark_spatial_euler(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_euler");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(10));

    for side in [25usize, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            // Setup phase (not measured)
            let mut config = SimulationConfig::default();
            config.spatial.shape = (side, side);
            config.spatial.time_steps = 20;
            config.spatial.snapshot_interval = 20;

            let scenario = config.spatial_scenario().unwrap();
            let solver = config.spatial.solver();
            let solver_config = config.spatial.solver_configuration();

            // Measurement phase
            b.iter(|| solver.solve(black_box(&scenario), black_box(&solver_config)).unwrap());
        });
    }

    group.finish();
}

/// One right-hand side evaluation of a 200×200 grid, both assembly paths
fn benchmark_parallel_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_rates");

    let mut config = SimulationConfig::default();
    config.spatial.shape = (200, 200);
    let scenario = config.spatial_scenario().unwrap();

    let previous = parallel_threshold();

    set_parallel_threshold(usize::MAX);
    group.bench_function("sequential", |b| {
        b.iter(|| scenario.model.rates(black_box(&scenario.initial_state)).unwrap())
    });

    set_parallel_threshold(1);
    group.bench_function("parallel", |b| {
        b.iter(|| scenario.model.rates(black_box(&scenario.initial_state)).unwrap())
    });

    set_parallel_threshold(previous);
    group.finish();
}

// =================================================================================================
// Lumped model
// =================================================================================================

/// Dormand–Prince over the 200-day reference interval at several tolerances
///
/// Tighter tolerances need more steps: each factor 100 in rtol costs about
/// 100^(1/5) ≈ 2.5× more steps.
fn benchmark_lumped_dopri(c: &mut Criterion) {
    let mut group = c.benchmark_group("lumped_dopri");

    let config = SimulationConfig::default();
    let scenario = config.lumped_scenario().unwrap();
    let solver_config = SolverConfiguration::adaptive(0.0, 200.0, 200);

    for rtol in [1e-4, 1e-6, 1e-8, 1e-10] {
        let solver = DormandPrinceSolver::with_tolerance(Tolerance {
            rtol,
            atol: rtol * 1e-3,
            ..Default::default()
        });

        group.bench_with_input(BenchmarkId::from_parameter(rtol), &solver, |b, solver| {
            b.iter(|| solver.solve(black_box(&scenario), black_box(&solver_config)).unwrap())
        });
    }

    group.finish();
}

/// Right-hand side cost alone, for reference against the solver overhead
fn benchmark_lumped_rates(c: &mut Criterion) {
    let model = seird_rs::models::LumpedSeird::new(ParameterSet::default()).unwrap();
    let state = CompartmentVector::new(989.0, 10.0, 1.0, 0.0, 0.0);

    c.bench_function("lumped_rates", |b| b.iter(|| model.rates(black_box(&state)).unwrap()));
}

criterion_group!(
    benches,
    benchmark_spatial_euler,
    benchmark_parallel_threshold,
    benchmark_lumped_dopri,
    benchmark_lumped_rates,
);
criterion_main!(benches);
