//! Criterion benchmarks for building and solving the tracking ILP.
//!
//! Run with: cargo bench
//! Run specific group: cargo bench -- build

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::time::Duration;

use growthline_tracking::synthetic::{generate_growth_lines, SyntheticConfig};
use growthline_tracking::{
    track_all, BranchAndBoundEnv, GrowthLine, GrowthLineTrackingIlp, NoOpReporter, SolverConfig,
    TrackingConfig,
};

const FRAME_COUNTS: &[usize] = &[3, 5, 8];

fn lines_for(frames: usize, growth_lines: usize) -> Vec<GrowthLine> {
    let config = SyntheticConfig {
        frames,
        growth_lines,
        ..SyntheticConfig::default()
    };
    generate_growth_lines(&config).expect("synthetic config is valid")
}

fn tracking_config() -> TrackingConfig {
    TrackingConfig::default().with_node_limit(Some(200_000))
}

// =============================================================================
// Model construction
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.measurement_time(Duration::from_secs(5));

    let config = tracking_config();
    let env = BranchAndBoundEnv::open(config.solver.clone());
    for &frames in FRAME_COUNTS {
        let lines = lines_for(frames, 1);
        group.bench_with_input(BenchmarkId::from_parameter(frames), &lines[0], |b, line| {
            b.iter(|| {
                GrowthLineTrackingIlp::build(&env, line.frames(), &config, &mut NoOpReporter)
                    .expect("build succeeds")
            })
        });
    }
    group.finish();
}

// =============================================================================
// Build + solve
// =============================================================================

fn bench_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("track");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let config = tracking_config();
    let env = BranchAndBoundEnv::open(config.solver.clone());
    for &frames in FRAME_COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(frames), &frames, |b, &frames| {
            b.iter_batched(
                || lines_for(frames, 4),
                |mut lines| track_all(&mut lines, &env, &config),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

// =============================================================================
// Solver limits
// =============================================================================

fn bench_node_limits(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_limit");
    group.sample_size(20);

    for limit in [1_000u64, 10_000, 100_000] {
        let solver = SolverConfig {
            node_limit: Some(limit),
            ..SolverConfig::default()
        };
        let config = TrackingConfig {
            solver: solver.clone(),
            ..TrackingConfig::default()
        };
        let env = BranchAndBoundEnv::open(solver);
        group.bench_function(BenchmarkId::from_parameter(limit), |b| {
            b.iter_batched(
                || lines_for(5, 1),
                |mut lines| track_all(&mut lines, &env, &config),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_track, bench_node_limits);
criterion_main!(benches);
