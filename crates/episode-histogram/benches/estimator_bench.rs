//! Benchmarks for the running quantile estimator

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use episode_core::{HistogramRange, QuantileSet};
use episode_histogram::RunningQuantileStats;
use ndarray::Array2;

/// Generate a `(rows, width)` batch with a slowly widening range
fn generate_batch(rows: usize, width: usize, offset: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, width), |(i, j)| {
        let t = (i + offset) as f64;
        (t * 0.1 + j as f64).sin() * (1.0 + t * 1e-3)
    })
}

/// Benchmark feeding an episode in batches, adaptive vs fixed edges
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("running_quantile_update");

    for &width in &[1usize, 6, 14] {
        let batches: Vec<_> = (0..20).map(|b| generate_batch(256, width, b * 256)).collect();

        for (name, range) in [
            ("adaptive", HistogramRange::Adaptive),
            ("fixed", HistogramRange::Fixed { min: -10.0, max: 10.0 }),
        ] {
            group.bench_with_input(
                BenchmarkId::new(name, format!("{width}_dims")),
                &batches,
                |b, batches| {
                    b.iter(|| {
                        let mut stats = RunningQuantileStats::new(QuantileSet::default(), 5000)
                            .and_then(|s| s.with_range(range))
                            .unwrap();
                        for batch in batches {
                            stats.update(batch.view()).unwrap();
                        }
                        black_box(stats.get_statistics().unwrap())
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
