//! Interrupt Path Benchmarks
//!
//! Both interrupt entry points must be O(1) and independent of the ring
//! capacity. This suite measures them, plus the polling-side export, across
//! capacities.
//!
//! Run with:
//!   cargo bench -p pulseflow-core --bench interrupt_paths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulseflow_core::capture::CaptureUnit;
use pulseflow_core::edge::PulseEdgeTracker;
use pulseflow_core::estimator::FlowRateEstimator;
use pulseflow_core::node::FlowMeter;
use pulseflow_core::time::instant;
use pulseflow_core::EngineConfig;

fn bench_edge(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_isr");
    group.throughput(Throughput::Elements(1));

    group.bench_function("record", |b| {
        let tracker = PulseEdgeTracker::new();
        let mut now = 0u32;
        b.iter(|| {
            now = now.wrapping_add(7);
            black_box(tracker.record(instant(black_box(now))));
        });
    });

    group.bench_function("snapshot", |b| {
        let tracker = PulseEdgeTracker::new();
        tracker.record(instant(100));
        b.iter(|| black_box(tracker.snapshot()));
    });

    group.finish();
}

fn tick_with_capacity<const N: usize>(c: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    c.bench_with_input(BenchmarkId::new("on_tick", N), &N, |b, _| {
        let meter = FlowMeter::<N>::new();
        let mut sample = 0u16;
        b.iter(|| {
            sample = sample.wrapping_add(1);
            black_box(meter.on_tick(black_box(sample)));
        });
    });

    c.bench_with_input(BenchmarkId::new("export", N), &N, |b, _| {
        let unit = CaptureUnit::<N>::new();
        unit.trigger();
        for v in 0..N as u16 {
            unit.on_tick(v);
        }
        b.iter(|| black_box(unit.try_export()));
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_isr");
    group.throughput(Throughput::Elements(1));

    tick_with_capacity::<32>(&mut group);
    tick_with_capacity::<256>(&mut group);
    tick_with_capacity::<4096>(&mut group);

    group.finish();
}

fn bench_estimator(c: &mut Criterion) {
    c.bench_function("estimator_update", |b| {
        let tracker = PulseEdgeTracker::new();
        tracker.record(instant(1000));
        tracker.record(instant(1100));
        let state = tracker.snapshot();
        let mut estimator = FlowRateEstimator::new(&EngineConfig::default());
        b.iter(|| black_box(estimator.update(instant(black_box(1150)), &state)));
    });
}

criterion_group!(benches, bench_edge, bench_tick, bench_estimator);
criterion_main!(benches);
