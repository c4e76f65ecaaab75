//! Filter step benchmark
//!
//! Measures a full multi-lane filter step against scenario-generated
//! measurements at a few particle budgets.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lanetrack::scenario::Scenario;
use lanetrack::{FilterParams, IntervalMeasurement, RoadFilter, RoadModel, SensorModel, SimpleRng};

fn scenario_measurements(steps: usize) -> Vec<Vec<IntervalMeasurement>> {
    let road = RoadModel::default();
    let sensor = SensorModel::default();
    let mut scenario = Scenario::new(road, sensor, 42).with_spawn_probability(0.1);
    (0..steps).map(|_| scenario.step().measurements).collect()
}

fn bench_filter_step(c: &mut Criterion) {
    let frames = scenario_measurements(50);
    let mut group = c.benchmark_group("filter_step");

    for &particles in &[512usize, 2048, 4096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(particles),
            &particles,
            |b, &particles| {
                let params = FilterParams::builder()
                    .particles(particles)
                    .build()
                    .unwrap();
                b.iter(|| {
                    let mut filter = RoadFilter::new(params.clone()).unwrap();
                    let mut rng = SimpleRng::new(7);
                    for frame in &frames {
                        let _ = filter.step(&mut rng, frame).unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_filter_step);
criterion_main!(benches);
