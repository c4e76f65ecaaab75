//! Behavioral scenarios for the roadway filter
//!
//! Each test pins one piece of the filter contract: acquisition from
//! matching measurements, the measurement-free short circuit, the
//! censored-likelihood arithmetic, and the pure-birth degenerate case.

use lanetrack::common::constants::SURVIVAL_ON_ROAD;
use lanetrack::common::stats::standard_normal_cdf;
use lanetrack::likelihood::edge_likelihood;
use lanetrack::{
    AssociationInput, CornerReading, FilterParams, IntervalMeasurement, JointAssociation,
    LaneParticles, RoadFilter, RoadModel, SensorModel, SimpleRng, StepObserver,
};

/// Seed a lane with a tight particle cloud around one true state.
fn prime_cloud(
    filter: &mut RoadFilter,
    lane: usize,
    rng: &mut SimpleRng,
    position: f64,
    length: f64,
    speed: f64,
    mass: f64,
) {
    use lanetrack::Rng;

    let particles = &mut filter.lane_mut(lane).particles;
    let n = particles.len();
    for i in 0..n {
        particles.states[(i, 0)] = position + rng.randn() * 0.3;
        particles.states[(i, 1)] = length + rng.randn() * 0.1;
        particles.states[(i, 2)] = speed + rng.randn() * 0.05;
    }
    particles.weights.fill(mass / n as f64);
    particles.boundaries = vec![0, n];
}

fn single_lane_params() -> FilterParams {
    FilterParams::builder()
        .road(RoadModel::new(1, 1, 40.0, 3.0))
        .sensor(SensorModel::new(0.2, 0.9, 0.15))
        .particles(1024)
        .build()
        .unwrap()
}

/// Counts association solver invocations.
#[derive(Default)]
struct AssociationCounter {
    solved: usize,
}

impl StepObserver for AssociationCounter {
    fn on_associated(
        &mut self,
        _lane: usize,
        _input: &AssociationInput,
        _result: &JointAssociation,
    ) {
        self.solved += 1;
    }
}

#[test]
fn scenario_a_matching_measurements_lock_on() {
    let mut filter = RoadFilter::new(single_lane_params()).unwrap();
    let mut rng = SimpleRng::new(42);

    // True object: leading corner 10, length 4, speed 1 (rightward).
    let (position, length, speed) = (10.0, 4.0, 1.0);
    prime_cloud(&mut filter, 0, &mut rng, position, length, speed, 0.9);

    // Two consecutive steps, each with a fully visible measurement at the
    // predicted true extents.
    let mut estimates = Vec::new();
    for k in 1..=2 {
        let predicted = position + speed * k as f64;
        let m = IntervalMeasurement::fully_visible(0, predicted - length, predicted);
        estimates = filter.step(&mut rng, &[m]).unwrap();
    }

    // 3 sigma of the inflated likelihood noise
    let tolerance = 3.0 * filter.params().sensor.likelihood_noise_std();
    let truth_position = position + 2.0 * speed;

    let locked: Vec<_> = estimates
        .iter()
        .filter(|e| (e.position - truth_position).abs() < tolerance)
        .collect();
    assert_eq!(locked.len(), 1, "estimates: {:?}", estimates);
    let e = locked[0];
    assert!((e.length - length).abs() < tolerance, "length {}", e.length);
    assert!((e.speed - speed).abs() < tolerance, "speed {}", e.speed);
    assert!(e.existence > 0.5);
}

#[test]
fn scenario_b_no_measurements_short_circuits() {
    let mut filter = RoadFilter::new(single_lane_params()).unwrap();
    let mut rng = SimpleRng::new(7);

    // Entrance-covering cloud so no resample fires either.
    {
        let particles = &mut filter.lane_mut(0).particles;
        let n = particles.len();
        for i in 0..n {
            particles.states[(i, 0)] = -39.0;
            particles.states[(i, 1)] = 5.0;
            particles.states[(i, 2)] = 0.0;
        }
        particles.weights.fill(0.5 / n as f64);
        particles.boundaries = vec![0, n];
    }
    let before: Vec<f64> = filter.lane(0).particles.weights.iter().copied().collect();

    let mut counter = AssociationCounter::default();
    filter.step_observed(&mut rng, &[], &mut counter).unwrap();

    assert_eq!(
        counter.solved, 0,
        "association must not run without measurements"
    );
    for (i, w) in filter.lane(0).particles.weights.iter().enumerate() {
        let expected = before[i] * SURVIVAL_ON_ROAD;
        assert!((w - expected).abs() < 1e-15);
    }
}

#[test]
fn scenario_c_occluded_edge_is_cdf_difference() {
    let sigma = SensorModel::default().likelihood_noise_std();
    let corner = CornerReading::occluded(2.0, 4.0);

    let ll = edge_likelihood(3.0, &corner, sigma);
    let expected =
        standard_normal_cdf((4.0 - 3.0) / sigma) - standard_normal_cdf((2.0 - 3.0) / sigma);

    assert!((ll - expected).abs() < 1e-12);
    assert!(ll > 0.0 && ll < 1.0);
}

#[test]
fn scenario_d_zero_cardinality_resample_is_pure_birth() {
    let mut filter = RoadFilter::new(single_lane_params()).unwrap();
    let mut rng = SimpleRng::new(3);

    // Fresh filter: zero weights everywhere, so the first step's resample
    // has cardinality 0 and every particle must be a fresh birth draw.
    filter.step(&mut rng, &[]).unwrap();

    let particles = &filter.lane(0).particles;
    let params = filter.params();
    assert_eq!(particles.num_objects(), 1);
    for i in 0..particles.len() {
        let pos = particles.states[(i, 0)];
        assert!(
            pos >= -params.road.road_len
                && pos < -params.road.road_len + params.birth.entrance_span,
            "particle {} at {} is not a fresh entrance draw",
            i,
            pos
        );
        assert!(particles.states[(i, 1)] >= params.birth.min_length);
        assert!(particles.states[(i, 1)] < params.birth.max_length);
    }
}

#[test]
fn extents_are_pure() {
    use lanetrack::likelihood::extents;
    let a = extents(12.5, 4.25, -1.5);
    let b = extents(12.5, 4.25, -1.5);
    assert_eq!(a, b);
}

#[test]
fn occluded_measurements_still_support_tracking() {
    // An object whose left corner is occluded should still be associated
    // through its interval bounds.
    let mut filter = RoadFilter::new(single_lane_params()).unwrap();
    let mut rng = SimpleRng::new(11);
    prime_cloud(&mut filter, 0, &mut rng, 10.0, 4.0, 1.0, 0.9);

    let m = IntervalMeasurement::new(
        0,
        CornerReading::occluded(5.0, 9.0),
        CornerReading::visible(11.0),
    );
    filter.step(&mut rng, &[m]).unwrap();

    let estimates = lanetrack::reporter::report(&filter.lane(0).particles, 0, 0.5);
    assert!(
        estimates.iter().any(|e| (e.position - 11.0).abs() < 1.0),
        "estimates: {:?}",
        estimates
    );
}

#[test]
fn seeding_is_reproducible() {
    let run = |seed: u64| {
        let mut filter = RoadFilter::new(single_lane_params()).unwrap();
        let mut rng = SimpleRng::new(seed);
        prime_cloud(&mut filter, 0, &mut rng, 10.0, 4.0, 1.0, 0.9);
        let m = IntervalMeasurement::fully_visible(0, 7.0, 11.0);
        filter.step(&mut rng, &[m]).unwrap()
    };
    let a = run(5);
    let b = run(5);
    assert_eq!(format!("{:?}", a), format!("{:?}", b));
}

#[test]
fn particle_partition_survives_repeated_steps() {
    let mut filter = RoadFilter::new(single_lane_params()).unwrap();
    let mut rng = SimpleRng::new(19);

    for step in 0..50 {
        let m = IntervalMeasurement::fully_visible(0, -30.0 + step as f64, -26.0 + step as f64);
        filter.step(&mut rng, &[m]).unwrap();
        let particles = &filter.lane(0).particles;
        assert!(particles.boundaries_valid(), "step {}", step);
        assert!(particles.weights.iter().all(|w| w.is_finite() && *w >= 0.0));
    }
}

#[test]
fn empty_lane_particles_report_nothing() {
    let particles = LaneParticles::new(16);
    assert!(lanetrack::reporter::report(&particles, 0, 0.5).is_empty());
}
