//! Ground truth and measurement generation
//!
//! A deterministic scenario generator for integration tests and
//! benchmarks: constant-velocity objects enter at each lane's entrance,
//! traverse the road, and are sensed as intervals with corner-level
//! occlusion cast by objects in nearer lanes. This stands in for the
//! external traffic simulator during development; it is not part of the
//! filter core's contract.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};

use crate::config::{RoadModel, SensorModel};
use crate::types::{CornerReading, IntervalMeasurement};

/// True state of one simulated object.
#[derive(Debug, Clone, Copy)]
pub struct GroundTruthObject {
    /// Lane the object travels on
    pub lane: usize,
    /// Leading-corner position
    pub position: f64,
    /// Object length
    pub length: f64,
    /// Signed speed
    pub speed: f64,
}

impl GroundTruthObject {
    /// Spatial extents, leading corner first in the direction of travel.
    pub fn extents(&self) -> (f64, f64) {
        crate::likelihood::extents(self.position, self.length, self.speed)
    }
}

/// Output of one scenario step.
#[derive(Debug, Clone)]
pub struct ScenarioStep {
    /// True object states after this step's motion
    pub objects: Vec<GroundTruthObject>,
    /// Synthesized sensor measurements
    pub measurements: Vec<IntervalMeasurement>,
}

/// Deterministic multi-lane traffic scenario.
pub struct Scenario {
    road: RoadModel,
    sensor: SensorModel,
    rng: StdRng,
    objects: Vec<GroundTruthObject>,
    /// Per-lane per-step probability of a new object entering
    spawn_probability: f64,
    /// Speed band for spawned objects (unsigned)
    speed_range: (f64, f64),
    /// Length band for spawned objects
    length_range: (f64, f64),
}

impl Scenario {
    /// Create a scenario with the given models and RNG seed.
    pub fn new(road: RoadModel, sensor: SensorModel, seed: u64) -> Self {
        Self {
            road,
            sensor,
            rng: StdRng::seed_from_u64(seed),
            objects: Vec::new(),
            spawn_probability: 0.05,
            speed_range: (0.5, 1.5),
            length_range: (3.0, 6.0),
        }
    }

    /// Override the spawn probability.
    pub fn with_spawn_probability(mut self, p: f64) -> Self {
        self.spawn_probability = p;
        self
    }

    /// Place an object directly, for hand-built test scenes.
    pub fn push_object(&mut self, object: GroundTruthObject) {
        self.objects.push(object);
    }

    /// Current true objects.
    pub fn objects(&self) -> &[GroundTruthObject] {
        &self.objects
    }

    /// Advance the scenario one step and synthesize measurements.
    pub fn step(&mut self) -> ScenarioStep {
        self.advance();
        self.spawn();
        let measurements = self.sense();
        ScenarioStep {
            objects: self.objects.clone(),
            measurements,
        }
    }

    fn advance(&mut self) {
        let road_len = self.road.road_len;
        for obj in self.objects.iter_mut() {
            obj.position += obj.speed;
        }
        self.objects
            .retain(|o| o.position.abs() - o.length < road_len);
    }

    fn spawn(&mut self) {
        for lane in 0..self.road.lanes {
            if self.rng.gen::<f64>() >= self.spawn_probability {
                continue;
            }
            let direction = self.road.direction(lane);
            let entrance = -self.road.road_len * direction;
            // keep a gap so ground-truth objects never overlap in a lane
            let entrance_clear = self
                .objects
                .iter()
                .filter(|o| o.lane == lane)
                .all(|o| (o.position - entrance).abs() > 12.0);
            if !entrance_clear {
                continue;
            }
            let length = self.rng.gen_range(self.length_range.0..self.length_range.1);
            let speed = self.rng.gen_range(self.speed_range.0..self.speed_range.1) * direction;
            self.objects.push(GroundTruthObject {
                lane,
                position: entrance,
                length,
                speed,
            });
        }
    }

    /// Synthesize interval measurements lane by lane, nearest first.
    ///
    /// Objects in nearer lanes cast shadows that scale with depth along
    /// the sightline; a corner falling inside a shadow is reported with
    /// bounds instead of a precise reading, and an object fully inside a
    /// shadow produces no measurement at all.
    fn sense(&mut self) -> Vec<IntervalMeasurement> {
        let noise = Normal::new(0.0, self.sensor.position_noise_std)
            .expect("position noise std is non-negative");
        let mut measurements = Vec::new();
        // shadows normalized by depth so one list serves every lane
        let mut shadows: Vec<(f64, f64)> = Vec::new();

        for lane in 0..self.road.lanes {
            let depth = self.road.depth(lane);
            let lane_shadows: Vec<(f64, f64)> =
                shadows.iter().map(|&(a, b)| (a * depth, b * depth)).collect();

            let lane_objects: Vec<GroundTruthObject> = self
                .objects
                .iter()
                .copied()
                .filter(|o| o.lane == lane)
                .collect();

            for obj in &lane_objects {
                let (left, right) = obj.extents();

                let left_shadow = lane_shadows
                    .iter()
                    .find(|&&(a, b)| left >= a && left <= b)
                    .copied();
                let right_shadow = lane_shadows
                    .iter()
                    .find(|&&(a, b)| right >= a && right <= b)
                    .copied();

                let fully_hidden = match (left_shadow, right_shadow) {
                    (Some(ls), Some(rs)) => ls == rs,
                    _ => false,
                };

                // the object itself occludes farther lanes whether or not
                // it was detected
                shadows.push((left / depth, right / depth));

                if fully_hidden {
                    continue;
                }
                if self.rng.gen::<f64>() >= self.sensor.detection_probability {
                    continue;
                }

                let left_reading = match left_shadow {
                    None => CornerReading::visible(left + noise.sample(&mut self.rng)),
                    Some((a, b)) => CornerReading::occluded(a, b.min(right)),
                };
                let right_reading = match right_shadow {
                    None => CornerReading::visible(right + noise.sample(&mut self.rng)),
                    Some((a, b)) => CornerReading::occluded(a.max(left), b),
                };

                measurements.push(IntervalMeasurement::new(lane, left_reading, right_reading));
            }

            // false positives: short fully visible intervals anywhere
            if self.sensor.false_positive_rate > 0.0 {
                let lambda = self.sensor.false_positive_rate / self.road.lanes as f64;
                let count = Poisson::new(lambda)
                    .map(|p| p.sample(&mut self.rng) as usize)
                    .unwrap_or(0);
                for _ in 0..count {
                    let left = self
                        .rng
                        .gen_range(-self.road.road_len..self.road.road_len - 4.0);
                    let width = self.rng.gen_range(2.0..4.0);
                    measurements.push(IntervalMeasurement::fully_visible(lane, left, left + width));
                }
            }
        }

        measurements
    }
}
