//! Configuration types for the roadway filter
//!
//! Decomposed, purpose-specific configs: the road topology, the interval
//! sensor, the birth prior, and the aggregate [`FilterParams`] consumed by
//! the filter. Serializable snapshot types support debugging and
//! cross-implementation comparison.

use serde::Serialize;

use crate::common::constants::{
    COVERAGE_THRESHOLD, DEFAULT_JAM_ITERATIONS, DEFAULT_PARTICLES_PER_LANE,
    DEFAULT_REPORT_THRESHOLD, NOISE_TOLERANCE,
};
use crate::error::FilterError;

/// Road topology: how many lanes, which way they flow, and how deep each
/// lane sits along the shared sightline.
#[derive(Debug, Clone)]
pub struct RoadModel {
    /// Total number of lanes
    pub lanes: usize,
    /// The first `lanes_rightward` lanes travel in the +position direction;
    /// the remainder travel in the -position direction
    pub lanes_rightward: usize,
    /// Half-width of the modeled road: positions span `[-road_len, road_len]`
    pub road_len: f64,
    /// Depth of one lane along the sightline; lane `k` sits at depth
    /// `crossing_len * (k + 1)`
    pub crossing_len: f64,
}

impl RoadModel {
    /// Create a new road model
    pub fn new(lanes: usize, lanes_rightward: usize, road_len: f64, crossing_len: f64) -> Self {
        Self {
            lanes,
            lanes_rightward,
            road_len,
            crossing_len,
        }
    }

    /// Signed travel direction of a lane: `+1.0` rightward, `-1.0` leftward.
    #[inline]
    pub fn direction(&self, lane: usize) -> f64 {
        if lane < self.lanes_rightward {
            1.0
        } else {
            -1.0
        }
    }

    /// Depth of a lane along the sightline.
    #[inline]
    pub fn depth(&self, lane: usize) -> f64 {
        self.crossing_len * (lane + 1) as f64
    }

    /// Ratio by which lane `lane - 1`'s occlusion edges stretch when
    /// projected onto lane `lane`.
    #[inline]
    pub fn depth_ratio(&self, lane: usize) -> f64 {
        debug_assert!(lane > 0, "lane 0 has no nearer lane to project from");
        self.depth(lane) / self.depth(lane - 1)
    }
}

impl Default for RoadModel {
    fn default() -> Self {
        Self {
            lanes: 4,
            lanes_rightward: 2,
            road_len: 40.0,
            crossing_len: 3.0,
        }
    }
}

/// Interval sensor characteristics.
#[derive(Debug, Clone)]
pub struct SensorModel {
    /// Standard deviation of a visible corner reading
    pub position_noise_std: f64,
    /// Probability an on-road object produces a measurement
    pub detection_probability: f64,
    /// Expected false-positive intervals per time step across the road
    pub false_positive_rate: f64,
}

impl SensorModel {
    /// Create a new sensor model
    pub fn new(position_noise_std: f64, detection_probability: f64, false_positive_rate: f64) -> Self {
        Self {
            position_noise_std,
            detection_probability,
            false_positive_rate,
        }
    }

    /// Noise standard deviation used by the likelihood kernel: the sensor
    /// noise inflated by a fixed tolerance against model mismatch.
    #[inline]
    pub fn likelihood_noise_std(&self) -> f64 {
        self.position_noise_std + NOISE_TOLERANCE
    }
}

impl Default for SensorModel {
    fn default() -> Self {
        Self {
            position_noise_std: 0.2,
            detection_probability: 0.9,
            false_positive_rate: 0.15,
        }
    }
}

/// Prior over newly appearing objects.
///
/// Births are drawn uniformly over a `(position, length, speed)` box and
/// placed just beyond the lane's entrance boundary, opposite the direction
/// of travel.
#[derive(Debug, Clone)]
pub struct BirthModel {
    /// Expected newly appearing objects per lane per step
    pub birth_rate: f64,
    /// Width of the uniform position band births are drawn over
    pub entrance_span: f64,
    /// Inward shift of the leftward-lane entrance band, keeping a birthed
    /// leading corner from starting past the road edge
    pub entrance_inset: f64,
    /// Minimum object length in the prior box
    pub min_length: f64,
    /// Maximum object length in the prior box
    pub max_length: f64,
    /// Minimum object speed in the prior box (unsigned; sign comes from
    /// the lane direction)
    pub min_speed: f64,
    /// Maximum object speed in the prior box
    pub max_speed: f64,
    /// Per-dimension jitter standard deviations (position, length, speed)
    /// applied to resampled particles against impoverishment
    pub jitter_std: [f64; 3],
}

impl Default for BirthModel {
    fn default() -> Self {
        Self {
            birth_rate: 0.15,
            entrance_span: 5.0,
            entrance_inset: 4.0,
            min_length: 3.0,
            max_length: 6.0,
            min_speed: 0.5,
            max_speed: 1.5,
            jitter_std: [0.3, 0.1, 0.07],
        }
    }
}

/// Complete filter parameterization.
#[derive(Debug, Clone)]
pub struct FilterParams {
    /// Road topology
    pub road: RoadModel,
    /// Sensor characteristics
    pub sensor: SensorModel,
    /// Birth prior
    pub birth: BirthModel,
    /// Fixed particle budget per lane
    pub particles: usize,
    /// Entrance-coverage fraction below which resampling triggers
    pub coverage_threshold: f64,
    /// Minimum existence mass for an object to be reported
    pub report_threshold: f64,
    /// Fixed iteration count for the joint association solver
    pub jam_iterations: usize,
}

impl FilterParams {
    /// Create a new builder
    pub fn builder() -> FilterParamsBuilder {
        FilterParamsBuilder::default()
    }

    /// Validate parameter consistency.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.particles == 0 {
            return Err(FilterError::Configuration {
                description: "particle count must be positive".to_string(),
            });
        }
        if self.road.lanes == 0 {
            return Err(FilterError::Configuration {
                description: "road must have at least one lane".to_string(),
            });
        }
        if self.road.lanes_rightward > self.road.lanes {
            return Err(FilterError::Configuration {
                description: format!(
                    "lanes_rightward ({}) exceeds lane count ({})",
                    self.road.lanes_rightward, self.road.lanes
                ),
            });
        }
        if !(self.road.road_len > 0.0 && self.road.crossing_len > 0.0) {
            return Err(FilterError::Configuration {
                description: "road_len and crossing_len must be positive".to_string(),
            });
        }
        if self.birth.min_length > self.birth.max_length
            || self.birth.min_speed > self.birth.max_speed
        {
            return Err(FilterError::Configuration {
                description: "birth prior box bounds are inverted".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.sensor.detection_probability) {
            return Err(FilterError::Configuration {
                description: "detection probability must lie in [0, 1]".to_string(),
            });
        }
        if self.birth.birth_rate <= 0.0 {
            return Err(FilterError::Configuration {
                description: "birth rate must be positive".to_string(),
            });
        }
        if self.sensor.false_positive_rate <= 0.0 {
            return Err(FilterError::Configuration {
                description: "false-positive rate must be positive; the association \
                              stage needs a nonzero clutter affinity"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Configuration snapshot for debugging/comparison.
    pub fn snapshot(&self) -> FilterConfigSnapshot {
        FilterConfigSnapshot::from(self)
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            road: RoadModel::default(),
            sensor: SensorModel::default(),
            birth: BirthModel::default(),
            particles: DEFAULT_PARTICLES_PER_LANE,
            coverage_threshold: COVERAGE_THRESHOLD,
            report_threshold: DEFAULT_REPORT_THRESHOLD,
            jam_iterations: DEFAULT_JAM_ITERATIONS,
        }
    }
}

/// Builder for [`FilterParams`]
#[derive(Debug, Default)]
pub struct FilterParamsBuilder {
    road: Option<RoadModel>,
    sensor: Option<SensorModel>,
    birth: Option<BirthModel>,
    particles: Option<usize>,
    coverage_threshold: Option<f64>,
    report_threshold: Option<f64>,
    jam_iterations: Option<usize>,
}

impl FilterParamsBuilder {
    /// Set the road model
    pub fn road(mut self, road: RoadModel) -> Self {
        self.road = Some(road);
        self
    }

    /// Set the sensor model
    pub fn sensor(mut self, sensor: SensorModel) -> Self {
        self.sensor = Some(sensor);
        self
    }

    /// Set the birth prior
    pub fn birth(mut self, birth: BirthModel) -> Self {
        self.birth = Some(birth);
        self
    }

    /// Set the per-lane particle budget
    pub fn particles(mut self, particles: usize) -> Self {
        self.particles = Some(particles);
        self
    }

    /// Set the entrance-coverage resampling threshold
    pub fn coverage_threshold(mut self, threshold: f64) -> Self {
        self.coverage_threshold = Some(threshold);
        self
    }

    /// Set the reporting existence threshold
    pub fn report_threshold(mut self, threshold: f64) -> Self {
        self.report_threshold = Some(threshold);
        self
    }

    /// Set the joint association iteration count
    pub fn jam_iterations(mut self, iterations: usize) -> Self {
        self.jam_iterations = Some(iterations);
        self
    }

    /// Build and validate the parameters
    pub fn build(self) -> Result<FilterParams, FilterError> {
        let params = FilterParams {
            road: self.road.unwrap_or_default(),
            sensor: self.sensor.unwrap_or_default(),
            birth: self.birth.unwrap_or_default(),
            particles: self.particles.unwrap_or(DEFAULT_PARTICLES_PER_LANE),
            coverage_threshold: self.coverage_threshold.unwrap_or(COVERAGE_THRESHOLD),
            report_threshold: self.report_threshold.unwrap_or(DEFAULT_REPORT_THRESHOLD),
            jam_iterations: self.jam_iterations.unwrap_or(DEFAULT_JAM_ITERATIONS),
        };
        params.validate()?;
        Ok(params)
    }
}

// ============================================================================
// Configuration Snapshots (for debugging/comparison)
// ============================================================================

/// Flat, serializable snapshot of a complete filter configuration.
#[derive(Debug, Clone, Serialize)]
pub struct FilterConfigSnapshot {
    /// Number of lanes
    pub lanes: usize,
    /// Number of rightward lanes
    pub lanes_rightward: usize,
    /// Road half-width
    pub road_len: f64,
    /// Depth per lane
    pub crossing_len: f64,
    /// Sensor noise std
    pub position_noise_std: f64,
    /// Likelihood noise std (inflated)
    pub likelihood_noise_std: f64,
    /// Detection probability
    pub detection_probability: f64,
    /// False-positive rate
    pub false_positive_rate: f64,
    /// Birth rate
    pub birth_rate: f64,
    /// Birth prior box: (min_length, max_length, min_speed, max_speed)
    pub birth_box: (f64, f64, f64, f64),
    /// Resampling jitter stds
    pub jitter_std: [f64; 3],
    /// Particle budget per lane
    pub particles: usize,
    /// Coverage threshold
    pub coverage_threshold: f64,
    /// Report threshold
    pub report_threshold: f64,
    /// Association iteration count
    pub jam_iterations: usize,
}

impl From<&FilterParams> for FilterConfigSnapshot {
    fn from(p: &FilterParams) -> Self {
        Self {
            lanes: p.road.lanes,
            lanes_rightward: p.road.lanes_rightward,
            road_len: p.road.road_len,
            crossing_len: p.road.crossing_len,
            position_noise_std: p.sensor.position_noise_std,
            likelihood_noise_std: p.sensor.likelihood_noise_std(),
            detection_probability: p.sensor.detection_probability,
            false_positive_rate: p.sensor.false_positive_rate,
            birth_rate: p.birth.birth_rate,
            birth_box: (
                p.birth.min_length,
                p.birth.max_length,
                p.birth.min_speed,
                p.birth.max_speed,
            ),
            jitter_std: p.birth.jitter_std,
            particles: p.particles,
            coverage_threshold: p.coverage_threshold,
            report_threshold: p.report_threshold,
            jam_iterations: p.jam_iterations,
        }
    }
}

impl FilterConfigSnapshot {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_model_directions() {
        let road = RoadModel::new(4, 2, 40.0, 3.0);
        assert_eq!(road.direction(0), 1.0);
        assert_eq!(road.direction(1), 1.0);
        assert_eq!(road.direction(2), -1.0);
        assert_eq!(road.direction(3), -1.0);
    }

    #[test]
    fn test_road_model_depths() {
        let road = RoadModel::new(4, 2, 40.0, 3.0);
        assert_eq!(road.depth(0), 3.0);
        assert_eq!(road.depth(3), 12.0);
        assert!((road.depth_ratio(2) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_builder_defaults() {
        let params = FilterParams::builder().build().unwrap();
        assert_eq!(params.particles, DEFAULT_PARTICLES_PER_LANE);
        assert_eq!(params.jam_iterations, DEFAULT_JAM_ITERATIONS);
        assert!((params.coverage_threshold - COVERAGE_THRESHOLD).abs() < 1e-12);
    }

    #[test]
    fn test_builder_rejects_zero_particles() {
        let result = FilterParams::builder().particles(0).build();
        assert!(matches!(
            result,
            Err(FilterError::Configuration { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_inverted_prior_box() {
        let birth = BirthModel {
            min_length: 6.0,
            max_length: 3.0,
            ..BirthModel::default()
        };
        assert!(FilterParams::builder().birth(birth).build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_birth_rate() {
        let birth = BirthModel {
            birth_rate: 0.0,
            ..BirthModel::default()
        };
        assert!(FilterParams::builder().birth(birth).build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_false_positive_rate() {
        let sensor = SensorModel::new(0.2, 0.9, 0.0);
        assert!(FilterParams::builder().sensor(sensor).build().is_err());
    }

    #[test]
    fn test_likelihood_noise_is_inflated() {
        let sensor = SensorModel::default();
        assert!(sensor.likelihood_noise_std() > sensor.position_noise_std);
    }

    #[test]
    fn test_snapshot_serializes() {
        let params = FilterParams::default();
        let json = params.snapshot().to_json();
        assert!(json.contains("\"lanes\":4"));
        assert!(json.contains("jam_iterations"));
    }
}
