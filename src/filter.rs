//! Per-step filter orchestration across lanes
//!
//! One [`RoadFilter`] owns a [`LaneFilterState`] per lane and sequences
//! each time step: predict, survival weighting, resample/birth when the
//! entrance runs dry, occlusion-edge update, measurement likelihoods,
//! occlusion-aware detection discounting, per-object aggregation, joint
//! association, and the particle weight update. Lanes are processed
//! strictly in sightline order because the occlusion edges computed for a
//! nearer lane constrain (after geometric rescaling) the detection
//! probabilities of every farther lane.

use nalgebra::{DMatrix, DVector};

use crate::association::{joint_association, match_ratios, AssociationInput};
use crate::common::constants::{DETECTION_DERATE, FALSE_POSITIVE_INFLATION};
use crate::common::rng::Rng;
use crate::config::FilterParams;
use crate::error::FilterError;
use crate::likelihood::{extents_all, interval_likelihood};
use crate::observer::{NoOpObserver, StepObserver};
use crate::occlusion::OcclusionEdges;
use crate::particles::LaneParticles;
use crate::reporter::report;
use crate::resample::resample_with_birth;
use crate::types::{IntervalMeasurement, ObjectEstimate};

/// Persistent filter state for one lane.
#[derive(Debug, Clone)]
pub struct LaneFilterState {
    /// The lane's particle cloud
    pub particles: LaneParticles,
    lane: usize,
    direction: f64,
}

impl LaneFilterState {
    /// Lane index along the sightline.
    #[inline]
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// Signed travel direction of the lane.
    #[inline]
    pub fn direction(&self) -> f64 {
        self.direction
    }
}

/// Multi-lane roadway filter.
pub struct RoadFilter {
    params: FilterParams,
    lanes: Vec<LaneFilterState>,
    steps: usize,
}

impl RoadFilter {
    /// Create a filter with empty particle clouds for every lane.
    pub fn new(params: FilterParams) -> Result<Self, FilterError> {
        params.validate()?;
        let lanes = (0..params.road.lanes)
            .map(|lane| LaneFilterState {
                particles: LaneParticles::new(params.particles),
                lane,
                direction: params.road.direction(lane),
            })
            .collect();
        Ok(Self {
            params,
            lanes,
            steps: 0,
        })
    }

    /// Filter parameters.
    #[inline]
    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Per-lane state, for inspection.
    #[inline]
    pub fn lane(&self, lane: usize) -> &LaneFilterState {
        &self.lanes[lane]
    }

    /// Mutable per-lane state, for priming a filter with a known cloud.
    #[inline]
    pub fn lane_mut(&mut self, lane: usize) -> &mut LaneFilterState {
        &mut self.lanes[lane]
    }

    /// Number of steps processed so far.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Advance one time step and report estimates.
    pub fn step<R: Rng>(
        &mut self,
        rng: &mut R,
        measurements: &[IntervalMeasurement],
    ) -> Result<Vec<ObjectEstimate>, FilterError> {
        self.step_observed(rng, measurements, &mut NoOpObserver)
    }

    /// Advance one time step with observability callbacks.
    pub fn step_observed<R: Rng, O: StepObserver>(
        &mut self,
        rng: &mut R,
        measurements: &[IntervalMeasurement],
        observer: &mut O,
    ) -> Result<Vec<ObjectEstimate>, FilterError> {
        let lane_count = self.params.road.lanes;
        let mut per_lane: Vec<Vec<IntervalMeasurement>> = vec![Vec::new(); lane_count];
        for m in measurements {
            if m.lane >= lane_count {
                return Err(FilterError::InvalidLane {
                    lane: m.lane,
                    lanes: lane_count,
                });
            }
            per_lane[m.lane].push(*m);
        }

        // Occlusion edges handed from each lane to the next, at the scale
        // of the lane most recently processed.
        let mut edges = OcclusionEdges::new();

        for lane in 0..lane_count {
            edges = self.step_lane(rng, lane, &per_lane[lane], edges, observer);
        }

        let mut estimates = Vec::new();
        for state in &self.lanes {
            estimates.extend(report(
                &state.particles,
                state.lane,
                self.params.report_threshold,
            ));
        }
        observer.on_reported(&estimates);

        self.steps += 1;
        Ok(estimates)
    }

    /// Run one lane's portion of the step and return the updated occlusion
    /// edge list to hand to the next lane.
    fn step_lane<R: Rng, O: StepObserver>(
        &mut self,
        rng: &mut R,
        lane: usize,
        measurements: &[IntervalMeasurement],
        incoming_edges: OcclusionEdges,
        observer: &mut O,
    ) -> OcclusionEdges {
        let params = &self.params;
        let road_len = params.road.road_len;
        let state = &mut self.lanes[lane];
        let direction = state.direction;
        let particles = &mut state.particles;

        particles.predict();
        particles.apply_survival(road_len);
        observer.on_predicted(lane, particles);

        // Replenish births only when the entrance zone has drained.
        if particles.entrance_coverage(direction, road_len) < params.coverage_threshold {
            let summary = resample_with_birth(
                rng,
                particles,
                lane,
                direction,
                road_len,
                &params.birth,
            );
            observer.on_resampled(lane, &summary);
        }

        // Project the nearer lanes' occlusion intervals onto this lane's
        // depth; this lane blocks against that projection, while the
        // version including this lane's own measurements is what the next
        // lane receives.
        let blocking = if lane == 0 {
            OcclusionEdges::new()
        } else {
            incoming_edges.rescaled(params.road.depth_ratio(lane))
        };
        let mut updated = blocking.clone();
        for m in measurements {
            updated.insert_interval(m);
        }

        // Nothing to associate: keep post-survival weights as-is.
        if particles.num_objects() == 0 || measurements.is_empty() {
            return updated;
        }

        let n = particles.len();
        let m_count = measurements.len();
        let noise_std = params.sensor.likelihood_noise_std();
        let (left_end, right_end) = extents_all(&particles.states);

        // Detection-weighted existence mass per particle.
        let detect = params.sensor.detection_probability * DETECTION_DERATE;
        let sample_detect: DVector<f64> = &particles.weights * detect;

        // Likelihood-weighted mass per particle and measurement.
        let mut sample_measurement = DMatrix::zeros(n, m_count);
        for (j, m) in measurements.iter().enumerate() {
            for i in 0..n {
                sample_measurement[(i, j)] = sample_detect[i]
                    * interval_likelihood(left_end[i], right_end[i], m, noise_std);
            }
        }

        // Detection mass discounted by the probability the particle's
        // extent is hidden inside a known occlusion interval.
        let mut not_blocked = DVector::zeros(n);
        for i in 0..n {
            not_blocked[i] = blocking.visibility_factor(left_end[i], right_end[i], noise_std)
                * sample_detect[i];
        }

        // Aggregate per object.
        let ranges: Vec<(usize, usize)> = particles.object_ranges().collect();
        let objects = ranges.len();
        let mut object_measurement = DMatrix::zeros(objects, m_count);
        let mut object_miss = DVector::zeros(objects);
        for (o, &(start, end)) in ranges.iter().enumerate() {
            object_miss[o] = 1.0 - not_blocked.rows_range(start..end).sum();
            for j in 0..m_count {
                object_measurement[(o, j)] =
                    sample_measurement.column(j).rows_range(start..end).sum();
            }
        }

        // False-positive affinity: an occluded corner's likelihood under
        // the clutter model scales with its uncertainty span.
        let fp_scale =
            params.sensor.false_positive_rate / params.road.lanes as f64 * FALSE_POSITIVE_INFLATION;
        let measurement_false_positive = DVector::from_fn(m_count, |j, _| {
            let m = &measurements[j];
            let left_span = if m.left.visible { 1.0 } else { m.left.span() };
            let right_span = if m.right.visible { 1.0 } else { m.right.span() };
            left_span / road_len / 2.0 * (right_span / road_len / 2.0) * fp_scale
        });

        let input = AssociationInput {
            object_measurement,
            object_miss,
            measurement_false_positive,
        };
        let result = joint_association(&input, params.jam_iterations);
        observer.on_associated(lane, &input, &result);
        let ratios = match_ratios(&result, &input);

        // Weight update: each particle keeps its share of the matched
        // measurement mass plus its share of the miss mass, both scaled by
        // the object-level association ratios.
        for (o, &(start, end)) in ranges.iter().enumerate() {
            for i in start..end {
                let mut matched = 0.0;
                for j in 0..m_count {
                    matched += sample_measurement[(i, j)] * ratios.object_measurement[(o, j)];
                }
                let missed = (particles.weights[i] - not_blocked[i]) * ratios.object_miss[o];
                particles.weights[i] = matched + missed;
            }
        }
        particles.assert_weights_finite(lane, "weight update");
        observer.on_weights_updated(lane, particles);

        updated
    }
}
