//! Per-lane weighted particle set partitioned into object hypotheses
//!
//! The particle budget is fixed: `states` is an `N x 3` matrix of
//! `(position, length, speed)` rows with a parallel weight vector whose sum
//! approximates the expected object count (an unnormalized, probability
//! hypothesis density style representation). `boundaries` is a strictly
//! increasing index sequence ending at `N`; consecutive pairs delimit the
//! contiguous particle range of one logical object hypothesis.

use nalgebra::{DMatrix, DVector};

use crate::common::constants::{SURVIVAL_OFF_ROAD, SURVIVAL_ON_ROAD};

/// Column index of the position coordinate.
pub const COL_POSITION: usize = 0;
/// Column index of the length coordinate.
pub const COL_LENGTH: usize = 1;
/// Column index of the speed coordinate.
pub const COL_SPEED: usize = 2;

/// Weighted particle cloud for one lane.
#[derive(Debug, Clone)]
pub struct LaneParticles {
    /// `N x 3` particle states: position, length, speed
    pub states: DMatrix<f64>,
    /// Parallel non-negative weights; the sum is the expected cardinality
    pub weights: DVector<f64>,
    /// Strictly increasing object range boundaries, last entry == `N`
    pub boundaries: Vec<usize>,
}

impl LaneParticles {
    /// Empty particle set: all states and weights zero, no objects.
    pub fn new(n: usize) -> Self {
        Self {
            states: DMatrix::zeros(n, 3),
            weights: DVector::zeros(n),
            boundaries: vec![n],
        }
    }

    /// Fixed particle budget.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.nrows()
    }

    /// True when the budget is zero (never the case in a configured filter).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of logical object hypotheses.
    #[inline]
    pub fn num_objects(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// Iterator over per-object index ranges `[start, end)`.
    pub fn object_ranges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.boundaries
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
    }

    /// Expected object count: the total weight mass.
    #[inline]
    pub fn cardinality(&self) -> f64 {
        self.weights.sum()
    }

    /// Existence mass of one object range.
    pub fn existence_mass(&self, start: usize, end: usize) -> f64 {
        self.weights.rows_range(start..end).sum()
    }

    /// Constant-velocity prediction: every particle's position advances by
    /// its own speed. No branching, one step per call.
    pub fn predict(&mut self) {
        let n = self.len();
        for i in 0..n {
            self.states[(i, COL_POSITION)] += self.states[(i, COL_SPEED)];
        }
    }

    /// Survival weighting: a cliff-edge existence decay. Weight is scaled
    /// by a high survival probability while the particle's extent remains
    /// within the modeled road, and a low one once it has exited.
    pub fn apply_survival(&mut self, road_len: f64) {
        let n = self.len();
        for i in 0..n {
            let inside =
                self.states[(i, COL_POSITION)].abs() - self.states[(i, COL_LENGTH)] < road_len;
            self.weights[i] *= if inside {
                SURVIVAL_ON_ROAD
            } else {
                SURVIVAL_OFF_ROAD
            };
        }
    }

    /// Existence mass still sitting in the entrance zone: particles whose
    /// trailing extent has not yet fully entered the road from the
    /// direction-of-travel entrance.
    pub fn entrance_coverage(&self, direction: f64, road_len: f64) -> f64 {
        let n = self.len();
        let mut covered = 0.0;
        for i in 0..n {
            let trailing_overhang =
                -self.states[(i, COL_POSITION)] * direction + self.states[(i, COL_LENGTH)];
            if trailing_overhang > road_len {
                covered += self.weights[i];
            }
        }
        covered
    }

    /// Check the boundary partition invariant. Used by debug assertions
    /// and tests; violations indicate a resampler bug.
    pub fn boundaries_valid(&self) -> bool {
        if self.boundaries.last() != Some(&self.len()) {
            return false;
        }
        self.boundaries.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Panic if any weight is NaN or infinite, carrying lane context.
    /// A non-finite weight is a modeling bug and aborts the run.
    pub fn assert_weights_finite(&self, lane: usize, context: &str) {
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            panic!(
                "non-finite weight {} at particle {} on lane {} after {}",
                self.weights[i], i, lane, context
            );
        }
    }
}
