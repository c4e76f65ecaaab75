//! Geometry and censored-Gaussian likelihood kernel
//!
//! Pure functions mapping a particle's `(position, length, speed)` state to
//! its spatial extents, and scoring an observed interval edge against a
//! hypothesized edge. A visible edge contributes a Gaussian density; an
//! occluded edge contributes the probability mass the Gaussian places
//! inside the reported bounds (a difference of two CDF evaluations).

use nalgebra::{DMatrix, DVector};

use crate::common::stats::{normal_pdf, standard_normal_cdf};
use crate::types::{CornerReading, IntervalMeasurement};

/// Left and right spatial extents of a particle.
///
/// The position coordinate is the leading corner in the direction of
/// travel: a rightward mover (`speed >= 0`) occupies
/// `[position - length, position]`, a leftward mover occupies
/// `[position, position + length]`.
#[inline]
pub fn extents(position: f64, length: f64, speed: f64) -> (f64, f64) {
    if speed >= 0.0 {
        (position - length, position)
    } else {
        (position, position + length)
    }
}

/// Vectorized [`extents`] over a whole particle matrix (rows are particles,
/// columns are position/length/speed).
pub fn extents_all(states: &DMatrix<f64>) -> (DVector<f64>, DVector<f64>) {
    let n = states.nrows();
    let mut left = DVector::zeros(n);
    let mut right = DVector::zeros(n);
    for i in 0..n {
        let (l, r) = extents(states[(i, 0)], states[(i, 1)], states[(i, 2)]);
        left[i] = l;
        right[i] = r;
    }
    (left, right)
}

/// Likelihood of one observed corner given a hypothesized edge position.
///
/// Never returns a negative value; far outside the reported bounds the
/// result underflows toward zero.
#[inline]
pub fn edge_likelihood(edge: f64, corner: &CornerReading, noise_std: f64) -> f64 {
    if corner.visible {
        normal_pdf(corner.lower, edge, noise_std)
    } else {
        let upper = standard_normal_cdf((corner.upper - edge) / noise_std);
        let lower = standard_normal_cdf((corner.lower - edge) / noise_std);
        (upper - lower).max(0.0)
    }
}

/// Combined likelihood of a measurement given hypothesized left and right
/// edges: the product of the two corner likelihoods.
#[inline]
pub fn interval_likelihood(
    left_edge: f64,
    right_edge: f64,
    measurement: &IntervalMeasurement,
    noise_std: f64,
) -> f64 {
    edge_likelihood(left_edge, &measurement.left, noise_std)
        * edge_likelihood(right_edge, &measurement.right, noise_std)
}
