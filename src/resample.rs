//! Birth/death resampling with cardinality control
//!
//! Triggered when the existence mass covering a lane's entrance zone runs
//! low. The fixed particle budget is split between survivors, redrawn with
//! a hybrid systematic+random scheme over the cumulative weight
//! distribution, and fresh births drawn from a uniform prior box placed
//! just beyond the entrance. All weights are then reset uniformly so the
//! total mass equals the previous cardinality plus the birth rate.

use nalgebra::DMatrix;

use crate::common::constants::{
    EXISTENCE_CEILING_GAP, SYSTEMATIC_DENOMINATOR, SYSTEMATIC_NUMERATOR,
};
use crate::common::rng::Rng;
use crate::config::BirthModel;
use crate::particles::LaneParticles;

/// What a resampling pass did, for observers and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleSummary {
    /// Total weight mass before the pass
    pub cardinality: f64,
    /// Particles redrawn from survivors
    pub resampled: usize,
    /// Freshly birthed particles
    pub birthed: usize,
}

/// Resample a lane's particle set in place, retiring excess mass and
/// replenishing the entrance zone with birth particles.
///
/// The survivor share of the budget is proportional to
/// `cardinality / (cardinality + birth_rate)`. Survivors are drawn by a
/// low-variance systematic grid over the cumulative weight distribution
/// (capped at 3/4 of the budget) topped up with independent uniform draws,
/// then jittered per dimension against particle impoverishment. Zero
/// cardinality degrades gracefully to a pure-birth pass.
///
/// # Panics
///
/// Panics if any resulting weight is non-finite; that is a fatal
/// invariant violation.
pub fn resample_with_birth<R: Rng>(
    rng: &mut R,
    particles: &mut LaneParticles,
    lane: usize,
    direction: f64,
    road_len: f64,
    birth: &BirthModel,
) -> ResampleSummary {
    let n = particles.len();

    // Cumulative distribution over the old weights. The running total is
    // used as both the cardinality and the normalizer so the final
    // cumulative entry is exactly 1.
    let mut cumulative = Vec::with_capacity(n);
    let mut total = 0.0;
    for w in particles.weights.iter() {
        total += w;
        cumulative.push(total);
    }
    let cardinality = total;
    if cardinality > 0.0 {
        for c in cumulative.iter_mut() {
            *c /= cardinality;
        }
    }

    let survivor_share = cardinality / (cardinality + birth.birth_rate);
    let n_old = (survivor_share * n as f64) as usize;

    // Hybrid draw: one systematic grid pass plus independent uniforms,
    // merged and sorted for the inverse-CDF lookup.
    let mut entries: Vec<f64> = Vec::with_capacity(n_old);
    if n_old > 0 {
        let n_fixed = n_old.min(n * SYSTEMATIC_NUMERATOR / SYSTEMATIC_DENOMINATOR);
        let step = 1.0 / n_fixed as f64;
        let offset = rng.rand() * step;
        for k in 0..n_fixed {
            entries.push(offset + k as f64 * step);
        }
        for _ in n_fixed..n_old {
            entries.push(rng.rand());
        }
        entries.sort_by(|a, b| a.partial_cmp(b).expect("resampling entries are finite"));
    }

    let index: Vec<usize> = entries
        .iter()
        .map(|&v| cumulative.partition_point(|&c| c <= v).min(n - 1))
        .collect();

    // Map the old object boundaries onto the resampled index sequence.
    // The mapping is monotone, so duplicates are adjacent and collapse
    // into a single boundary (an object whose mass was not resampled
    // disappears).
    let mut boundaries: Vec<usize> = particles
        .boundaries
        .iter()
        .map(|&b| index.partition_point(|&i| i < b))
        .collect();
    boundaries.dedup();

    // Gather survivors with per-dimension jitter.
    let mut states = DMatrix::zeros(n, 3);
    for (j, &src) in index.iter().enumerate() {
        for d in 0..3 {
            states[(j, d)] = particles.states[(src, d)] + rng.randn() * birth.jitter_std[d];
        }
    }

    // Birth the remainder uniformly over the prior box, shifted past the
    // lane's entrance; leftward lanes flip the speed sign.
    for j in n_old..n {
        let mut position = rng.uniform(0.0, birth.entrance_span);
        let length = rng.uniform(birth.min_length, birth.max_length);
        let mut speed = rng.uniform(birth.min_speed, birth.max_speed);
        if direction > 0.0 {
            position -= road_len;
        } else {
            position += road_len - birth.entrance_inset;
            speed = -speed;
        }
        states[(j, 0)] = position;
        states[(j, 1)] = length;
        states[(j, 2)] = speed;
    }

    // Uniform weight reset: total mass becomes cardinality + birth_rate.
    let uniform_weight = (cardinality + birth.birth_rate) / n as f64;
    particles.states = states;
    particles.weights.fill(uniform_weight);
    if n_old < n {
        boundaries.push(n);
    }
    particles.boundaries = boundaries;

    // Discretization can push an object's existence mass to 1, which
    // breaks the association stage's divisions. Push it back under the
    // ceiling by the minimal factor.
    let ranges: Vec<(usize, usize)> = particles.object_ranges().collect();
    for (start, end) in ranges {
        let mass = particles.existence_mass(start, end);
        let correction = ((1.0 - EXISTENCE_CEILING_GAP) / mass).min(1.0);
        if correction < 1.0 {
            for i in start..end {
                particles.weights[i] *= correction;
            }
        }
    }

    debug_assert!(particles.boundaries_valid());
    particles.assert_weights_finite(lane, "resampling");

    ResampleSummary {
        cardinality,
        resampled: n_old,
        birthed: n - n_old,
    }
}
