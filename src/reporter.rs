//! Point-estimate extraction from existence-weighted particle clouds
//!
//! Every object hypothesis whose existence mass clears the reporting
//! threshold is condensed into a weighted-mean state estimate; objects
//! below threshold are silently omitted, which is the steady-state for
//! entrance birth clouds that have not yet locked onto a measurement.

use crate::particles::LaneParticles;
use crate::types::ObjectEstimate;

/// Extract estimates for one lane.
///
/// The mean is taken over the object's particle range using the existence
/// weights as the averaging measure, normalized by the total existence
/// mass of the range.
pub fn report(particles: &LaneParticles, lane: usize, min_existence: f64) -> Vec<ObjectEstimate> {
    let mut estimates = Vec::new();

    for (start, end) in particles.object_ranges() {
        let existence = particles.existence_mass(start, end);
        if existence < min_existence {
            continue;
        }

        let mut mean = [0.0f64; 3];
        for i in start..end {
            let w = particles.weights[i];
            for (d, m) in mean.iter_mut().enumerate() {
                *m += particles.states[(i, d)] * w;
            }
        }
        for m in mean.iter_mut() {
            *m /= existence;
        }

        estimates.push(ObjectEstimate {
            lane,
            position: mean[0],
            length: mean[1],
            speed: mean[2],
            existence,
        });
    }

    estimates
}
