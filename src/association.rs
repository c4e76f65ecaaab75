//! Joint object-to-measurement association via iterative proportional fitting
//!
//! Given an object x measurement affinity matrix plus per-object miss
//! affinity and per-measurement false-positive affinity, the solver
//! produces a doubly-normalized joint assignment: entrywise proportional
//! to the affinities, with every object row (including its miss mass) and
//! every measurement column (including its false-positive mass) summing to
//! one. Structurally this is a Sinkhorn-style fixed point over an
//! augmented matrix whose dustbin row and column absorb the "no match"
//! outcomes.
//!
//! The iteration count is fixed and not convergence-checked; numerical
//! behavior depends on the exact count, so it is part of the contract.

use nalgebra::{DMatrix, DVector};

use crate::common::constants::AFFINITY_GUARD;

/// Affinity inputs for one lane's association problem.
#[derive(Debug, Clone)]
pub struct AssociationInput {
    /// Non-negative object x measurement affinities
    pub object_measurement: DMatrix<f64>,
    /// Per-object affinity for being missed (undetected or blocked)
    pub object_miss: DVector<f64>,
    /// Per-measurement affinity for being a false positive
    pub measurement_false_positive: DVector<f64>,
}

/// Doubly-normalized joint assignment.
#[derive(Debug, Clone)]
pub struct JointAssociation {
    /// Joint object x measurement probabilities
    pub joint: DMatrix<f64>,
    /// Per-object normalized miss probabilities
    pub miss: DVector<f64>,
}

/// Multipliers relating the joint assignment back to the raw affinities,
/// applied to particle weights during the update stage.
#[derive(Debug, Clone)]
pub struct MatchRatios {
    /// Per-(object, measurement) weight multipliers
    pub object_measurement: DMatrix<f64>,
    /// Per-object miss multipliers
    pub object_miss: DVector<f64>,
}

/// Run the fixed-point normalization for `iterations` rounds.
///
/// Each round rescales rows by their sum including the miss affinity,
/// then columns by their sum including the false-positive affinity. The
/// update divides the original affinity by the complementary sum
/// (`rowsum - m`) so the mass already assigned to a cell is not counted
/// against itself.
pub fn joint_association(input: &AssociationInput, iterations: usize) -> JointAssociation {
    let a = &input.object_measurement;
    let (rows, cols) = a.shape();
    debug_assert_eq!(input.object_miss.len(), rows);
    debug_assert_eq!(input.measurement_false_positive.len(), cols);

    let mut m = a.clone();
    for _ in 0..iterations {
        for i in 0..rows {
            let row_sum: f64 = m.row(i).sum() + input.object_miss[i];
            for j in 0..cols {
                m[(i, j)] = a[(i, j)] / (row_sum - m[(i, j)]);
            }
        }
        for j in 0..cols {
            let col_sum: f64 = m.column(j).sum() + input.measurement_false_positive[j];
            for i in 0..rows {
                m[(i, j)] = a[(i, j)] / (col_sum - m[(i, j)]);
            }
        }
    }

    let mut joint = DMatrix::zeros(rows, cols);
    let mut miss = DVector::zeros(rows);
    for i in 0..rows {
        let row_sum: f64 = m.row(i).sum() + input.object_miss[i];
        for j in 0..cols {
            joint[(i, j)] = m[(i, j)] / row_sum;
        }
        miss[i] = input.object_miss[i] / row_sum;
    }

    JointAssociation { joint, miss }
}

/// Divide the joint assignment by the raw affinities, guarding near-zero
/// affinities by leaving the multiplier at identity.
pub fn match_ratios(joint: &JointAssociation, input: &AssociationInput) -> MatchRatios {
    let (rows, cols) = joint.joint.shape();
    let mut object_measurement = DMatrix::from_element(rows, cols, 1.0);
    let mut object_miss = DVector::from_element(rows, 1.0);

    for i in 0..rows {
        for j in 0..cols {
            let affinity = input.object_measurement[(i, j)];
            if affinity > AFFINITY_GUARD {
                object_measurement[(i, j)] = joint.joint[(i, j)] / affinity;
            }
        }
        if input.object_miss[i] > AFFINITY_GUARD {
            object_miss[i] = joint.miss[i] / input.object_miss[i];
        }
    }

    MatchRatios {
        object_measurement,
        object_miss,
    }
}
