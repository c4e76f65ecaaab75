//! Observability hooks for filter execution
//!
//! The [`StepObserver`] trait receives callbacks at key points during a
//! filter step without polluting the core algorithm logic. All methods
//! have empty default implementations, so an observer only overrides the
//! events it cares about; the default [`NoOpObserver`] compiles to zero
//! overhead.

use crate::association::{AssociationInput, JointAssociation};
use crate::particles::LaneParticles;
use crate::resample::ResampleSummary;
use crate::types::ObjectEstimate;

/// Callbacks fired during filter execution.
///
/// Callbacks take `&mut self` and references to the live filter state;
/// clone inside the callback if the data needs to outlive it.
pub trait StepObserver {
    /// Called after prediction and survival weighting for a lane.
    fn on_predicted(&mut self, _lane: usize, _particles: &LaneParticles) {}

    /// Called after a resampling/birth pass ran for a lane.
    fn on_resampled(&mut self, _lane: usize, _summary: &ResampleSummary) {}

    /// Called after the association solver ran for a lane.
    fn on_associated(
        &mut self,
        _lane: usize,
        _input: &AssociationInput,
        _result: &JointAssociation,
    ) {
    }

    /// Called after particle weights were updated for a lane.
    fn on_weights_updated(&mut self, _lane: usize, _particles: &LaneParticles) {}

    /// Called once per step with the reported estimates.
    fn on_reported(&mut self, _estimates: &[ObjectEstimate]) {}
}

/// Observer that does nothing; every callback is empty and optimizes away.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl StepObserver for NoOpObserver {}
