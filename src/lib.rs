/*!
# Lanetrack - Occlusion-aware roadway multi-object tracking

Rust implementation of a multi-object particle filter for a multi-lane
roadway observed through partially occluding interval sensors.

## Features

- Per-lane weighted particle clouds partitioned into object hypotheses
- Birth/death resampling with cardinality control
- Occlusion-interval bookkeeping propagated geometrically between lanes
- Censored-Gaussian interval likelihoods under corner-visibility ambiguity
- Joint object-to-measurement association via iterative proportional fitting

## Modules

- [`filter`] - Step orchestration across lanes
- [`particles`] - Per-lane particle sets and the object partition
- [`resample`] - Birth/death resampling
- [`occlusion`] - Occlusion edge tracking
- [`likelihood`] - Geometry and censored-Gaussian likelihood kernel
- [`association`] - Joint association solver
- [`reporter`] - Point-estimate extraction
- [`scenario`] - Deterministic scenario generation for tests and benches
- [`common`] - Low-level utilities

## Example

```rust,no_run
use lanetrack::{FilterParams, IntervalMeasurement, RoadFilter, SimpleRng};

// Create filter configuration
let params = FilterParams::builder().particles(1024).build().unwrap();
let mut filter = RoadFilter::new(params).unwrap();

// Process measurements
let mut rng = SimpleRng::new(42);
let measurements = vec![IntervalMeasurement::fully_visible(0, -2.0, 3.0)];
let estimates = filter.step(&mut rng, &measurements).unwrap();
for e in &estimates {
    println!("lane {}: pos {:.2} len {:.2} speed {:.2}", e.lane, e.position, e.length, e.speed);
}
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Joint object-to-measurement association (iterative proportional fitting)
pub mod association;

/// Low-level utilities (constants, RNG, scalar Gaussian helpers)
pub mod common;

/// Configuration types and builders
pub mod config;

/// Error types
pub mod error;

/// Filter step orchestration
pub mod filter;

/// Geometry and censored-Gaussian likelihood kernel
pub mod likelihood;

/// Observability hooks for filter execution
pub mod observer;

/// Per-lane occlusion interval bookkeeping
pub mod occlusion;

/// Per-lane weighted particle sets
pub mod particles;

/// Point-estimate extraction
pub mod reporter;

/// Birth/death resampling
pub mod resample;

/// Deterministic scenario generation for tests and benchmarks
pub mod scenario;

/// Core measurement and estimate types
pub mod types;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use types::{CornerReading, IntervalMeasurement, ObjectEstimate};

// Configuration
pub use config::{BirthModel, FilterConfigSnapshot, FilterParams, RoadModel, SensorModel};

// Errors
pub use error::FilterError;

// Filter
pub use filter::{LaneFilterState, RoadFilter};

// Components
pub use association::{AssociationInput, JointAssociation, MatchRatios};
pub use occlusion::OcclusionEdges;
pub use particles::LaneParticles;
pub use resample::ResampleSummary;

// Observability
pub use observer::{NoOpObserver, StepObserver};

// RNG
pub use common::rng::{Rng, SimpleRng};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
