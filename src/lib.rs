/*!
# rbc-particle-filter - Depth-based object tracking

Rust implementation of the Rao-Blackwellized coordinate particle filter
(RBC-PF) for tracking the pose of rigid and articulated objects from a
stream of depth-camera images.

## Features

- Coordinate (blocked) particle filter: the process-noise dimensions are
  partitioned into one sampling block per tracked object part, and each
  block is proposed and weighted in its own pass within a time step
- Adaptive per-frame evaluation budget driven by a KL-divergence
  convergence signal and a moving-average controller
- Pluggable transition and observation models behind trait seams

## Modules

- [`tracker`] - Tracker lifecycle and builder
- [`filter`] - Coordinate particle filter, belief, sampling blocks, errors
- [`model`] - Object/camera data and the transition/observation model traits
- [`common`] - Low-level utilities (log-space numerics, RNG)

## Example

```rust,no_run
use rbc_particle_filter::{
    BrownianTransitionBuilder, DepthPixelModelBuilder, ObjectModel, CameraData,
    Parameters, TrackerBuilder,
};
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

let object_model = Arc::new(ObjectModel::new("box", 1, 6));
let camera_data = Arc::new(CameraData::new(64, 48, DMatrix::identity(3, 3)));

let transition = BrownianTransitionBuilder::new(6).with_noise_std(0.01);
let observation = DepthPixelModelBuilder::new(camera_data.clone())
    .with_body_noise_std(0.02);

let params = Parameters {
    evaluation_count: 200,
    moving_average_update_rate: 0.5,
    max_kl_divergence: 1.0,
};

let mut tracker = TrackerBuilder::new(
    transition, observation, object_model, camera_data, params,
)
.build()
.unwrap();

let mut rng = rand::thread_rng();
let seeds = vec![DVector::zeros(6); 50];
let estimate = tracker.initialize(&mut rng, &seeds).unwrap();
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Tracker lifecycle: the stateful service wrapping the filter, plus its
/// builder
pub mod tracker;

/// Coordinate particle filter mechanics: belief, sampling blocks, update loop
pub mod filter;

/// Model abstractions: object/camera data, transition and observation models
pub mod model;

/// Low-level utilities (log-space numerics, deterministic RNG)
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use filter::{
    Belief, CoordinateParticleFilter, Particle, SamplingBlocks, UpdateReport,
};

// Errors
pub use filter::{BuildError, FilterError};

// Models
pub use model::{
    BrownianTransition, BrownianTransitionBuilder, CameraData, DepthImage,
    DepthPixelModel, DepthPixelModelBuilder, ObjectModel, ObservationBackend,
    ObservationModel, ObservationModelBuilder, TransitionBuilder, TransitionModel,
};

// Tracker
pub use tracker::{Parameters, ParticleTracker, TrackerBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
