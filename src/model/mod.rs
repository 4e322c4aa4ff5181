//! Model abstractions consumed by the filter and tracker.
//!
//! The transition and observation models are trait seams: the filter only
//! sees [`TransitionModel`] and [`ObservationModel`]. Concrete depth-sensor
//! models (GPU-rendered expected depth maps etc.) live behind the same
//! traits; this crate ships a CPU depth-pixel model sufficient for tests
//! and demos.

pub mod camera;
pub mod object;
pub mod observation;
pub mod transition;

pub use camera::{CameraData, DepthImage};
pub use object::ObjectModel;
pub use observation::{
    DepthPixelModel, DepthPixelModelBuilder, ObservationBackend, ObservationModel,
    ObservationModelBuilder,
};
pub use transition::{
    BrownianTransition, BrownianTransitionBuilder, TransitionBuilder, TransitionModel,
};
