//! Tracker assembly.
//!
//! [`TrackerBuilder`] wires the transition and observation sub-builders, the
//! shared object/camera data and the filter parameters into a ready
//! [`ParticleTracker`]. All configuration problems surface here, before any
//! tracking state exists; in particular a GPU-only observation backend on a
//! non-GPU build fails the `build` call rather than the first update.

use std::sync::Arc;

use serde::Serialize;

use crate::filter::{BuildError, CoordinateParticleFilter, SamplingBlocks};
use crate::model::camera::CameraData;
use crate::model::object::ObjectModel;
use crate::model::observation::ObservationModelBuilder;
use crate::model::transition::TransitionBuilder;

use super::object_tracker::ParticleTracker;

/// Filter and budget parameters.
#[derive(Debug, Clone, Serialize)]
pub struct Parameters {
    /// Initial (and baseline) number of per-step likelihood evaluations;
    /// also the particle count the belief is resampled to. Must be > 0.
    pub evaluation_count: usize,
    /// Moving-average rate for the adaptive evaluation budget, in (0, 1].
    pub moving_average_update_rate: f64,
    /// KL-divergence threshold of the filter's convergence signal. Must be
    /// > 0.
    pub max_kl_divergence: f64,
}

impl Parameters {
    fn validate(&self) -> Result<(), BuildError> {
        if self.evaluation_count == 0 {
            return Err(BuildError::Configuration {
                description: "evaluation_count must be positive".to_string(),
            });
        }
        if !(self.moving_average_update_rate > 0.0 && self.moving_average_update_rate <= 1.0) {
            return Err(BuildError::Configuration {
                description: format!(
                    "moving_average_update_rate must be in (0, 1], got {}",
                    self.moving_average_update_rate
                ),
            });
        }
        if !(self.max_kl_divergence > 0.0) {
            return Err(BuildError::Configuration {
                description: format!(
                    "max_kl_divergence must be positive, got {}",
                    self.max_kl_divergence
                ),
            });
        }
        Ok(())
    }
}

/// Strategy computing the sampling block partition from
/// `(part_count, noise_dimension)`. Injectable so tests can substitute a
/// custom partition without subclass-style overriding.
pub type BlockStrategy = Box<dyn Fn(usize, usize) -> Result<SamplingBlocks, BuildError>>;

/// Builder assembling a [`ParticleTracker`] from sub-builders and
/// parameters. Pure construction logic; holds no runtime state.
pub struct TrackerBuilder<T, O>
where
    T: TransitionBuilder,
    O: ObservationModelBuilder,
{
    transition_builder: T,
    observation_builder: O,
    object_model: Arc<ObjectModel>,
    camera_data: Arc<CameraData>,
    params: Parameters,
    block_strategy: BlockStrategy,
}

impl<T, O> TrackerBuilder<T, O>
where
    T: TransitionBuilder,
    O: ObservationModelBuilder,
{
    /// Create a builder from its sub-builders, shared models and parameters.
    pub fn new(
        transition_builder: T,
        observation_builder: O,
        object_model: Arc<ObjectModel>,
        camera_data: Arc<CameraData>,
        params: Parameters,
    ) -> Self {
        Self {
            transition_builder,
            observation_builder,
            object_model,
            camera_data,
            params,
            block_strategy: Box::new(SamplingBlocks::for_noise_dimension),
        }
    }

    /// Replace the default contiguous per-part block partition.
    pub fn with_block_strategy(
        mut self,
        strategy: impl Fn(usize, usize) -> Result<SamplingBlocks, BuildError> + 'static,
    ) -> Self {
        self.block_strategy = Box::new(strategy);
        self
    }

    /// Build the tracker.
    ///
    /// Fails with [`BuildError::Configuration`] on invalid parameters or a
    /// zero part count, [`BuildError::GpuUnavailable`] when the observation
    /// sub-builder requires missing GPU support, and
    /// [`BuildError::InvalidDimension`] when the transition model's noise
    /// dimension does not partition evenly across the object's parts.
    pub fn build(&self) -> Result<ParticleTracker, BuildError> {
        self.params.validate()?;

        let part_count = self.object_model.part_count();
        if part_count == 0 {
            return Err(BuildError::Configuration {
                description: format!(
                    "object model '{}' has no parts",
                    self.object_model.name()
                ),
            });
        }

        let transition = self.transition_builder.build()?;
        let observation = self.observation_builder.build()?;

        let blocks = (self.block_strategy)(part_count, transition.noise_dimension())?;

        let filter = CoordinateParticleFilter::new(
            transition,
            observation,
            blocks,
            self.params.max_kl_divergence,
        );

        Ok(ParticleTracker::new(
            filter,
            self.object_model.clone(),
            self.camera_data.clone(),
            self.params.evaluation_count,
            self.params.moving_average_update_rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::observation::{DepthPixelModelBuilder, ObservationBackend};
    use crate::model::transition::BrownianTransitionBuilder;
    use nalgebra::DMatrix;

    fn camera() -> Arc<CameraData> {
        Arc::new(CameraData::new(8, 8, DMatrix::identity(3, 3)))
    }

    fn params() -> Parameters {
        Parameters {
            evaluation_count: 100,
            moving_average_update_rate: 0.5,
            max_kl_divergence: 1.0,
        }
    }

    #[test]
    fn test_build_single_object() {
        let object = Arc::new(ObjectModel::new("box", 1, 6));
        let builder = TrackerBuilder::new(
            BrownianTransitionBuilder::new(6),
            DepthPixelModelBuilder::new(camera()),
            object,
            camera(),
            params(),
        );

        let tracker = builder.build().unwrap();
        assert_eq!(tracker.evaluation_count(), 100);
        assert_eq!(tracker.object_model().part_count(), 1);
    }

    #[test]
    fn test_gpu_backend_fails_at_build_time() {
        let object = Arc::new(ObjectModel::new("box", 1, 6));
        let builder = TrackerBuilder::new(
            BrownianTransitionBuilder::new(6),
            DepthPixelModelBuilder::new(camera()).with_backend(ObservationBackend::Gpu),
            object,
            camera(),
            params(),
        );

        assert!(matches!(
            builder.build(),
            Err(BuildError::GpuUnavailable { .. })
        ));
    }

    #[test]
    fn test_indivisible_noise_dimension_fails() {
        // 3 parts cannot split a 10-dimensional noise vector.
        let object = Arc::new(ObjectModel::new("arm", 3, 6));
        let builder = TrackerBuilder::new(
            BrownianTransitionBuilder::new(10),
            DepthPixelModelBuilder::new(camera()),
            object,
            camera(),
            params(),
        );

        assert!(matches!(
            builder.build(),
            Err(BuildError::InvalidDimension {
                part_count: 3,
                noise_dimension: 10,
            })
        ));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let object = Arc::new(ObjectModel::new("box", 1, 6));
        let cases = [
            Parameters {
                evaluation_count: 0,
                ..params()
            },
            Parameters {
                moving_average_update_rate: 0.0,
                ..params()
            },
            Parameters {
                moving_average_update_rate: 1.5,
                ..params()
            },
            Parameters {
                max_kl_divergence: 0.0,
                ..params()
            },
        ];

        for p in cases {
            let builder = TrackerBuilder::new(
                BrownianTransitionBuilder::new(6),
                DepthPixelModelBuilder::new(camera()),
                object.clone(),
                camera(),
                p,
            );
            assert!(matches!(
                builder.build(),
                Err(BuildError::Configuration { .. })
            ));
        }
    }

    #[test]
    fn test_zero_part_object_rejected() {
        let object = Arc::new(ObjectModel::new("nothing", 0, 6));
        let builder = TrackerBuilder::new(
            BrownianTransitionBuilder::new(6),
            DepthPixelModelBuilder::new(camera()),
            object,
            camera(),
            params(),
        );
        assert!(matches!(
            builder.build(),
            Err(BuildError::Configuration { .. })
        ));
    }

    #[test]
    fn test_injected_block_strategy_is_used() {
        let object = Arc::new(ObjectModel::new("box", 1, 6));
        let builder = TrackerBuilder::new(
            BrownianTransitionBuilder::new(6),
            DepthPixelModelBuilder::new(camera()),
            object,
            camera(),
            params(),
        )
        .with_block_strategy(|_parts, _dim| SamplingBlocks::partition(2, 3));

        let tracker = builder.build().unwrap();
        // The custom partition split the 6 noise dimensions into two blocks.
        assert_eq!(tracker.sampling_blocks().len(), 2);
        assert_eq!(tracker.sampling_blocks().block_size(), 3);
    }
}
