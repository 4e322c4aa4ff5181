//! Particle filter tracker lifecycle.
//!
//! The tracker owns the filter and its belief, turns each incoming depth
//! image into a single point estimate, and adapts the per-frame evaluation
//! budget with an exponential moving average of the convergence cost the
//! filter reports.

use std::sync::Arc;

use nalgebra::DVector;
use rand::Rng;

use crate::common::stats::moving_average;
use crate::filter::{Belief, CoordinateParticleFilter, FilterError};
use crate::model::camera::{CameraData, DepthImage};
use crate::model::object::ObjectModel;

/// Hard cap on coordinate sweeps per frame. A mismatched observation model
/// must not spin the tracker; convergence normally stops far earlier.
const MAX_UPDATE_PASSES: usize = 8;

/// Stateful tracking service around the coordinate particle filter.
///
/// Not safe for concurrent use: `initialize` and `track` must be externally
/// serialized per instance.
pub struct ParticleTracker {
    filter: CoordinateParticleFilter,
    object_model: Arc<ObjectModel>,
    camera_data: Arc<CameraData>,
    base_evaluation_count: usize,
    evaluation_count: usize,
    moving_average_update_rate: f64,
}

impl ParticleTracker {
    /// Assemble a tracker. Use [`TrackerBuilder`](crate::TrackerBuilder)
    /// instead of calling this directly; the builder validates the
    /// parameters and model dimensions.
    pub(crate) fn new(
        filter: CoordinateParticleFilter,
        object_model: Arc<ObjectModel>,
        camera_data: Arc<CameraData>,
        evaluation_count: usize,
        moving_average_update_rate: f64,
    ) -> Self {
        Self {
            filter,
            object_model,
            camera_data,
            base_evaluation_count: evaluation_count,
            evaluation_count,
            moving_average_update_rate,
        }
    }

    /// Seed the belief from the given initial states and return the point
    /// estimate.
    ///
    /// The belief is resampled to the configured evaluation count and the
    /// adaptive budget is reset to its configured starting value.
    pub fn initialize<R: Rng>(
        &mut self,
        rng: &mut R,
        initial_states: &[DVector<f64>],
    ) -> Result<DVector<f64>, FilterError> {
        self.filter.initialize(initial_states)?;
        self.filter.resample(rng, self.base_evaluation_count)?;
        self.evaluation_count = self.base_evaluation_count;

        log::info!(
            "tracker initialized for '{}' from {} seeds, {} particles",
            self.object_model.name(),
            initial_states.len(),
            self.base_evaluation_count
        );
        Ok(self.filter.weighted_mean())
    }

    /// Process one depth image and return the updated point estimate.
    ///
    /// Runs coordinate sweeps until the filter's KL signal reports
    /// convergence (or the pass cap is hit), then folds the observed cost
    /// into the moving-average evaluation budget for the next frame. On
    /// error the stored belief is exactly as it was before the call.
    pub fn track<R: Rng>(
        &mut self,
        rng: &mut R,
        observation: &DepthImage,
    ) -> Result<DVector<f64>, FilterError> {
        if !self.filter.is_initialized() {
            return Err(FilterError::NotInitialized);
        }

        let snapshot = self.filter.belief().clone();

        // Spend the current budget as the particle count for this frame.
        if self.filter.belief().len() != self.evaluation_count {
            self.filter.resample(rng, self.evaluation_count)?;
        }

        let mut passes = 0;
        let mut kl;
        loop {
            passes += 1;
            let report = match self.filter.update(rng, observation) {
                Ok(report) => report,
                Err(e) => {
                    self.filter.restore_belief(snapshot);
                    return Err(e);
                }
            };
            kl = report.kl_divergence;
            if report.converged || passes >= MAX_UPDATE_PASSES {
                break;
            }
        }

        // Convergence cost in units of the configured baseline: one clean
        // pass pulls the budget back toward the baseline, extra passes grow
        // it for the next frame.
        let observed_cost = passes * self.base_evaluation_count;
        let previous = self.evaluation_count;
        self.evaluation_count = moving_average(
            previous,
            observed_cost,
            self.moving_average_update_rate,
        );

        log::debug!(
            "frame tracked in {} pass(es), kl {:.4}, budget {} -> {}",
            passes,
            kl,
            previous,
            self.evaluation_count
        );
        Ok(self.filter.weighted_mean())
    }

    /// Current adaptive evaluation budget.
    pub fn evaluation_count(&self) -> usize {
        self.evaluation_count
    }

    /// Current belief (panics before initialization).
    pub fn belief(&self) -> &Belief {
        self.filter.belief()
    }

    /// The sampling block partition the filter sweeps over.
    pub fn sampling_blocks(&self) -> &crate::filter::SamplingBlocks {
        self.filter.sampling_blocks()
    }

    /// The tracked object description.
    pub fn object_model(&self) -> &Arc<ObjectModel> {
        &self.object_model
    }

    /// Camera context handle (opaque to this core).
    pub fn camera_data(&self) -> &Arc<CameraData> {
        &self.camera_data
    }
}
