//! Rao-Blackwellized coordinate particle filter.
//!
//! One `update` performs a coordinate-descent sweep over the sampling
//! blocks: for each block, the block's noise coordinates are proposed for
//! every particle while the other blocks' values stay fixed, the importance
//! weights are updated with the change in observation log-likelihood, and
//! the particle set is resampled when the weights degenerate. Likelihoods
//! are kept in log space throughout.

use nalgebra::DVector;
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use crate::common::stats::{effective_sample_size, kl_to_uniform, normalize_log_weights};
use crate::model::camera::DepthImage;
use crate::model::observation::ObservationModel;
use crate::model::transition::TransitionModel;

use super::belief::{systematic_indices, Belief};
use super::blocks::SamplingBlocks;
use super::errors::FilterError;

/// Diagnostics from one filter update (one full sweep over all blocks).
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Maximum KL divergence from uniform reached by the weights across the
    /// block passes, measured before any resampling reset.
    pub kl_divergence: f64,
    /// Whether the divergence stayed at or below the filter's threshold.
    /// This is a diagnostic for the tracker's budget controller; the filter
    /// itself never acts on it.
    pub converged: bool,
    /// Number of observation-likelihood evaluations spent.
    pub evaluations: usize,
    /// Number of block passes that triggered a resample.
    pub resample_count: usize,
}

/// Coordinate (blocked) particle filter over a weighted particle set.
///
/// State machine: Uninitialized until [`initialize`](Self::initialize)
/// succeeds, then Ready; [`update`](Self::update) re-enters Ready with a
/// replaced belief on success and leaves the previous belief in place on
/// failure.
pub struct CoordinateParticleFilter {
    transition: Box<dyn TransitionModel>,
    observation: Box<dyn ObservationModel>,
    blocks: SamplingBlocks,
    max_kl_divergence: f64,
    belief: Option<Belief>,
}

impl CoordinateParticleFilter {
    /// Create a filter from its models, sampling blocks and KL threshold.
    ///
    /// Model/block consistency is validated by the tracker builder; the
    /// filter itself only requires that the blocks cover the transition
    /// model's noise dimension.
    pub fn new(
        transition: Box<dyn TransitionModel>,
        observation: Box<dyn ObservationModel>,
        blocks: SamplingBlocks,
        max_kl_divergence: f64,
    ) -> Self {
        debug_assert_eq!(blocks.noise_dimension(), transition.noise_dimension());
        Self {
            transition,
            observation,
            blocks,
            max_kl_divergence,
            belief: None,
        }
    }

    /// Build the initial particle set, one uniform-weight particle per seed.
    ///
    /// Seeds must match the transition model's state dimension; a mismatch
    /// fails with [`FilterError::DimensionMismatch`] and leaves the filter
    /// uninitialized.
    pub fn initialize(&mut self, initial_states: &[DVector<f64>]) -> Result<(), FilterError> {
        let belief = Belief::uniform(initial_states.to_vec())?;
        let expected = self.transition.state_dimension();
        let actual = belief.states()[0].len();
        if actual != expected {
            return Err(FilterError::DimensionMismatch {
                expected,
                actual,
                context: "seed state".to_string(),
            });
        }
        log::debug!(
            "filter initialized with {} particles of dimension {}",
            belief.len(),
            belief.states()[0].len()
        );
        self.belief = Some(belief);
        Ok(())
    }

    /// True once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.belief.is_some()
    }

    /// The current belief.
    ///
    /// # Panics
    /// Panics when the filter is uninitialized; guard with
    /// [`is_initialized`](Self::is_initialized) if in doubt.
    pub fn belief(&self) -> &Belief {
        self.belief
            .as_ref()
            .expect("filter belief accessed before initialization")
    }

    /// The sampling block partition driving the coordinate sweep.
    pub fn sampling_blocks(&self) -> &SamplingBlocks {
        &self.blocks
    }

    /// The KL-divergence threshold the convergence signal is compared to.
    pub fn max_kl_divergence(&self) -> f64 {
        self.max_kl_divergence
    }

    /// Weighted mean of the current belief.
    pub fn weighted_mean(&self) -> DVector<f64> {
        self.belief().weighted_mean()
    }

    /// Replace the belief with a `count`-particle systematic resample.
    pub fn resample<R: Rng>(&mut self, rng: &mut R, count: usize) -> Result<(), FilterError> {
        let belief = self.belief.as_ref().ok_or(FilterError::NotInitialized)?;
        self.belief = Some(belief.resample(rng, count));
        Ok(())
    }

    pub(crate) fn restore_belief(&mut self, belief: Belief) {
        self.belief = Some(belief);
    }

    /// Run one coordinate sweep against `observation`.
    ///
    /// On success the belief is replaced and a report with the KL
    /// convergence signal is returned; on failure the previous belief is
    /// kept unchanged.
    pub fn update<R: Rng>(
        &mut self,
        rng: &mut R,
        observation: &DepthImage,
    ) -> Result<UpdateReport, FilterError> {
        let belief = self.belief.as_ref().ok_or(FilterError::NotInitialized)?;
        let n = belief.len();
        let noise_dim = self.transition.noise_dimension();
        // Control input is zero at this layer; callers feeding controls do so
        // through their transition model.
        let input = DVector::zeros(0);

        let mut states: Vec<DVector<f64>> = belief.states().to_vec();
        let mut log_weights: Vec<f64> = belief
            .weights()
            .iter()
            .map(|w| if *w > 0.0 { w.ln() } else { f64::NEG_INFINITY })
            .collect();

        // Base log-likelihoods of the incoming particles; each block pass
        // reweights by the change relative to these.
        let mut old_loglikes = self.evaluate(&states, observation);
        let mut evaluations = n;
        let mut max_kl: f64 = 0.0;
        let mut resample_count = 0;
        let mut current_weights = belief.weights().to_vec();

        for (block_index, block) in self.blocks.iter().enumerate() {
            // Propose: advance only this block's coordinates, other blocks
            // held fixed through zero noise.
            for state in states.iter_mut() {
                let mut noise = DVector::zeros(noise_dim);
                for &idx in block {
                    noise[idx] = rng.sample(StandardNormal);
                }
                *state = self.transition.apply(state, &noise, &input);
            }

            // Weight: importance update in log space.
            let new_loglikes = self.evaluate(&states, observation);
            evaluations += n;
            for i in 0..n {
                // A particle coming from an impossible region has no finite
                // importance ratio; restart its weight from the raw
                // log-likelihood. This also keeps an always-impossible
                // particle at zero weight (-inf minus -inf is NaN).
                log_weights[i] = if old_loglikes[i] == f64::NEG_INFINITY {
                    new_loglikes[i]
                } else {
                    log_weights[i] + (new_loglikes[i] - old_loglikes[i])
                };
            }
            old_loglikes = new_loglikes;

            let weights = normalize_log_weights(&log_weights).ok_or(
                FilterError::DegenerateWeights { block: block_index },
            )?;

            let kl = kl_to_uniform(&weights);
            max_kl = max_kl.max(kl);

            // Resample on weight degeneracy; weights reset to uniform.
            let ess = effective_sample_size(&weights);
            if ess < n as f64 / 2.0 {
                let indices = systematic_indices(rng, &weights, n);
                states = indices.iter().map(|&i| states[i].clone()).collect();
                old_loglikes = indices.iter().map(|&i| old_loglikes[i]).collect();
                log_weights = vec![0.0; n];
                current_weights = vec![1.0 / n as f64; n];
                resample_count += 1;
                log::trace!(
                    "block {} resampled (ess {:.1} of {}, kl {:.3})",
                    block_index,
                    ess,
                    n,
                    kl
                );
            } else {
                current_weights = weights;
            }
        }

        self.belief = Some(Belief::from_normalized(states, current_weights));

        let converged = max_kl <= self.max_kl_divergence;
        log::debug!(
            "update complete: kl {:.4} (threshold {:.4}), {} evaluations, {} resamples",
            max_kl,
            self.max_kl_divergence,
            evaluations,
            resample_count
        );

        Ok(UpdateReport {
            kl_divergence: max_kl,
            converged,
            evaluations,
            resample_count,
        })
    }

    /// Observation log-likelihood of every particle, in parallel.
    fn evaluate(&self, states: &[DVector<f64>], observation: &DepthImage) -> Vec<f64> {
        states
            .par_iter()
            .map(|state| self.observation.loglikelihood(state, observation))
            .collect()
    }
}
