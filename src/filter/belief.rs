//! Weighted particle set (the filter's belief).
//!
//! A [`Belief`] is an immutable snapshot: the filter builds a new one at the
//! end of every successful update instead of mutating the previous one, so a
//! failed update can always fall back to the last good belief.

use nalgebra::DVector;
use rand::Rng;

use crate::common::stats::{effective_sample_size, kl_to_uniform, weighted_mean};

use super::errors::FilterError;

/// One weighted state hypothesis.
#[derive(Debug, Clone)]
pub struct Particle {
    /// State vector
    pub state: DVector<f64>,
    /// Normalized weight
    pub weight: f64,
}

/// Weighted particle approximation of the posterior over object state.
///
/// Invariant: weights are non-negative and sum to 1.
#[derive(Debug, Clone)]
pub struct Belief {
    states: Vec<DVector<f64>>,
    weights: Vec<f64>,
}

impl Belief {
    /// Build a uniform-weight belief, one particle per seed state.
    ///
    /// Fails with [`FilterError::EmptyInitialization`] on an empty seed set
    /// and with [`FilterError::DimensionMismatch`] on ragged seed dimensions.
    pub fn uniform(states: Vec<DVector<f64>>) -> Result<Self, FilterError> {
        if states.is_empty() {
            return Err(FilterError::EmptyInitialization);
        }
        let dim = states[0].len();
        for state in &states {
            if state.len() != dim {
                return Err(FilterError::DimensionMismatch {
                    expected: dim,
                    actual: state.len(),
                    context: "seed state".to_string(),
                });
            }
        }
        let n = states.len();
        Ok(Self {
            states,
            weights: vec![1.0 / n as f64; n],
        })
    }

    /// Build a belief from states and already-normalized weights.
    ///
    /// Callers are responsible for normalization; this is crate-internal so
    /// the invariant cannot be broken from outside.
    pub(crate) fn from_normalized(states: Vec<DVector<f64>>, weights: Vec<f64>) -> Self {
        debug_assert_eq!(states.len(), weights.len());
        debug_assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        Self { states, weights }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when the belief holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The particle states.
    pub fn states(&self) -> &[DVector<f64>] {
        &self.states
    }

    /// The normalized particle weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Iterate over (state, weight) pairs.
    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        self.states
            .iter()
            .zip(self.weights.iter())
            .map(|(state, weight)| Particle {
                state: state.clone(),
                weight: *weight,
            })
    }

    /// Weighted mean of the particle states (the point estimate).
    pub fn weighted_mean(&self) -> DVector<f64> {
        weighted_mean(&self.states, &self.weights)
    }

    /// Effective sample size: N for uniform weights, 1 when degenerate.
    pub fn effective_sample_size(&self) -> f64 {
        effective_sample_size(&self.weights)
    }

    /// KL divergence of the weights from uniform (degeneracy signal).
    pub fn kl_to_uniform(&self) -> f64 {
        kl_to_uniform(&self.weights)
    }

    /// Draw a fresh `count`-particle uniform-weight belief by systematic
    /// resampling according to the current weights.
    pub fn resample<R: Rng>(&self, rng: &mut R, count: usize) -> Self {
        debug_assert!(count > 0);
        let indices = systematic_indices(rng, &self.weights, count);
        let states = indices
            .iter()
            .map(|&i| self.states[i].clone())
            .collect::<Vec<_>>();
        Self {
            states,
            weights: vec![1.0 / count as f64; count],
        }
    }
}

/// Systematic resampling: pick `count` indices proportional to `weights`
/// using a single uniform offset and evenly spaced positions.
///
/// Lower variance than multinomial resampling and O(N + count).
pub(crate) fn systematic_indices<R: Rng>(
    rng: &mut R,
    weights: &[f64],
    count: usize,
) -> Vec<usize> {
    debug_assert!(!weights.is_empty());
    let step = 1.0 / count as f64;
    let offset: f64 = rng.gen::<f64>() * step;

    let mut indices = Vec::with_capacity(count);
    let mut cumulative = weights[0];
    let mut i = 0;
    for k in 0..count {
        let position = offset + k as f64 * step;
        while position > cumulative && i + 1 < weights.len() {
            i += 1;
            cumulative += weights[i];
        }
        indices.push(i);
    }
    indices
}
