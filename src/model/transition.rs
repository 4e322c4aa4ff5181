//! State transition model seam and the Brownian default.
//!
//! The coordinate filter drives any model implementing [`TransitionModel`].
//! The noise vector it passes in is standard-normal on the coordinates of
//! the sampling block currently being updated and zero elsewhere; the model
//! maps it into state space. Sub-builders implement [`TransitionBuilder`] so
//! the tracker builder can assemble the model at construction time.

use nalgebra::DVector;

use crate::filter::errors::BuildError;

/// Stochastic state transition function: `state x noise x input -> state`.
pub trait TransitionModel: Send + Sync {
    /// Dimension of the state vectors the model advances. The filter rejects
    /// seed states of any other length at initialization.
    fn state_dimension(&self) -> usize;

    /// Dimension of the process-noise vector.
    fn noise_dimension(&self) -> usize;

    /// Advance a state by one time step given a noise draw and control input.
    ///
    /// Coordinates whose noise entries are zero must be carried through
    /// unchanged up to deterministic drift; the coordinate filter relies on
    /// this to hold the other blocks fixed within a sweep.
    fn apply(
        &self,
        state: &DVector<f64>,
        noise: &DVector<f64>,
        input: &DVector<f64>,
    ) -> DVector<f64>;
}

/// Sub-builder assembling a transition model at tracker construction time.
pub trait TransitionBuilder {
    /// Build the transition model. Configuration errors are fatal.
    fn build(&self) -> Result<Box<dyn TransitionModel>, BuildError>;
}

// ============================================================================
// Brownian transition
// ============================================================================

/// Brownian (random walk) object motion: each pose coordinate diffuses with
/// its own noise standard deviation, plus an optional additive control input.
///
/// `new = state + noise_std .* noise + input`
#[derive(Debug, Clone)]
pub struct BrownianTransition {
    noise_std: DVector<f64>,
}

impl BrownianTransition {
    /// Create a Brownian transition with per-coordinate noise std.
    pub fn new(noise_std: DVector<f64>) -> Self {
        Self { noise_std }
    }
}

impl TransitionModel for BrownianTransition {
    fn state_dimension(&self) -> usize {
        self.noise_std.len()
    }

    fn noise_dimension(&self) -> usize {
        self.noise_std.len()
    }

    fn apply(
        &self,
        state: &DVector<f64>,
        noise: &DVector<f64>,
        input: &DVector<f64>,
    ) -> DVector<f64> {
        let mut next = state.clone();
        for i in 0..next.len() {
            next[i] += self.noise_std[i] * noise[i];
            if input.len() == next.len() {
                next[i] += input[i];
            }
        }
        next
    }
}

/// Builder for [`BrownianTransition`].
#[derive(Debug, Clone)]
pub struct BrownianTransitionBuilder {
    state_dimension: usize,
    noise_std: f64,
}

impl BrownianTransitionBuilder {
    /// Create a builder for a `state_dimension`-dimensional random walk.
    pub fn new(state_dimension: usize) -> Self {
        Self {
            state_dimension,
            noise_std: 0.01,
        }
    }

    /// Set the shared per-coordinate noise standard deviation.
    pub fn with_noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }
}

impl TransitionBuilder for BrownianTransitionBuilder {
    fn build(&self) -> Result<Box<dyn TransitionModel>, BuildError> {
        if self.state_dimension == 0 {
            return Err(BuildError::Configuration {
                description: "transition state dimension must be positive".to_string(),
            });
        }
        if !(self.noise_std > 0.0) {
            return Err(BuildError::Configuration {
                description: format!(
                    "transition noise std must be positive, got {}",
                    self.noise_std
                ),
            });
        }
        let noise_std = DVector::from_element(self.state_dimension, self.noise_std);
        Ok(Box::new(BrownianTransition::new(noise_std)))
    }
}
