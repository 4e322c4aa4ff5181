//! Observation model seam and a CPU depth-pixel model.
//!
//! The filter only requires [`ObservationModel::loglikelihood`]; the model
//! internals (expected-depth rendering, occlusion handling) are free to live
//! behind the trait. Construction goes through [`ObservationModelBuilder`]
//! so that a backend that needs GPU-accelerated rendering can refuse to
//! build before any tracker state exists, instead of failing inside the
//! update loop.

use std::sync::Arc;

use nalgebra::DVector;

use crate::filter::errors::BuildError;
use crate::model::camera::{CameraData, DepthImage};

/// Observation (sensor) model: log-likelihood of a depth image given a
/// candidate state.
///
/// `Send + Sync` so the filter may evaluate the particle set in parallel.
pub trait ObservationModel: Send + Sync {
    /// Log-likelihood of `observation` under the candidate `state`.
    fn loglikelihood(&self, state: &DVector<f64>, observation: &DepthImage) -> f64;
}

/// Rendering backend of an observation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationBackend {
    /// Pure CPU evaluation.
    Cpu,
    /// GPU-accelerated expected-depth rendering. Not compiled into this
    /// crate; selecting it fails at build time.
    Gpu,
}

/// Sub-builder assembling an observation model at tracker construction time.
pub trait ObservationModelBuilder {
    /// Build the observation model.
    ///
    /// Fails with [`BuildError::GpuUnavailable`] when the selected backend
    /// requires GPU rendering support that is not available.
    fn build(&self) -> Result<Box<dyn ObservationModel>, BuildError>;
}

// ============================================================================
// Depth pixel model (body/tail mixture)
// ============================================================================

/// Per-pixel body/tail mixture depth likelihood.
///
/// Each pixel contributes `ln(w_b * N(z; z_hat, sigma^2) + (1 - w_b) / r)`,
/// where `z_hat` is the depth predicted from the state, `w_b` the body
/// weight, and `r` the sensor's maximum range (the tail is uniform over
/// `[0, r]`, absorbing outliers and pixels the prediction misses). Pixels
/// with no return (NaN) contribute only the tail term.
///
/// Depth prediction here is deliberately simple: the state coordinate at
/// `depth_index` is taken as the expected range over the whole image. This
/// stands in for a renderer-backed model and is enough for the filter tests
/// and demos; richer models implement [`ObservationModel`] themselves.
#[derive(Debug, Clone)]
pub struct DepthPixelModel {
    camera: Arc<CameraData>,
    depth_index: usize,
    body_noise_std: f64,
    body_weight: f64,
    max_range: f64,
}

impl DepthPixelModel {
    fn log_pixel_likelihood(&self, predicted: f64, observed: f64) -> f64 {
        let tail = (1.0 - self.body_weight) / self.max_range;
        if !observed.is_finite() {
            return tail.ln();
        }
        let sigma = self.body_noise_std;
        let norm = 1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt());
        let z = (observed - predicted) / sigma;
        let body = self.body_weight * norm * (-0.5 * z * z).exp();
        (body + tail).ln()
    }
}

impl ObservationModel for DepthPixelModel {
    fn loglikelihood(&self, state: &DVector<f64>, observation: &DepthImage) -> f64 {
        debug_assert_eq!(observation.len(), self.camera.pixel_count());
        let predicted = state[self.depth_index];
        let mut loglike = 0.0;
        for observed in observation.iter() {
            loglike += self.log_pixel_likelihood(predicted, *observed);
        }
        loglike
    }
}

/// Builder for [`DepthPixelModel`].
#[derive(Debug, Clone)]
pub struct DepthPixelModelBuilder {
    camera: Arc<CameraData>,
    backend: ObservationBackend,
    depth_index: usize,
    body_noise_std: f64,
    body_weight: f64,
    max_range: f64,
}

impl DepthPixelModelBuilder {
    /// Create a builder for the given camera.
    pub fn new(camera: Arc<CameraData>) -> Self {
        Self {
            camera,
            backend: ObservationBackend::Cpu,
            depth_index: 2,
            body_noise_std: 0.01,
            body_weight: 0.9,
            max_range: 10.0,
        }
    }

    /// Select the rendering backend (default CPU).
    pub fn with_backend(mut self, backend: ObservationBackend) -> Self {
        self.backend = backend;
        self
    }

    /// State coordinate interpreted as the expected depth (default 2, the
    /// z-translation of a rigid pose).
    pub fn with_depth_index(mut self, index: usize) -> Self {
        self.depth_index = index;
        self
    }

    /// Standard deviation of the Gaussian body component (default 0.01 m).
    pub fn with_body_noise_std(mut self, std: f64) -> Self {
        self.body_noise_std = std;
        self
    }

    /// Mixture weight of the body component, in (0, 1) (default 0.9).
    pub fn with_body_weight(mut self, weight: f64) -> Self {
        self.body_weight = weight;
        self
    }

    /// Maximum sensor range for the uniform tail (default 10 m).
    pub fn with_max_range(mut self, range: f64) -> Self {
        self.max_range = range;
        self
    }
}

impl ObservationModelBuilder for DepthPixelModelBuilder {
    fn build(&self) -> Result<Box<dyn ObservationModel>, BuildError> {
        if self.backend == ObservationBackend::Gpu {
            return Err(BuildError::GpuUnavailable {
                backend: "depth pixel model",
            });
        }
        if !(self.body_noise_std > 0.0)
            || !(self.max_range > 0.0)
            || !(self.body_weight > 0.0 && self.body_weight < 1.0)
        {
            return Err(BuildError::Configuration {
                description: format!(
                    "invalid depth pixel model: body_noise_std={}, body_weight={}, max_range={}",
                    self.body_noise_std, self.body_weight, self.max_range
                ),
            });
        }
        Ok(Box::new(DepthPixelModel {
            camera: self.camera.clone(),
            depth_index: self.depth_index,
            body_noise_std: self.body_noise_std,
            body_weight: self.body_weight,
            max_range: self.max_range,
        }))
    }
}
