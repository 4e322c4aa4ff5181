//! Error types for tracker construction and filtering.
//!
//! Construction errors ([`BuildError`]) indicate a setup bug and are never
//! caught or retried inside the crate. Runtime errors ([`FilterError`]) are
//! surfaced to the caller; the tracker guarantees its stored belief is left
//! intact when an update fails.

use std::fmt;

/// Errors raised while assembling a tracker or one of its models.
#[derive(Debug, Clone)]
pub enum BuildError {
    /// The process-noise dimensionality cannot be partitioned evenly across
    /// the object's parts (mismatched transition/object model configuration).
    InvalidDimension {
        /// Number of tracked parts
        part_count: usize,
        /// Total process-noise dimension
        noise_dimension: usize,
    },

    /// The selected observation-model backend requires GPU rendering support
    /// that this build does not provide.
    GpuUnavailable {
        /// Which model requested the GPU backend
        backend: &'static str,
    },

    /// Invalid parameter values.
    Configuration {
        /// Description of the configuration issue
        description: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidDimension {
                part_count,
                noise_dimension,
            } => {
                write!(
                    f,
                    "noise dimension {} is not divisible into {} part blocks",
                    noise_dimension, part_count
                )
            }
            BuildError::GpuUnavailable { backend } => {
                write!(
                    f,
                    "GPU backend requested for {} but GPU support is not available",
                    backend
                )
            }
            BuildError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Errors raised during filter initialization or update.
#[derive(Debug, Clone)]
pub enum FilterError {
    /// `initialize` was given no seed states.
    EmptyInitialization,

    /// `update` or `resample` called before `initialize` succeeded.
    NotInitialized,

    /// Every particle's weight underflowed to zero during a block pass
    /// (observation model mismatch or filter divergence).
    DegenerateWeights {
        /// Index of the sampling block whose pass collapsed
        block: usize,
    },

    /// Dimension mismatch between expected and actual
    DimensionMismatch {
        /// What was expected
        expected: usize,
        /// What was received
        actual: usize,
        /// Context (e.g., "seed state", "noise vector")
        context: String,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::EmptyInitialization => {
                write!(f, "filter initialized with an empty state sequence")
            }
            FilterError::NotInitialized => {
                write!(f, "filter used before initialization")
            }
            FilterError::DegenerateWeights { block } => {
                write!(
                    f,
                    "all particle weights underflowed to zero in sampling block {}",
                    block
                )
            }
            FilterError::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {}, got {}",
                    context, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for FilterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::InvalidDimension {
            part_count: 3,
            noise_dimension: 10,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("3"));

        let err = BuildError::GpuUnavailable {
            backend: "depth pixel model",
        };
        assert!(err.to_string().contains("GPU"));
    }

    #[test]
    fn test_filter_error_display() {
        let err = FilterError::DegenerateWeights { block: 2 };
        assert!(err.to_string().contains("block 2"));

        let err = FilterError::DimensionMismatch {
            expected: 6,
            actual: 4,
            context: "seed state".to_string(),
        };
        assert!(err.to_string().contains("6"));
        assert!(err.to_string().contains("4"));
    }
}
