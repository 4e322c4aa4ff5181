//! Low-level utilities shared across the crate.

pub mod rng;
pub mod stats;

pub use rng::SimpleRng;
pub use stats::{
    effective_sample_size, kl_to_uniform, log_sum_exp, moving_average,
    normalize_log_weights, weighted_mean,
};
