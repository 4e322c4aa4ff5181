//! Log-space numerics for particle weights.
//!
//! Likelihoods are carried in log space throughout the filter to avoid
//! underflow; these helpers convert between log weights and normalized
//! linear weights and compute the diagnostics the adaptive budget relies on.

use nalgebra::DVector;

/// Numerically stable log(sum(exp(values))).
///
/// Returns `f64::NEG_INFINITY` for an empty slice or when every entry is
/// negative infinity (all weights underflowed).
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Normalize log weights into linear weights summing to 1.
///
/// Returns `None` when the total probability mass underflowed to zero,
/// which the filter reports as degenerate weights.
pub fn normalize_log_weights(log_weights: &[f64]) -> Option<Vec<f64>> {
    let log_sum = log_sum_exp(log_weights);
    if !log_sum.is_finite() {
        return None;
    }
    Some(log_weights.iter().map(|lw| (lw - log_sum).exp()).collect())
}

/// Effective sample size of a normalized weight set: 1 / sum(w_i^2).
///
/// Ranges from 1 (all mass on one particle) to N (uniform weights).
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
    if sum_sq > 0.0 {
        1.0 / sum_sq
    } else {
        0.0
    }
}

/// KL divergence of a normalized weight set from the uniform distribution:
/// `ln(N) + sum(w_i * ln(w_i))`.
///
/// Zero when the weights are uniform, `ln(N)` when all mass sits on a
/// single particle. Used as the filter's convergence/degeneracy signal.
pub fn kl_to_uniform(weights: &[f64]) -> f64 {
    let n = weights.len();
    if n == 0 {
        return 0.0;
    }
    let entropy_term: f64 = weights
        .iter()
        .filter(|w| **w > 0.0)
        .map(|w| w * w.ln())
        .sum();
    ((n as f64).ln() + entropy_term).max(0.0)
}

/// Weighted mean of state vectors with normalized weights.
///
/// Returns a zero-length vector for an empty particle set.
pub fn weighted_mean(states: &[DVector<f64>], weights: &[f64]) -> DVector<f64> {
    debug_assert_eq!(states.len(), weights.len());
    let Some(first) = states.first() else {
        return DVector::zeros(0);
    };
    states
        .iter()
        .zip(weights.iter())
        .fold(DVector::zeros(first.len()), |acc, (s, w)| acc + s * *w)
}

/// Exponential moving average step, rounded to the nearest integer.
///
/// `round((1 - rate) * previous + rate * observed)`, never below 1.
pub fn moving_average(previous: usize, observed: usize, rate: f64) -> usize {
    let next = (1.0 - rate) * previous as f64 + rate * observed as f64;
    (next.round() as usize).max(1)
}
