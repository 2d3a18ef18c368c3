//! Mathematical utility functions and constants for price-series analysis.
//!
//! This module provides the numerical foundation shared by every stage of the
//! pipeline: moments, differencing, NaN-aware ordering, the normal CDF and the
//! chi-square tail approximations used by the diagnostic tests.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Safe comparison for floating point values (handles NaN)
pub fn float_total_cmp(a: &f64, b: &f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater, // push NaN to end
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.total_cmp(b),
    }
}

/// Calculate median of already-sorted data (handles even-length correctly)
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Nearest-rank quantile on sorted data: `sorted[floor(n * p)]`.
///
/// No interpolation is performed. The index is clamped to the last element so
/// `p = 1.0` is well defined.
pub fn nearest_rank_quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let index = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Copies the finite entries of `values`, preserving their order.
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Arithmetic mean; NaN for empty input.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance with the `n - 1` denominator; NaN for fewer than two points.
pub fn sample_variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1) as f64
}

/// First differences `x[i] - x[i-1]`, length `n - 1` (empty for `n < 2`).
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Subtracts the sample mean from every element.
pub fn demean(values: &[f64]) -> (Vec<f64>, f64) {
    let m = mean(values);
    if !m.is_finite() {
        return (values.to_vec(), f64::NAN);
    }
    (values.iter().map(|x| x - m).collect(), m)
}

/// Numerical constants used across the engine.
pub mod constants {
    /// Default epsilon for floating point comparisons
    pub const DEFAULT_EPSILON: f64 = 1e-12;

    /// Largest ratio of a centered to a raw sum of squares still treated as zero spread
    pub const RELATIVE_SPREAD_EPSILON: f64 = 1e-24;

    /// ln(2π) - logarithm of 2π for likelihood calculations
    pub const LN_TWO_PI: f64 = 1.8378770664093454835606594728112;

    /// 1/√2 - reciprocal of sqrt(2)
    pub const ONE_OVER_SQRT_2: f64 = 0.7071067811865475244008443621048;

    /// Two-sided 80% standard normal quantile
    pub const Z_80: f64 = 1.2816;

    /// Two-sided 95% standard normal quantile
    pub const Z_95: f64 = 1.96;
}

/// Safe floating point comparison functions
pub mod float_ops {
    use super::constants::{DEFAULT_EPSILON, RELATIVE_SPREAD_EPSILON};

    /// Check if a floating point number is approximately zero
    #[inline]
    pub fn approx_zero(x: f64) -> bool {
        x.abs() < DEFAULT_EPSILON
    }

    /// True when a centered sum of squares is zero relative to the raw sum of squares
    /// of the same sample, or when either is not finite.
    ///
    /// Both sides scale with the square of the data, so the outcome does not
    /// depend on the units the sample is measured in.
    #[inline]
    pub fn negligible_spread(centered_ss: f64, raw_ss: f64) -> bool {
        !centered_ss.is_finite()
            || !raw_ss.is_finite()
            || centered_ss <= RELATIVE_SPREAD_EPSILON * raw_ss
    }

    /// Sum of squares of the raw values.
    #[inline]
    pub fn raw_sum_of_squares(values: &[f64]) -> f64 {
        values.iter().map(|v| v * v).sum()
    }

    /// Safe division that checks for near-zero denominators and infinite/NaN inputs
    pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
        if approx_zero(denominator) || !numerator.is_finite() || !denominator.is_finite() {
            None
        } else {
            Some(numerator / denominator)
        }
    }

    /// Safe logarithm that checks for positive arguments and finite inputs
    pub fn safe_ln(x: f64) -> Option<f64> {
        if x > 0.0 && x.is_finite() {
            Some(x.ln())
        } else {
            None
        }
    }

    /// Safe square root that checks for non-negative arguments and finite inputs
    pub fn safe_sqrt(x: f64) -> Option<f64> {
        if x >= 0.0 && x.is_finite() {
            Some(x.sqrt())
        } else {
            None
        }
    }
}

/// Standard normal cumulative distribution function approximation
///
/// Uses the relationship: Φ(x) = 1/2 * (1 + erf(x/√2)).
///
/// # Accuracy
/// Maximum absolute error ~1.5e-7 for all real x.
///
/// # References
/// Based on Abramowitz & Stegun approximation via error function
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }

    0.5 * (1.0 + erf(x * constants::ONE_OVER_SQRT_2))
}

/// Error function approximation using Abramowitz & Stegun formula 7.1.26
///
/// erf(x) ≈ 1 - (a₁t + a₂t² + a₃t³ + a₄t⁴ + a₅t⁵)e^(-x²), t = 1/(1 + px),
/// with |ε| < 1.5 × 10⁻⁷.
pub fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }

    if x.abs() > 6.0 {
        return if x > 0.0 { 1.0 } else { -1.0 };
    }

    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Upper-tail standard normal probability `P(Z > z)`.
pub fn normal_upper_tail(z: f64) -> f64 {
    1.0 - standard_normal_cdf(z)
}

/// Two-sided p-value `2 * P(Z > |t|)` for an asymptotically normal statistic.
pub fn two_sided_normal_p_value(t: f64) -> f64 {
    if !t.is_finite() {
        return f64::NAN;
    }
    (2.0 * normal_upper_tail(t.abs())).clamp(0.0, 1.0)
}

/// Chi-square upper-tail probability via the Wilson-Hilferty cube-root transform.
///
/// z = ((Q/df)^(1/3) - (1 - 2/(9df))) / sqrt(2/(9df)), p = P(Z > z) clamped to
/// [0, 1]. Returns NaN for a non-finite or negative statistic and for `df == 0`.
pub fn chi_square_upper_tail(q: f64, df: usize) -> f64 {
    if !q.is_finite() || q < 0.0 || df == 0 {
        return f64::NAN;
    }
    let k = df as f64;
    let scale = 2.0 / (9.0 * k);
    let z = ((q / k).cbrt() - (1.0 - scale)) / scale.sqrt();
    normal_upper_tail(z).clamp(0.0, 1.0)
}

/// Exact chi-square upper-tail probability from the regularized gamma function.
pub fn chi_square_upper_tail_exact(q: f64, df: usize) -> f64 {
    if !q.is_finite() || q < 0.0 || df == 0 {
        return f64::NAN;
    }
    match ChiSquared::new(df as f64) {
        Ok(dist) => dist.sf(q).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Gaussian concentrated log-likelihood with AIC and BIC.
///
/// logL = -0.5 * n_eff * (ln(2π) + ln(σ²) + 1), AIC = -2 logL + 2k,
/// BIC = -2 logL + k ln(n_eff). Any degenerate input yields a NaN triple.
pub fn gaussian_information_criteria(sigma2: f64, n_eff: usize, k: usize) -> (f64, f64, f64) {
    let ln_sigma2 = match float_ops::safe_ln(sigma2) {
        Some(v) if n_eff > 0 => v,
        _ => return (f64::NAN, f64::NAN, f64::NAN),
    };
    let n = n_eff as f64;
    let k = k as f64;
    let log_likelihood = -0.5 * n * (constants::LN_TWO_PI + ln_sigma2 + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k;
    let bic = -2.0 * log_likelihood + k * n.ln();
    (log_likelihood, aic, bic)
}
