//! Sample autocorrelation and partial autocorrelation functions.
//!
//! All estimators use the full-sample mean and the full-sample sum of squares
//! as denominator for every lag (the biased estimator). A series without
//! variation has no defined correlation structure; every lag beyond 0 is then
//! reported as 0.

use crate::math_utils::{constants, float_ops, mean};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sum of squared deviations, or `None` when it is negligible against the raw
/// sum of squares or not finite.
fn centered_sum_of_squares(values: &[f64], m: f64) -> Option<f64> {
    let ss = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>();
    if float_ops::negligible_spread(ss, float_ops::raw_sum_of_squares(values)) {
        None
    } else {
        Some(ss)
    }
}

fn lagged_cross_product(values: &[f64], m: f64, lag: usize) -> f64 {
    if lag >= values.len() {
        return 0.0;
    }
    values
        .iter()
        .zip(values[lag..].iter())
        .map(|(a, b)| (a - m) * (b - m))
        .sum()
}

/// Lag-`k` sample autocorrelation of a mean-adjusted series.
///
/// `Σ_{i=k}^{n-1} (x_i - x̄)(x_{i-k} - x̄) / Σ (x_i - x̄)²`. Lag 0 is 1; a
/// series without variation, or a lag at or beyond its length, yields 0.
pub fn lag_autocorrelation(values: &[f64], k: usize) -> f64 {
    if k == 0 {
        return 1.0;
    }
    let m = mean(values);
    match centered_sum_of_squares(values, m) {
        Some(ss) => lagged_cross_product(values, m, k) / ss,
        None => 0.0,
    }
}

/// Autocorrelation function for lags `0..=max_lag`.
///
/// # Example
/// ```rust
/// use arima_finance::autocorrelation::acf;
///
/// let coeffs = acf(&[1.0, 2.0, 1.5, 2.5, 1.2, 2.1], 3);
/// assert_eq!(coeffs.len(), 4);
/// assert_eq!(coeffs[0], 1.0);
/// ```
pub fn acf(values: &[f64], max_lag: usize) -> Vec<f64> {
    let mut coeffs = Vec::with_capacity(max_lag + 1);
    coeffs.push(1.0);

    let m = mean(values);
    match centered_sum_of_squares(values, m) {
        Some(ss) => {
            for lag in 1..=max_lag {
                coeffs.push(lagged_cross_product(values, m, lag) / ss);
            }
        }
        None => coeffs.resize(max_lag + 1, 0.0),
    }

    coeffs
}

/// Partial autocorrelation function for lags `0..=max_lag`.
///
/// Uses the simplified Durbin-Levinson step
/// `pacf[k] = acf[k] - Σ_{j=1}^{k-1} pacf[j] * acf[k-j]` with a unit
/// denominator, which differs from the textbook recursion beyond lag 2.
pub fn pacf(values: &[f64], max_lag: usize) -> Vec<f64> {
    let rho = acf(values, max_lag);
    pacf_from_acf(&rho)
}

/// Applies the simplified Durbin-Levinson step to a precomputed ACF.
pub fn pacf_from_acf(rho: &[f64]) -> Vec<f64> {
    let mut phi = Vec::with_capacity(rho.len());
    if rho.is_empty() {
        return phi;
    }
    phi.push(1.0);
    if rho.len() > 1 {
        phi.push(rho[1]);
    }
    for k in 2..rho.len() {
        let correction: f64 = (1..k).map(|j| phi[j] * rho[k - j]).sum();
        phi.push(rho[k] - correction);
    }
    phi
}

/// Approximate 95% white-noise band `1.96 / sqrt(n)` for sample correlations.
pub fn significance_bound(n: usize) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    constants::Z_95 / (n as f64).sqrt()
}

/// A correlogram together with the lags that leave the white-noise band.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Correlogram {
    pub acf: Vec<f64>,
    pub pacf: Vec<f64>,
    /// `1.96 / sqrt(n)`
    pub bound: f64,
    pub significant_acf_lags: Vec<usize>,
    pub significant_pacf_lags: Vec<usize>,
}

/// Lags (excluding 0) whose coefficient lies outside `±significance_bound(n)`.
pub fn significant_lags(coeffs: &[f64], n: usize) -> Vec<usize> {
    let bound = significance_bound(n);
    if !bound.is_finite() {
        return Vec::new();
    }
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, c)| c.abs() > bound)
        .map(|(lag, _)| lag)
        .collect()
}

/// ACF, PACF and their significant lags in one pass.
pub fn correlogram(values: &[f64], max_lag: usize) -> Correlogram {
    let acf = acf(values, max_lag);
    let pacf = pacf_from_acf(&acf);
    let n = values.len();
    Correlogram {
        significant_acf_lags: significant_lags(&acf, n),
        significant_pacf_lags: significant_lags(&pacf, n),
        bound: significance_bound(n),
        acf,
        pacf,
    }
}
