//! ARIMA-family candidate fits on first differences.
//!
//! Three small estimators are provided, all operating on
//! `Δy_t = y_t - y_{t-1}`:
//!
//! - **ARIMA(1,1,0)**: closed-form least squares through the origin. The
//!   differences are *not* de-meaned before fitting.
//! - **ARIMA(0,1,1)**: method of moments from the lag-1 autocorrelation of the
//!   de-meaned differences.
//! - **ARIMA(1,1,1)**: grid search over φ, θ ∈ {-0.9, -0.8, …, 0.9} on the
//!   de-meaned differences.
//!
//! Only the MA and ARMA fitters subtract the mean of the differences;
//! [`FittedModel::mean_removed`] records which case applies.
//!
//! Every fitter returns a well-formed [`FittedModel`]. When the series is too
//! short or a quantity degenerates, numeric fields are NaN and the residual
//! vector may be empty.

use crate::autocorrelation::lag_autocorrelation;
use crate::math_utils::{
    demean, difference, float_ops, gaussian_information_criteria, two_sided_normal_p_value,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Grid points per ARMA(1,1) parameter: -0.9 ..= 0.9 in steps of 0.1.
const GRID_HALF_WIDTH: i32 = 9;
const GRID_STEP: f64 = 0.1;

/// Bound applied to the lag-1 autocorrelation before inverting the MA(1) equation.
const MA1_RHO_LIMIT: f64 = 0.49;
/// Bound applied to the recovered MA(1) coefficient.
const MA1_THETA_LIMIT: f64 = 0.99;

/// Candidate model family, all with d = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModelKind {
    /// ARIMA(1,1,0)
    Ar1,
    /// ARIMA(0,1,1)
    Ma1,
    /// ARIMA(1,1,1)
    Arma11,
}

impl ModelKind {
    /// Every candidate, in fitting order.
    pub const ALL: [ModelKind; 3] = [ModelKind::Ar1, ModelKind::Ma1, ModelKind::Arma11];

    /// `(p, d, q)` order.
    pub fn order(&self) -> (usize, usize, usize) {
        match self {
            ModelKind::Ar1 => (1, 1, 0),
            ModelKind::Ma1 => (0, 1, 1),
            ModelKind::Arma11 => (1, 1, 1),
        }
    }

    /// Display label such as `ARIMA(1,1,0)`.
    pub fn label(&self) -> String {
        let (p, d, q) = self.order();
        format!("ARIMA({},{},{})", p, d, q)
    }

    /// Parameter count `k` used by the information criteria (includes σ²).
    pub fn parameter_count(&self) -> usize {
        match self {
            ModelKind::Ar1 | ModelKind::Ma1 => 2,
            ModelKind::Arma11 => 3,
        }
    }

    /// Number of ARMA coefficients, used to reduce Ljung-Box degrees of freedom.
    pub fn arma_coefficient_count(&self) -> usize {
        let (p, _, q) = self.order();
        p + q
    }

    /// Minimum number of first differences the fitter needs.
    pub fn min_differences(&self) -> usize {
        match self {
            ModelKind::Ar1 | ModelKind::Ma1 => 3,
            ModelKind::Arma11 => 4,
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// One estimated coefficient with its inference summary.
///
/// Standard errors are only available for the AR(1) fit; the moment and grid
/// estimators report NaN.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelCoefficient {
    /// "phi" or "theta"
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    /// Two-sided normal-approximation p-value
    pub p_value: f64,
}

impl ModelCoefficient {
    fn point(name: &str, estimate: f64) -> Self {
        Self {
            name: name.to_string(),
            estimate,
            std_error: f64::NAN,
            t_statistic: f64::NAN,
            p_value: f64::NAN,
        }
    }
}

/// Output of any fitting routine.
///
/// Invariants: `aic = -2 logL + 2k`, `bic = -2 logL + k ln(n_eff)`,
/// `logL = -0.5 n_eff (ln 2π + ln σ² + 1)`, and `residuals.len() == n_eff`
/// whenever the fit is defined.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FittedModel {
    pub kind: ModelKind,
    pub coefficients: Vec<ModelCoefficient>,
    pub residuals: Vec<f64>,
    /// Mean squared residual
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Parameter count entering AIC/BIC
    pub k: usize,
    /// Number of residuals the likelihood is based on
    pub n_eff: usize,
    /// Mean subtracted from the differences before fitting, if any
    pub mean_removed: Option<f64>,
}

impl FittedModel {
    /// NaN-filled model for inputs the fitter cannot handle.
    pub fn undefined(kind: ModelKind) -> Self {
        let coefficients = match kind {
            ModelKind::Ar1 => vec![ModelCoefficient::point("phi", f64::NAN)],
            ModelKind::Ma1 => vec![ModelCoefficient::point("theta", f64::NAN)],
            ModelKind::Arma11 => vec![
                ModelCoefficient::point("phi", f64::NAN),
                ModelCoefficient::point("theta", f64::NAN),
            ],
        };
        Self {
            kind,
            coefficients,
            residuals: Vec::new(),
            sigma2: f64::NAN,
            log_likelihood: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            k: kind.parameter_count(),
            n_eff: 0,
            mean_removed: None,
        }
    }

    fn from_residuals(
        kind: ModelKind,
        coefficients: Vec<ModelCoefficient>,
        residuals: Vec<f64>,
        mean_removed: Option<f64>,
    ) -> Self {
        let n_eff = residuals.len();
        let sigma2 = residual_variance(&residuals);
        let k = kind.parameter_count();
        let (log_likelihood, aic, bic) = gaussian_information_criteria(sigma2, n_eff, k);
        Self {
            kind,
            coefficients,
            residuals,
            sigma2,
            log_likelihood,
            aic,
            bic,
            k,
            n_eff,
            mean_removed,
        }
    }

    /// Estimate of the named coefficient, NaN when the model has none.
    pub fn coefficient(&self, name: &str) -> f64 {
        self.coefficients
            .iter()
            .find(|c| c.name == name)
            .map_or(f64::NAN, |c| c.estimate)
    }

    /// AR coefficient φ (NaN for the MA(1) model).
    pub fn phi(&self) -> f64 {
        self.coefficient("phi")
    }

    /// MA coefficient θ (NaN for the AR(1) model).
    pub fn theta(&self) -> f64 {
        self.coefficient("theta")
    }

    /// Both information criteria are finite, so the model can be ranked.
    pub fn is_rankable(&self) -> bool {
        self.aic.is_finite() && self.bic.is_finite()
    }
}

/// Mean of squared residuals; NaN for an empty slice.
fn residual_variance(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return f64::NAN;
    }
    residuals.iter().map(|e| e * e).sum::<f64>() / residuals.len() as f64
}

// ============================================================================
// AR(1)
// ============================================================================

/// ARIMA(1,1,0): regress `Δy_t` on `Δy_{t-1}` without intercept.
///
/// φ = Σ y·x / Σ x², residuals e_t = y_t - φ x_t, se = sqrt(σ² / Σ x²),
/// t = φ / se with a two-sided normal p-value. Needs 3 differences.
///
/// # Example
/// ```rust
/// use arima_finance::models::fit_ar1_differences;
///
/// let prices = [100.0, 101.0, 101.5, 101.75, 101.875, 101.9375];
/// let model = fit_ar1_differences(&prices);
/// assert!((model.phi() - 0.5).abs() < 1e-12);
/// assert_eq!(model.residuals.len(), 4);
/// ```
pub fn fit_ar1_differences(prices: &[f64]) -> FittedModel {
    let kind = ModelKind::Ar1;
    let diffs = difference(prices);
    if diffs.len() < kind.min_differences() {
        return FittedModel::undefined(kind);
    }

    let x = &diffs[..diffs.len() - 1];
    let y = &diffs[1..];
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();

    if !sxx.is_finite() || sxx <= 0.0 {
        return FittedModel::undefined(kind);
    }

    let phi = sxy / sxx;
    let residuals: Vec<f64> = x.iter().zip(y).map(|(xt, yt)| yt - phi * xt).collect();
    let mut model = FittedModel::from_residuals(
        kind,
        vec![ModelCoefficient::point("phi", phi)],
        residuals,
        None,
    );

    let std_error = float_ops::safe_sqrt(model.sigma2 / sxx).unwrap_or(f64::NAN);
    let t_statistic = float_ops::safe_div(phi, std_error).unwrap_or(f64::NAN);
    model.coefficients[0] = ModelCoefficient {
        name: "phi".to_string(),
        estimate: phi,
        std_error,
        t_statistic,
        p_value: two_sided_normal_p_value(t_statistic),
    };
    model
}

// ============================================================================
// MA(1)
// ============================================================================

/// Invertible solution of `ρ = -θ / (1 + θ²)`.
///
/// ρ is clamped to ±0.49 first, the root `(-1 + sqrt(1 - 4ρ²)) / (2ρ)` is taken
/// (θ = 0 for ρ = 0) and the result clamped to ±0.99.
pub fn invert_ma1_autocorrelation(rho: f64) -> f64 {
    if !rho.is_finite() {
        return f64::NAN;
    }
    let rho = rho.clamp(-MA1_RHO_LIMIT, MA1_RHO_LIMIT);
    if float_ops::approx_zero(rho) {
        return 0.0;
    }
    let theta = (-1.0 + (1.0 - 4.0 * rho * rho).sqrt()) / (2.0 * rho);
    theta.clamp(-MA1_THETA_LIMIT, MA1_THETA_LIMIT)
}

/// ARIMA(0,1,1) by the method of moments on de-meaned differences.
///
/// Residuals follow `e_t = x_t - θ e_{t-1}` starting from a zero residual, so
/// one residual is produced per difference. Needs 3 differences.
pub fn fit_ma1_differences(prices: &[f64]) -> FittedModel {
    let kind = ModelKind::Ma1;
    let diffs = difference(prices);
    if diffs.len() < kind.min_differences() {
        return FittedModel::undefined(kind);
    }

    let (x, mean_removed) = demean(&diffs);
    let rho1 = lag_autocorrelation(&x, 1);
    let theta = invert_ma1_autocorrelation(rho1);
    if !theta.is_finite() {
        return FittedModel::undefined(kind);
    }

    let mut residuals = Vec::with_capacity(x.len());
    let mut previous = 0.0;
    for &xt in &x {
        let e = xt - theta * previous;
        residuals.push(e);
        previous = e;
    }

    FittedModel::from_residuals(
        kind,
        vec![ModelCoefficient::point("theta", theta)],
        residuals,
        Some(mean_removed),
    )
}

// ============================================================================
// ARMA(1,1)
// ============================================================================

/// The φ/θ lattice, -0.9 ..= 0.9 in steps of 0.1.
pub fn arma_grid() -> Vec<f64> {
    (-GRID_HALF_WIDTH..=GRID_HALF_WIDTH)
        .map(|i| i as f64 * GRID_STEP)
        .collect()
}

/// Residuals `e_t = x_t - φ x_{t-1} - θ e_{t-1}` for t ≥ 1 with a zero seed.
pub fn arma11_residuals(x: &[f64], phi: f64, theta: f64) -> Vec<f64> {
    let mut residuals = Vec::with_capacity(x.len().saturating_sub(1));
    let mut previous = 0.0;
    for t in 1..x.len() {
        let e = x[t] - phi * x[t - 1] - theta * previous;
        residuals.push(e);
        previous = e;
    }
    residuals
}

fn arma11_mse(x: &[f64], phi: f64, theta: f64) -> f64 {
    residual_variance(&arma11_residuals(x, phi, theta))
}

/// Index into the flattened grid (φ outer, θ inner) of the smallest MSE.
///
/// Ties resolve to the earliest grid point so the result does not depend on
/// evaluation order.
#[cfg(not(feature = "parallel"))]
fn best_grid_point(x: &[f64], grid: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &phi) in grid.iter().enumerate() {
        for (j, &theta) in grid.iter().enumerate() {
            let mse = arma11_mse(x, phi, theta);
            if !mse.is_finite() {
                continue;
            }
            match best {
                Some((_, best_mse)) if mse >= best_mse => {}
                _ => best = Some((i * grid.len() + j, mse)),
            }
        }
    }
    best
}

#[cfg(feature = "parallel")]
fn best_grid_point(x: &[f64], grid: &[f64]) -> Option<(usize, f64)> {
    let width = grid.len();
    (0..width * width)
        .into_par_iter()
        .filter_map(|idx| {
            let mse = arma11_mse(x, grid[idx / width], grid[idx % width]);
            mse.is_finite().then_some((idx, mse))
        })
        .reduce_with(|a, b| {
            if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
                b
            } else {
                a
            }
        })
}

/// ARIMA(1,1,1) by grid search on de-meaned differences. Needs 4 differences.
pub fn fit_arma11_differences(prices: &[f64]) -> FittedModel {
    let kind = ModelKind::Arma11;
    let diffs = difference(prices);
    if diffs.len() < kind.min_differences() {
        return FittedModel::undefined(kind);
    }

    let (x, mean_removed) = demean(&diffs);
    let grid = arma_grid();
    let (index, mse) = match best_grid_point(&x, &grid) {
        Some(best) => best,
        None => return FittedModel::undefined(kind),
    };
    let phi = grid[index / grid.len()];
    let theta = grid[index % grid.len()];
    log::debug!(
        "ARMA(1,1) grid optimum phi={:.1} theta={:.1} mse={:.6}",
        phi,
        theta,
        mse
    );

    FittedModel::from_residuals(
        kind,
        vec![
            ModelCoefficient::point("phi", phi),
            ModelCoefficient::point("theta", theta),
        ],
        arma11_residuals(&x, phi, theta),
        Some(mean_removed),
    )
}

/// Fits a single candidate family.
pub fn fit_model(kind: ModelKind, prices: &[f64]) -> FittedModel {
    match kind {
        ModelKind::Ar1 => fit_ar1_differences(prices),
        ModelKind::Ma1 => fit_ma1_differences(prices),
        ModelKind::Arma11 => fit_arma11_differences(prices),
    }
}

/// Fits every candidate family, in the order of [`ModelKind::ALL`].
pub fn fit_all_candidates(prices: &[f64]) -> Vec<FittedModel> {
    ModelKind::ALL
        .iter()
        .map(|&kind| fit_model(kind, prices))
        .collect()
}
