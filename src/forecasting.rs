//! Multi-step AR(1)-on-differences forecasting and holdout backtesting.
//!
//! Future differences decay geometrically, `Δŷ_1 = φ Δy_last` and
//! `Δŷ_h = φ Δŷ_{h-1}`, and the level forecast accumulates them onto the last
//! observed price. The forecast-error variance propagates the AR(1) error
//! through the cumulative sum:
//!
//! ```text
//! Var(h) = σ² Σ_{m=1}^{h} w_m²,   w_m = (1 - φ^{h-m+1}) / (1 - φ)
//! ```
//!
//! The weights are undefined for φ = 1; such forecasts keep their point values
//! but report NaN standard errors and intervals.

use crate::calendar::add_business_days;
use crate::config::BacktestConfig;
use crate::math_utils::{constants, difference, float_ops};
use crate::models::{fit_ar1_differences, FittedModel};
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// `center ± z · standard_error`
    pub fn symmetric(center: f64, z: f64, standard_error: f64) -> Self {
        let half_width = z * standard_error;
        Self {
            lower: center - half_width,
            upper: center + half_width,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// One horizon of a forecast path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForecastPoint {
    /// Steps ahead, starting at 1
    pub horizon: usize,
    /// Business-day label, when the series carries dates
    pub date: Option<NaiveDate>,
    pub difference_forecast: f64,
    pub point_forecast: f64,
    pub standard_error: f64,
    pub ci_80: Interval,
    pub ci_95: Interval,
}

/// Deterministic forecaster for an ARIMA(1,1,0) fit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ar1Forecaster {
    pub phi: f64,
    pub sigma2: f64,
    pub last_price: f64,
    pub last_difference: f64,
}

impl Ar1Forecaster {
    /// Takes φ and σ² from `model` and the anchor values from `prices`.
    ///
    /// Only the AR coefficient is used; a model without one (MA(1)) produces
    /// NaN forecasts. Fewer than two prices leave the last difference NaN.
    pub fn from_model(model: &FittedModel, prices: &[f64]) -> Self {
        let last_price = prices.last().copied().unwrap_or(f64::NAN);
        let last_difference = difference(prices).last().copied().unwrap_or(f64::NAN);
        Self {
            phi: model.phi(),
            sigma2: model.sigma2,
            last_price,
            last_difference,
        }
    }

    /// Forecast standard error at horizon `h`, NaN when `|1 - φ| < 1e-12`.
    ///
    /// The weights `w_m` for `m = h, h-1, ..., 1` use the powers `φ^1 ..= φ^h`,
    /// which are accumulated by repeated multiplication for any horizon.
    pub fn standard_error(&self, h: usize) -> f64 {
        let one_minus_phi = 1.0 - self.phi;
        if h == 0 || !one_minus_phi.is_finite() || float_ops::approx_zero(one_minus_phi) {
            return f64::NAN;
        }
        let mut power = 1.0;
        let mut sum_w2 = 0.0;
        for _ in 0..h {
            power *= self.phi;
            let w = (1.0 - power) / one_minus_phi;
            sum_w2 += w * w;
        }
        float_ops::safe_sqrt(self.sigma2 * sum_w2).unwrap_or(f64::NAN)
    }

    /// Forecast path for horizons `1..=horizon`; empty for `horizon == 0`.
    ///
    /// # Example
    /// ```rust
    /// use arima_finance::forecasting::Ar1Forecaster;
    ///
    /// let forecaster = Ar1Forecaster {
    ///     phi: 0.5,
    ///     sigma2: 1.0,
    ///     last_price: 100.0,
    ///     last_difference: 2.0,
    /// };
    /// let path = forecaster.forecast(3);
    /// assert_eq!(path[2].point_forecast, 101.75);
    /// ```
    pub fn forecast(&self, horizon: usize) -> Vec<ForecastPoint> {
        let mut points = Vec::with_capacity(horizon);
        let mut diff = self.last_difference;
        let mut level = self.last_price;

        for h in 1..=horizon {
            diff *= self.phi;
            level += diff;
            let standard_error = self.standard_error(h);
            points.push(ForecastPoint {
                horizon: h,
                date: None,
                difference_forecast: diff,
                point_forecast: level,
                standard_error,
                ci_80: Interval::symmetric(level, constants::Z_80, standard_error),
                ci_95: Interval::symmetric(level, constants::Z_95, standard_error),
            });
        }
        points
    }
}

/// Fits ARIMA(1,1,0) to `prices` and forecasts `horizon` steps.
pub fn forecast_ar1(prices: &[f64], horizon: usize) -> Vec<ForecastPoint> {
    let model = fit_ar1_differences(prices);
    Ar1Forecaster::from_model(&model, prices).forecast(horizon)
}

/// Dates each point `horizon` business days after `last_date`.
pub fn label_with_business_days(
    points: &[ForecastPoint],
    last_date: NaiveDate,
) -> Vec<ForecastPoint> {
    points
        .iter()
        .map(|p| ForecastPoint {
            date: Some(add_business_days(last_date, p.horizon)),
            ..*p
        })
        .collect()
}

// ============================================================================
// BACKTEST
// ============================================================================

/// One-step-ahead prediction for a held-out observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BacktestStep {
    /// Position of the held-out price in the input series
    pub index: usize,
    pub actual: f64,
    pub predicted: f64,
    /// `actual - predicted`
    pub error: f64,
}

/// Accuracy of expanding-window one-step forecasts over the holdout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BacktestResult {
    pub holdout: usize,
    pub steps: Vec<BacktestStep>,
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error in percent
    pub mape: f64,
}

impl BacktestResult {
    /// Steps whose prediction is finite.
    pub fn evaluated_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.predicted.is_finite()).count()
    }
}

/// Expanding-window backtest of the AR(1) forecaster.
///
/// The last `config.holdout_size(n)` prices are held out (at most `n - 1`, so
/// at least one price trains). For each held-out index `i` the model is refit
/// on `prices[..i]` and its one-step forecast compared with `prices[i]`.
/// Steps whose training prefix is too short to fit yield NaN predictions and
/// are excluded from the metrics; MAPE also skips zero actuals. Metrics with
/// no contributing step are NaN.
pub fn backtest_ar1(prices: &[f64], config: &BacktestConfig) -> BacktestResult {
    let n = prices.len();
    let holdout = config.holdout_size(n).min(n.saturating_sub(1));

    let steps: Vec<BacktestStep> = (n - holdout..n)
        .map(|i| {
            let train = &prices[..i];
            let predicted = forecast_ar1(train, 1)
                .first()
                .map_or(f64::NAN, |p| p.point_forecast);
            let actual = prices[i];
            BacktestStep {
                index: i,
                actual,
                predicted,
                error: actual - predicted,
            }
        })
        .collect();

    let scored: Vec<&BacktestStep> = steps
        .iter()
        .filter(|s| s.predicted.is_finite() && s.actual.is_finite())
        .collect();

    let (mae, rmse) = if scored.is_empty() {
        (f64::NAN, f64::NAN)
    } else {
        let count = scored.len() as f64;
        let abs_sum: f64 = scored.iter().map(|s| s.error.abs()).sum();
        let sq_sum: f64 = scored.iter().map(|s| s.error * s.error).sum();
        (abs_sum / count, (sq_sum / count).sqrt())
    };

    let percentage_errors: Vec<f64> = scored
        .iter()
        .filter(|s| s.actual != 0.0)
        .map(|s| (s.error / s.actual).abs())
        .collect();
    let mape = if percentage_errors.is_empty() {
        f64::NAN
    } else {
        100.0 * percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64
    };

    if scored.len() < steps.len() {
        log::debug!(
            "Backtest: {} of {} holdout steps had no defined forecast",
            steps.len() - scored.len(),
            steps.len()
        );
    }

    BacktestResult {
        holdout,
        steps,
        mae,
        rmse,
        mape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelKind;
    use assert_approx_eq::assert_approx_eq;

    fn forecaster(phi: f64) -> Ar1Forecaster {
        Ar1Forecaster {
            phi,
            sigma2: 1.0,
            last_price: 100.0,
            last_difference: 2.0,
        }
    }

    #[test]
    fn test_point_forecast_recursion() {
        let path = forecaster(0.5).forecast(3);
        let diffs: Vec<f64> = path.iter().map(|p| p.difference_forecast).collect();
        assert_eq!(diffs, vec![1.0, 0.5, 0.25]);
        assert_eq!(path[2].point_forecast, 101.75);
        assert_eq!(path[0].horizon, 1);
        assert!(path.iter().all(|p| p.date.is_none()));
    }

    #[test]
    fn test_standard_error_weights() {
        let f = forecaster(0.5);
        // h = 1: w_1 = 1
        assert_approx_eq!(f.standard_error(1), 1.0, 1e-12);
        // h = 2: w_1 = 1.5, w_2 = 1
        assert_approx_eq!(f.standard_error(2), (1.5f64 * 1.5 + 1.0).sqrt(), 1e-12);
        // h = 3: w_1 = 1.75, w_2 = 1.5, w_3 = 1
        assert_approx_eq!(f.standard_error(3), (1.75f64 * 1.75 + 2.25 + 1.0).sqrt(), 1e-12);
    }

    #[test]
    fn test_standard_error_long_horizons_match_closed_form() {
        // Σ_{j=1}^{h} (1 - φ^j)² / (1 - φ)² summed analytically
        let closed_form = |phi: f64, h: usize| {
            let hf = h as f64;
            let geometric = phi * (1.0 - phi.powf(hf)) / (1.0 - phi);
            let geometric_sq = phi * phi * (1.0 - phi.powf(2.0 * hf)) / (1.0 - phi * phi);
            ((hf - 2.0 * geometric + geometric_sq) / (1.0 - phi).powi(2)).sqrt()
        };
        for phi in [0.5, -0.7, 0.95] {
            let f = forecaster(phi);
            for h in [1usize, 7, 250, 50_000] {
                let expected = closed_form(phi, h);
                assert!(
                    (f.standard_error(h) - expected).abs() <= 1e-9 * expected,
                    "phi {} h {}",
                    phi,
                    h
                );
            }
        }

        let far = forecaster(0.5).standard_error(50_000);
        assert!(far > forecaster(0.5).standard_error(49_999));
    }

    #[test]
    fn test_intervals_nest() {
        for p in forecaster(0.3).forecast(10) {
            assert!(p.ci_95.lower <= p.ci_80.lower);
            assert!(p.ci_80.lower <= p.point_forecast);
            assert!(p.point_forecast <= p.ci_80.upper);
            assert!(p.ci_80.upper <= p.ci_95.upper);
            assert_approx_eq!(p.ci_95.width(), 2.0 * 1.96 * p.standard_error, 1e-9);
        }
    }

    #[test]
    fn test_unit_phi_guard() {
        let path = forecaster(1.0).forecast(3);
        assert_eq!(path[0].difference_forecast, 2.0);
        assert_eq!(path[2].point_forecast, 106.0);
        for p in &path {
            assert!(p.standard_error.is_nan());
            assert!(p.ci_80.lower.is_nan());
            assert!(p.ci_95.upper.is_nan());
        }
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        assert!(forecaster(0.5).forecast(0).is_empty());
        assert!(forecast_ar1(&[1.0, 2.0, 3.0, 5.0, 4.0], 0).is_empty());
    }

    #[test]
    fn test_from_model_uses_last_values() {
        let prices = [10.0, 12.0, 11.0, 14.0, 13.0, 15.0];
        let model = fit_ar1_differences(&prices);
        let f = Ar1Forecaster::from_model(&model, &prices);
        assert_eq!(f.last_price, 15.0);
        assert_eq!(f.last_difference, 2.0);
        assert_eq!(f.phi, model.phi());

        let ma = FittedModel::undefined(ModelKind::Ma1);
        let path = Ar1Forecaster::from_model(&ma, &prices).forecast(2);
        assert!(path[0].point_forecast.is_nan());
    }

    #[test]
    fn test_business_day_labels() {
        let friday = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
        let labelled = label_with_business_days(&forecaster(0.5).forecast(3), friday);
        let dates: Vec<NaiveDate> = labelled.iter().filter_map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 10, 21).unwrap(),
                NaiveDate::from_ymd_opt(2024, 10, 22).unwrap(),
                NaiveDate::from_ymd_opt(2024, 10, 23).unwrap(),
            ]
        );
        assert_eq!(labelled[2].point_forecast, 101.75);
    }

    #[test]
    fn test_backtest_holdout_and_metrics() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0 + i as f64 * 0.1)
            .collect();
        let result = backtest_ar1(&prices, &BacktestConfig::default());
        assert_eq!(result.holdout, 6);
        assert_eq!(result.steps.len(), 6);
        assert_eq!(result.steps[0].index, 54);
        assert_eq!(result.evaluated_steps(), 6);

        let mae = result.steps.iter().map(|s| s.error.abs()).sum::<f64>() / 6.0;
        let rmse = (result.steps.iter().map(|s| s.error * s.error).sum::<f64>() / 6.0).sqrt();
        assert_approx_eq!(result.mae, mae, 1e-12);
        assert_approx_eq!(result.rmse, rmse, 1e-12);
        assert!(result.rmse >= result.mae);
        assert!(result.mape > 0.0 && result.mape.is_finite());

        // Each step is the one-step forecast from the prefix alone
        let first = forecast_ar1(&prices[..54], 1)[0].point_forecast;
        assert_eq!(result.steps[0].predicted, first);
    }

    #[test]
    fn test_backtest_short_series() {
        let result = backtest_ar1(&[100.0, 101.0, 103.0], &BacktestConfig::default());
        assert_eq!(result.holdout, 2);
        assert_eq!(result.evaluated_steps(), 0);
        assert!(result.mae.is_nan());
        assert!(result.rmse.is_nan());
        assert!(result.mape.is_nan());

        let empty = backtest_ar1(&[], &BacktestConfig::default());
        assert_eq!(empty.holdout, 0);
        assert!(empty.steps.is_empty());
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let mut prices: Vec<f64> = (0..30).map(|i| ((i as f64) * 1.3).cos() * 5.0).collect();
        prices[29] = 0.0;
        let result = backtest_ar1(&prices, &BacktestConfig::default());
        let manual: Vec<f64> = result
            .steps
            .iter()
            .filter(|s| s.predicted.is_finite() && s.actual != 0.0)
            .map(|s| (s.error / s.actual).abs())
            .collect();
        let expected = 100.0 * manual.iter().sum::<f64>() / manual.len() as f64;
        assert_approx_eq!(result.mape, expected, 1e-9);
    }
}
