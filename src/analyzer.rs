//! Box-Jenkins pipeline orchestration.
//!
//! [`BoxJenkinsAnalyzer`] runs every stage on one price series and bundles
//! the outputs into an [`AnalysisReport`]:
//!
//! 1. Descriptive statistics and IQR outliers of levels and differences
//! 2. ACF/PACF of the differences
//! 3. Simplified ADF on levels and on differences
//! 4. AR(1), MA(1) and ARMA(1,1) fits on the differences
//! 5. AIC/BIC ranking
//! 6. Ljung-Box, Jarque-Bera and ARCH-LM on the selected model's residuals
//! 7. AR(1) multi-step forecast and expanding-window backtest
//!
//! The analyzer holds only its configuration. Numerical degeneracies inside a
//! stage surface as NaN fields plus a report warning; the only errors are an
//! invalid configuration and a series without finite prices.

use crate::autocorrelation::correlogram;
use crate::config::AnalysisConfig;
use crate::descriptive::{detect_outliers, summarize_prices_and_differences};
use crate::errors::{validate_data_length, ArimaResult};
use crate::forecasting::{backtest_ar1, label_with_business_days, Ar1Forecaster};
use crate::loader::PriceSeries;
use crate::math_utils::{difference, finite_values};
use crate::model_selection::rank_models;
use crate::models::{fit_ar1_differences, fit_model, ModelKind};
use crate::results::{AnalysisReport, StationarityAssessment};
use crate::statistical_tests::{adf_test, diagnose_residuals};
use std::collections::BTreeMap;

/// Prices needed before every candidate model can be fitted.
const MIN_PRICES_FOR_ALL_MODELS: usize = 5;

/// Stateless Box-Jenkins pipeline.
#[derive(Debug, Clone, Default)]
pub struct BoxJenkinsAnalyzer {
    config: AnalysisConfig,
}

impl BoxJenkinsAnalyzer {
    /// Creates an analyzer after validating `config`.
    pub fn new(config: AnalysisConfig) -> ArimaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Analyzer with the standard preset.
    pub fn with_default_config() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs the full pipeline on a price series.
    ///
    /// Non-finite prices are removed before any stage runs.
    ///
    /// # Example
    /// ```rust
    /// use arima_finance::analyzer::BoxJenkinsAnalyzer;
    ///
    /// let prices: Vec<f64> = (0..80)
    ///     .map(|i| 100.0 + (i as f64 * 0.9).sin() * 2.0 + i as f64 * 0.05)
    ///     .collect();
    /// let report = BoxJenkinsAnalyzer::with_default_config().analyze(&prices).unwrap();
    /// assert_eq!(report.candidates.len(), 3);
    /// assert_eq!(report.forecast.len(), 10);
    /// ```
    pub fn analyze(&self, prices: &[f64]) -> ArimaResult<AnalysisReport> {
        let prices = finite_values(prices);
        validate_data_length(&prices, 1, "analyze")?;

        let mut warnings = Vec::new();
        let n = prices.len();
        log::debug!("Analyzing {} prices with {:?}", n, self.config);

        if n < MIN_PRICES_FOR_ALL_MODELS {
            warnings.push(format!(
                "Only {} prices: at least {} are needed to fit every candidate model",
                n, MIN_PRICES_FOR_ALL_MODELS
            ));
        }

        let differences = difference(&prices);
        let summary = summarize_prices_and_differences(&prices);
        let level_outliers = detect_outliers(&prices);
        let difference_outliers = detect_outliers(&differences);
        let correlogram = correlogram(&differences, self.config.max_lag);

        let stationarity = StationarityAssessment {
            levels: adf_test(&prices),
            differences: adf_test(&differences),
        };
        if stationarity.levels.is_stationary {
            warnings.push(
                "Price levels already look stationary; differencing may be unnecessary".to_string(),
            );
        }

        // The AR(1) candidate doubles as the forecast model
        let forecast_model = fit_ar1_differences(&prices);
        let candidates: Vec<_> = ModelKind::ALL
            .iter()
            .map(|&kind| match kind {
                ModelKind::Ar1 => forecast_model.clone(),
                other => fit_model(other, &prices),
            })
            .collect();
        let ranking = rank_models(&candidates);

        let diagnostics = match ranking.first() {
            Some(best) => {
                log::info!(
                    "Selected {} (AIC {:.3}, BIC {:.3})",
                    best.model.kind,
                    best.model.aic,
                    best.model.bic
                );
                let diag = diagnose_residuals(
                    &best.model.residuals,
                    best.model.kind.arma_coefficient_count(),
                    &self.config,
                );
                if diag.ljung_box.is_defined() && !diag.is_white_noise() {
                    warnings.push(format!(
                        "Residuals of {} show remaining autocorrelation (Ljung-Box p = {:.4})",
                        best.model.kind, diag.ljung_box.p_value
                    ));
                }
                if diag.arch_lm.is_defined() && !diag.is_homoskedastic() {
                    warnings.push(format!(
                        "Residuals of {} show ARCH effects (LM p = {:.4})",
                        best.model.kind, diag.arch_lm.p_value
                    ));
                }
                Some(diag)
            }
            None => {
                log::warn!("No candidate model could be ranked for {} prices", n);
                warnings.push("No candidate model has finite AIC/BIC".to_string());
                None
            }
        };

        let forecast = Ar1Forecaster::from_model(&forecast_model, &prices)
            .forecast(self.config.forecast_horizon);
        if forecast.iter().any(|p| !p.standard_error.is_finite()) {
            warnings.push("Forecast standard errors are undefined for this fit".to_string());
        }

        let backtest = backtest_ar1(&prices, &self.config.backtest);
        log::debug!(
            "Backtest over {} steps: MAE {:.4}, RMSE {:.4}, MAPE {:.2}%",
            backtest.holdout,
            backtest.mae,
            backtest.rmse,
            backtest.mape
        );

        for warning in &warnings {
            log::warn!("{}", warning);
        }

        Ok(AnalysisReport {
            observations: n,
            summary,
            level_outliers,
            difference_outliers,
            correlogram,
            stationarity,
            candidates,
            ranking,
            diagnostics,
            forecast_model,
            forecast,
            backtest,
            warnings,
        })
    }

    /// Runs the pipeline on a loaded series and dates the forecast horizons
    /// in business days after the last observation.
    pub fn analyze_series(&self, series: &PriceSeries) -> ArimaResult<AnalysisReport> {
        let mut report = self.analyze(&series.prices())?;
        if let Some(last_date) = series.last_date() {
            report.forecast = label_with_business_days(&report.forecast, last_date);
        }
        Ok(report)
    }

    /// Analyzes several named series independently, in key order.
    ///
    /// A failure on one series does not stop the others.
    pub fn analyze_many(
        &self,
        series: &BTreeMap<String, Vec<f64>>,
    ) -> BTreeMap<String, ArimaResult<AnalysisReport>> {
        series
            .iter()
            .map(|(name, prices)| {
                let result = self.analyze(prices);
                if let Err(e) = &result {
                    log::warn!("Analysis of {} failed: {}", name, e);
                }
                (name.clone(), result)
            })
            .collect()
    }
}
