//! # ARIMA Finance
//!
//! Classical Box-Jenkins analysis of univariate daily price series.
//!
//! The crate covers the full identification-estimation-validation-forecast loop
//! for a narrow model family on first differences:
//!
//! - **Descriptive statistics**: moments, quartiles and IQR outliers
//! - **Correlograms**: biased ACF and a simplified PACF recursion
//! - **Stationarity**: a coarse ADF-style check on the mean of the differences
//! - **Estimation**: ARIMA(1,1,0) by least squares, ARIMA(0,1,1) by the method of
//!   moments and ARIMA(1,1,1) by grid search, all with Gaussian AIC/BIC
//! - **Residual validation**: Ljung-Box, Jarque-Bera and ARCH-LM
//! - **Forecasting**: AR(1) multi-step forecasts with analytic standard errors,
//!   80%/95% intervals, business-day labels and an expanding-window backtest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arima_finance::{load_price_file, BoxJenkinsAnalyzer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let series = load_price_file("prices.txt")?;
//!     let report = BoxJenkinsAnalyzer::with_default_config().analyze_series(&series)?;
//!
//!     for ranked in &report.ranking {
//!         println!(
//!             "{} {}: AIC = {:.2}, BIC = {:.2}",
//!             ranked.rank, ranked.model.kind, ranked.model.aic, ranked.model.bic
//!         );
//!     }
//!     for point in &report.forecast {
//!         println!(
//!             "{:?} {:.2} [{:.2}, {:.2}]",
//!             point.date, point.point_forecast, point.ci_95.lower, point.ci_95.upper
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! The numerical routines never fail. Too-short samples and degenerate inputs
//! (zero variance, φ = 1 in the forecast weights) yield NaN in the affected
//! fields, so callers should check `is_finite()` before using a value. Only the
//! loader, configuration validation and the analyzer return [`ArimaResult`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod math_utils;
pub mod results;

// Analysis stages
pub mod analyzer;
pub mod autocorrelation;
pub mod descriptive;
pub mod forecasting;
pub mod model_selection;
pub mod models;

// Input and support
pub mod calendar;
pub mod generators;
pub mod loader;

// Re-exports for convenience - main public API
pub use analyzer::BoxJenkinsAnalyzer;
pub use config::{
    from_environment, AnalysisConfig, AnalysisProfile, BacktestConfig, ConfigBuilder,
};
pub use errors::{ArimaAnalysisError, ArimaResult};
pub use results::{AnalysisReport, StationarityAssessment};

pub use autocorrelation::{acf, correlogram, lag_autocorrelation, pacf, Correlogram};
pub use descriptive::{
    compute_stats, detect_outliers, DescriptiveStats, Outlier, OutlierReport, OutlierSide,
};

pub use models::{
    fit_all_candidates, fit_ar1_differences, fit_arma11_differences, fit_ma1_differences,
    FittedModel, ModelCoefficient, ModelKind,
};
pub use model_selection::{rank_models, select_best, RankedModel};

pub use statistical_tests::{
    adf_test, arch_lm_test, diagnose_residuals, jarque_bera_test, ljung_box_test, AdfResult,
    ChiSquareMethod, JarqueBeraResult, ResidualDiagnostics, TestResult,
};

pub use forecasting::{
    backtest_ar1, forecast_ar1, label_with_business_days, Ar1Forecaster, BacktestResult,
    BacktestStep, ForecastPoint, Interval,
};

pub use calendar::{add_business_days, business_days_after, is_business_day};
pub use loader::{load_price_file, parse_price_text, Observation, PriceRecord, PriceSeries};

pub use generators::{
    generate_ar1_difference_prices, generate_random_walk_prices, generate_white_noise,
    Ar1PathConfig, GeneratorConfig,
};

// Mathematical utilities exports
pub use math_utils::{
    difference,
    float_ops::{approx_zero, negligible_spread, safe_div, safe_ln, safe_sqrt},
    mean, sample_variance, standard_normal_cdf,
};
