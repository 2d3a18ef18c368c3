//! # Analysis Configuration
//!
//! Configuration structures controlling the lag counts, test orders, forecast
//! horizon and backtest holdout used by the Box-Jenkins pipeline, together with
//! presets and an environment-driven selector.

use crate::errors::{validate_parameter, validate_positive_count, ArimaAnalysisError, ArimaResult};
use crate::statistical_tests::ChiSquareMethod;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable consulted by [`from_environment`].
pub const PROFILE_ENV_VAR: &str = "ARIMA_ANALYSIS_PROFILE";

/// Holdout sizing for the expanding-window backtest.
///
/// holdout = min(max_holdout, max(min_holdout, floor(holdout_fraction · n)))
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BacktestConfig {
    pub min_holdout: usize,
    pub max_holdout: usize,
    pub holdout_fraction: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            min_holdout: 3,
            max_holdout: 12,
            holdout_fraction: 0.1,
        }
    }
}

impl BacktestConfig {
    /// Number of trailing observations held out for a series of length `n`.
    pub fn holdout_size(&self, n: usize) -> usize {
        let proportional = (self.holdout_fraction * n as f64).floor() as usize;
        proportional.max(self.min_holdout).min(self.max_holdout)
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Highest lag reported by the ACF/PACF
    pub max_lag: usize,
    /// Lags entering the Ljung-Box statistic
    pub ljung_box_lags: usize,
    /// Order of the ARCH-LM regression
    pub arch_order: usize,
    /// Number of business days to forecast
    pub forecast_horizon: usize,
    pub backtest: BacktestConfig,
    /// Chi-square tail evaluation for Ljung-Box and ARCH-LM
    pub chi_square_method: ChiSquareMethod,
}

/// Named presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalysisProfile {
    /// Short correlogram and horizon
    Quick,
    /// Default settings
    Standard,
    /// Longer correlogram, horizon and holdout with exact chi-square tails
    Extended,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnalysisConfig {
    /// Quick configuration: short correlogram, one-week horizon.
    pub fn quick() -> Self {
        Self {
            max_lag: 10,
            ljung_box_lags: 5,
            arch_order: 1,
            forecast_horizon: 5,
            backtest: BacktestConfig::default(),
            chi_square_method: ChiSquareMethod::WilsonHilferty,
        }
    }

    /// Standard configuration.
    pub fn standard() -> Self {
        Self {
            max_lag: 20,
            ljung_box_lags: 10,
            arch_order: 1,
            forecast_horizon: 10,
            backtest: BacktestConfig::default(),
            chi_square_method: ChiSquareMethod::WilsonHilferty,
        }
    }

    /// Extended configuration.
    pub fn extended() -> Self {
        Self {
            max_lag: 40,
            ljung_box_lags: 20,
            arch_order: 5,
            forecast_horizon: 20,
            backtest: BacktestConfig {
                min_holdout: 3,
                max_holdout: 24,
                holdout_fraction: 0.1,
            },
            chi_square_method: ChiSquareMethod::Exact,
        }
    }

    /// Configuration for a named profile.
    pub fn for_profile(profile: AnalysisProfile) -> Self {
        match profile {
            AnalysisProfile::Quick => Self::quick(),
            AnalysisProfile::Standard => Self::standard(),
            AnalysisProfile::Extended => Self::extended(),
        }
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> ArimaResult<()> {
        validate_positive_count(self.max_lag, "max_lag")?;
        validate_positive_count(self.ljung_box_lags, "ljung_box_lags")?;
        validate_positive_count(self.arch_order, "arch_order")?;
        validate_positive_count(self.forecast_horizon, "forecast_horizon")?;
        validate_positive_count(self.backtest.max_holdout, "backtest.max_holdout")?;
        validate_parameter(
            self.backtest.holdout_fraction,
            0.0,
            1.0,
            "backtest.holdout_fraction",
        )?;
        if self.backtest.min_holdout > self.backtest.max_holdout {
            return Err(ArimaAnalysisError::InvalidParameter {
                parameter: "backtest.min_holdout".to_string(),
                value: self.backtest.min_holdout as f64,
                constraint: format!("<= max_holdout ({})", self.backtest.max_holdout),
            });
        }
        Ok(())
    }
}

/// Builder for [`AnalysisConfig`], starting from the standard preset.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: AnalysisConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a named preset instead of the standard one.
    pub fn from_profile(profile: AnalysisProfile) -> Self {
        Self {
            config: AnalysisConfig::for_profile(profile),
        }
    }

    pub fn max_lag(mut self, lags: usize) -> Self {
        self.config.max_lag = lags;
        self
    }

    pub fn ljung_box_lags(mut self, lags: usize) -> Self {
        self.config.ljung_box_lags = lags;
        self
    }

    pub fn arch_order(mut self, order: usize) -> Self {
        self.config.arch_order = order;
        self
    }

    pub fn forecast_horizon(mut self, horizon: usize) -> Self {
        self.config.forecast_horizon = horizon;
        self
    }

    pub fn backtest(mut self, backtest: BacktestConfig) -> Self {
        self.config.backtest = backtest;
        self
    }

    pub fn chi_square_method(mut self, method: ChiSquareMethod) -> Self {
        self.config.chi_square_method = method;
        self
    }

    /// Returns the configuration without validating it.
    pub fn build(self) -> AnalysisConfig {
        self.config
    }

    /// Returns the configuration after [`AnalysisConfig::validate`].
    pub fn try_build(self) -> ArimaResult<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Environment-based preset selection from `ARIMA_ANALYSIS_PROFILE`.
///
/// Recognised values are `quick`, `standard` and `extended`; anything else,
/// including an unset variable, falls back to the standard preset.
pub fn from_environment() -> AnalysisConfig {
    let profile = std::env::var(PROFILE_ENV_VAR).unwrap_or_else(|_| "standard".to_string());
    match profile.trim().to_ascii_lowercase().as_str() {
        "quick" | "fast" => AnalysisConfig::quick(),
        "extended" | "deep" => AnalysisConfig::extended(),
        "standard" => AnalysisConfig::standard(),
        other => {
            log::warn!(
                "Unknown {} value '{}', using the standard profile",
                PROFILE_ENV_VAR,
                other
            );
            AnalysisConfig::standard()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holdout_size_rule() {
        let backtest = BacktestConfig::default();
        assert_eq!(backtest.holdout_size(10), 3);
        assert_eq!(backtest.holdout_size(45), 4);
        assert_eq!(backtest.holdout_size(250), 12);
        assert_eq!(backtest.holdout_size(0), 3);
    }

    #[test]
    fn test_presets_validate() {
        for profile in [
            AnalysisProfile::Quick,
            AnalysisProfile::Standard,
            AnalysisProfile::Extended,
        ] {
            assert!(AnalysisConfig::for_profile(profile).validate().is_ok());
        }
        assert_eq!(AnalysisConfig::default(), AnalysisConfig::standard());
    }

    #[test]
    fn test_builder() {
        let config = ConfigBuilder::new()
            .max_lag(15)
            .ljung_box_lags(8)
            .arch_order(2)
            .forecast_horizon(3)
            .chi_square_method(ChiSquareMethod::Exact)
            .build();

        assert_eq!(config.max_lag, 15);
        assert_eq!(config.ljung_box_lags, 8);
        assert_eq!(config.arch_order, 2);
        assert_eq!(config.forecast_horizon, 3);
        assert_eq!(config.chi_square_method, ChiSquareMethod::Exact);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(ConfigBuilder::new().forecast_horizon(0).try_build().is_err());
        assert!(ConfigBuilder::new().ljung_box_lags(0).try_build().is_err());

        let inverted = ConfigBuilder::new()
            .backtest(BacktestConfig {
                min_holdout: 10,
                max_holdout: 5,
                holdout_fraction: 0.1,
            })
            .try_build();
        assert!(matches!(
            inverted,
            Err(ArimaAnalysisError::InvalidParameter { .. })
        ));

        let bad_fraction = ConfigBuilder::new()
            .backtest(BacktestConfig {
                holdout_fraction: 1.5,
                ..BacktestConfig::default()
            })
            .try_build();
        assert!(bad_fraction.is_err());
    }
}
