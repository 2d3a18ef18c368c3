//! # Analysis Results Structures
//!
//! The report produced by one run of the Box-Jenkins pipeline. Every stage's
//! output is kept as the plain value object its module returns so callers can
//! render or post-process any part of it.

use crate::{
    autocorrelation::Correlogram,
    descriptive::{LevelAndDifferenceStats, OutlierReport},
    forecasting::{BacktestResult, ForecastPoint},
    model_selection::RankedModel,
    models::{FittedModel, ModelKind},
    statistical_tests::{AdfResult, ResidualDiagnostics},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unit-root results for the price levels and their first differences.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationarityAssessment {
    pub levels: AdfResult,
    pub differences: AdfResult,
}

impl StationarityAssessment {
    /// Levels look non-stationary while their differences look stationary,
    /// which is the situation d = 1 is meant for.
    pub fn supports_first_differencing(&self) -> bool {
        !self.levels.is_stationary && self.differences.is_stationary
    }
}

/// Complete output of [`crate::analyzer::BoxJenkinsAnalyzer::analyze`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisReport {
    /// Finite prices that entered the analysis
    pub observations: usize,
    /// Moments and quartiles of levels and differences
    pub summary: LevelAndDifferenceStats,
    pub level_outliers: OutlierReport,
    pub difference_outliers: OutlierReport,
    /// Correlogram of the first differences
    pub correlogram: Correlogram,
    pub stationarity: StationarityAssessment,
    /// Every candidate fit, in fitting order
    pub candidates: Vec<FittedModel>,
    /// Rankable candidates by AIC then BIC
    pub ranking: Vec<RankedModel>,
    /// Residual tests of the top-ranked model
    pub diagnostics: Option<ResidualDiagnostics>,
    /// The ARIMA(1,1,0) fit driving the forecast
    pub forecast_model: FittedModel,
    pub forecast: Vec<ForecastPoint>,
    pub backtest: BacktestResult,
    /// Conditions a reader of the report should be aware of
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    /// The top-ranked candidate, if any candidate could be ranked.
    pub fn selected(&self) -> Option<&RankedModel> {
        self.ranking.first()
    }

    pub fn selected_kind(&self) -> Option<ModelKind> {
        self.selected().map(|r| r.model.kind)
    }

    /// Candidate fit of the given family.
    pub fn candidate(&self, kind: ModelKind) -> Option<&FittedModel> {
        self.candidates.iter().find(|m| m.kind == kind)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
