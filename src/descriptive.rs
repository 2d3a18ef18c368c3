//! Descriptive statistics and IQR outlier screening for price series.
//!
//! Non-finite entries are treated as absent. Every field of the returned value
//! objects is always present; statistics that are undefined for the available
//! sample size are reported as NaN rather than raising.

use crate::math_utils::{
    finite_values, float_ops, float_total_cmp, mean, median_of_sorted, nearest_rank_quantile,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Summary statistics of a univariate sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptiveStats {
    /// Number of finite observations used
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample variance (n - 1 denominator)
    pub variance: f64,
    pub std_dev: f64,
    /// max - min
    pub range: f64,
    /// Coefficient of variation in percent (std_dev / mean * 100)
    pub cv: f64,
    /// Bias-corrected sample skewness
    pub skewness: f64,
    /// Bias-corrected excess kurtosis
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
    /// Nearest-rank first quartile, `sorted[floor(0.25 n)]`
    pub q1: f64,
    /// Nearest-rank third quartile, `sorted[floor(0.75 n)]`
    pub q3: f64,
}

impl DescriptiveStats {
    fn empty() -> Self {
        Self {
            n: 0,
            mean: f64::NAN,
            median: f64::NAN,
            variance: f64::NAN,
            std_dev: f64::NAN,
            range: f64::NAN,
            cv: f64::NAN,
            skewness: f64::NAN,
            kurtosis: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
        }
    }

    fn degenerate(value: f64) -> Self {
        Self {
            n: 1,
            mean: value,
            median: value,
            variance: 0.0,
            std_dev: 0.0,
            range: 0.0,
            cv: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            min: value,
            max: value,
            q1: value,
            q3: value,
        }
    }

    /// Interquartile range `q3 - q1`.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Computes descriptive statistics, ignoring non-finite entries.
///
/// * n = 0: every field NaN except `n`.
/// * n = 1: dispersion and shape statistics are 0, location statistics equal the value.
/// * n ≥ 2: full formulas. Skewness needs n ≥ 3 and kurtosis n ≥ 4, otherwise NaN.
///   A constant sample has zero skewness and kurtosis. `cv` is NaN when the mean is 0.
///
/// # Example
/// ```rust
/// use arima_finance::descriptive::compute_stats;
///
/// let stats = compute_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
/// assert_eq!(stats.n, 8);
/// assert!((stats.mean - 5.0).abs() < 1e-12);
/// assert_eq!(stats.q1, 4.0);
/// ```
pub fn compute_stats(values: &[f64]) -> DescriptiveStats {
    let mut sorted = finite_values(values);
    let n = sorted.len();

    match n {
        0 => return DescriptiveStats::empty(),
        1 => return DescriptiveStats::degenerate(sorted[0]),
        _ => {}
    }

    sorted.sort_by(float_total_cmp);

    let m = mean(&sorted);
    let variance = sorted.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    let min = sorted[0];
    let max = sorted[n - 1];

    let raw_ss = float_ops::raw_sum_of_squares(&sorted);
    let nf = n as f64;
    let constant = float_ops::negligible_spread(variance * (nf - 1.0), raw_ss);

    // Mean is zero when m² is negligible against the mean square of the sample
    let cv = if !m.is_finite() || float_ops::negligible_spread(nf * m * m, raw_ss) {
        f64::NAN
    } else {
        std_dev / m * 100.0
    };

    let skewness = if n < 3 {
        f64::NAN
    } else if constant {
        0.0
    } else {
        let s3 = sorted.iter().map(|x| ((x - m) / std_dev).powi(3)).sum::<f64>();
        nf / ((nf - 1.0) * (nf - 2.0)) * s3
    };

    let kurtosis = if n < 4 {
        f64::NAN
    } else if constant {
        0.0
    } else {
        let s4 = sorted.iter().map(|x| ((x - m) / std_dev).powi(4)).sum::<f64>();
        let lead = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));
        let correction = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
        lead * s4 - correction
    };

    DescriptiveStats {
        n,
        mean: m,
        median: median_of_sorted(&sorted),
        variance,
        std_dev,
        range: max - min,
        cv,
        skewness,
        kurtosis,
        min,
        max,
        q1: nearest_rank_quantile(&sorted, 0.25),
        q3: nearest_rank_quantile(&sorted, 0.75),
    }
}

/// Which fence an outlier crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutlierSide {
    /// Below `q1 - 1.5 * iqr`
    Below,
    /// Above `q3 + 1.5 * iqr`
    Above,
}

impl OutlierSide {
    /// Lower-case tag, "below" or "above".
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierSide::Below => "below",
            OutlierSide::Above => "above",
        }
    }
}

/// A single flagged observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Outlier {
    /// Position in the caller's input slice
    pub index: usize,
    pub value: f64,
    pub side: OutlierSide,
}

/// Tukey fences and the observations outside them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutlierReport {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub outliers: Vec<Outlier>,
}

/// Detect outliers using the 1.5×IQR rule on nearest-rank quartiles.
///
/// Quartiles are computed over the finite entries; indices in the report refer
/// to the original slice. Non-finite entries are never flagged.
pub fn detect_outliers(values: &[f64]) -> OutlierReport {
    let stats = compute_stats(values);
    let iqr = stats.iqr();
    let lower_bound = stats.q1 - 1.5 * iqr;
    let upper_bound = stats.q3 + 1.5 * iqr;

    let outliers = if lower_bound.is_finite() && upper_bound.is_finite() {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .filter_map(|(index, &value)| {
                if value < lower_bound {
                    Some(Outlier {
                        index,
                        value,
                        side: OutlierSide::Below,
                    })
                } else if value > upper_bound {
                    Some(Outlier {
                        index,
                        value,
                        side: OutlierSide::Above,
                    })
                } else {
                    None
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    OutlierReport {
        q1: stats.q1,
        q3: stats.q3,
        iqr,
        lower_bound,
        upper_bound,
        outliers,
    }
}

/// Statistics of a price series and of its first differences.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelAndDifferenceStats {
    pub levels: DescriptiveStats,
    pub differences: DescriptiveStats,
}

/// Summarizes price levels together with their first differences.
pub fn summarize_prices_and_differences(prices: &[f64]) -> LevelAndDifferenceStats {
    LevelAndDifferenceStats {
        levels: compute_stats(prices),
        differences: compute_stats(&crate::math_utils::difference(prices)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_empty_input_is_all_nan() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.n, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.q3.is_nan());
        assert!(stats.kurtosis.is_nan());

        let only_nan = compute_stats(&[f64::NAN, f64::INFINITY]);
        assert_eq!(only_nan.n, 0);
    }

    #[test]
    fn test_single_value_is_degenerate() {
        let stats = compute_stats(&[f64::NAN, 42.5]);
        assert_eq!(stats.n, 1);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.kurtosis, 0.0);
        for v in [stats.mean, stats.median, stats.min, stats.max, stats.q1, stats.q3] {
            assert_eq!(v, 42.5);
        }
    }

    #[test]
    fn test_full_formulas() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = compute_stats(&data);

        assert_approx_eq!(stats.mean, 5.0, 1e-12);
        assert_approx_eq!(stats.variance, 32.0 / 7.0, 1e-12);
        assert_approx_eq!(stats.median, 4.5, 1e-12);
        assert_approx_eq!(stats.range, 7.0, 1e-12);
        assert_approx_eq!(stats.cv, (32.0f64 / 7.0).sqrt() / 5.0 * 100.0, 1e-10);

        // Bias-corrected moments computed by hand for this sample
        let sd = (32.0f64 / 7.0).sqrt();
        let s3: f64 = data.iter().map(|x| ((x - 5.0) / sd).powi(3)).sum();
        let s4: f64 = data.iter().map(|x| ((x - 5.0) / sd).powi(4)).sum();
        assert_approx_eq!(stats.skewness, 8.0 / (7.0 * 6.0) * s3, 1e-12);
        assert_approx_eq!(
            stats.kurtosis,
            8.0 * 9.0 / (7.0 * 6.0 * 5.0) * s4 - 3.0 * 49.0 / (6.0 * 5.0),
            1e-12
        );
        assert_eq!(stats.q1, 4.0);
        assert_eq!(stats.q3, 7.0);
    }

    #[test]
    fn test_small_sample_shape_guards() {
        let two = compute_stats(&[1.0, 3.0]);
        assert!(two.skewness.is_nan());
        assert!(two.kurtosis.is_nan());
        assert_approx_eq!(two.variance, 2.0, 1e-12);

        let three = compute_stats(&[1.0, 2.0, 6.0]);
        assert!(three.skewness.is_finite());
        assert!(three.kurtosis.is_nan());
    }

    #[test]
    fn test_constant_and_zero_mean_samples() {
        let constant = compute_stats(&[3.0; 6]);
        assert_eq!(constant.variance, 0.0);
        assert_eq!(constant.skewness, 0.0);
        assert_eq!(constant.kurtosis, 0.0);
        assert_eq!(constant.cv, 0.0);

        let zero_mean = compute_stats(&[-1.0, 1.0, -1.0, 1.0]);
        assert!(zero_mean.cv.is_nan());
    }

    #[test]
    fn test_shape_statistics_do_not_depend_on_units() {
        let base = [1.0, 2.0, 3.0, 10.0, 4.0, 6.0, 2.5, 8.0];
        let reference = compute_stats(&base);
        assert!(reference.skewness.abs() > 0.5);

        for scale in [1e-9, 1e-12, 1e9] {
            let scaled: Vec<f64> = base.iter().map(|x| x * scale).collect();
            let stats = compute_stats(&scaled);
            assert_approx_eq!(stats.skewness, reference.skewness, 1e-9);
            assert_approx_eq!(stats.kurtosis, reference.kurtosis, 1e-9);
            assert_approx_eq!(stats.cv, reference.cv, 1e-7);
        }

        let tiny_constant = compute_stats(&[3e-10; 6]);
        assert_eq!(tiny_constant.skewness, 0.0);
        assert_eq!(tiny_constant.kurtosis, 0.0);
    }

    #[test]
    fn test_detect_outliers_flags_above() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let report = detect_outliers(&data);

        assert_eq!(report.q1, 2.0);
        assert_eq!(report.q3, 5.0);
        assert_approx_eq!(report.upper_bound, 9.5, 1e-12);
        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outliers[0].index, 5);
        assert_eq!(report.outliers[0].value, 100.0);
        assert_eq!(report.outliers[0].side, OutlierSide::Above);
        assert_eq!(report.outliers[0].side.as_str(), "above");
    }

    #[test]
    fn test_detect_outliers_below_and_original_indices() {
        let data = vec![f64::NAN, -80.0, 10.0, 11.0, 12.0, 13.0, 14.0];
        let report = detect_outliers(&data);
        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outliers[0].index, 1);
        assert_eq!(report.outliers[0].side, OutlierSide::Below);

        assert!(detect_outliers(&[]).outliers.is_empty());
    }

    #[test]
    fn test_level_and_difference_summary() {
        let summary = summarize_prices_and_differences(&[10.0, 11.0, 13.0, 16.0]);
        assert_eq!(summary.levels.n, 4);
        assert_eq!(summary.differences.n, 3);
        assert_approx_eq!(summary.differences.mean, 2.0, 1e-12);
    }
}
