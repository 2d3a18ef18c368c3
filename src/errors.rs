//! Error types and validation functions for price-series analysis.
//!
//! The numerical engine itself never fails: degenerate inputs surface as NaN
//! fields in the returned value objects. The error types in this module are used
//! at the outer surfaces only, namely dataset loading, configuration validation
//! and the pipeline analyzer.

use std::sync::Arc;
use thiserror::Error;

/// Error types for the outer surfaces of the analysis engine.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ArimaAnalysisError {
    /// Insufficient data for the requested analysis.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid parameter value for analysis configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical computation error.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },

    /// A dataset line could not be interpreted.
    #[error("Parse error on line {line}: {reason}")]
    ParseError {
        /// One-based line number in the source text
        line: usize,
        /// Why the line was rejected
        reason: String,
    },

    /// I/O operation error.
    #[error("I/O operation failed: {operation}")]
    IoError {
        /// I/O operation that failed
        operation: String,
        /// Underlying error if available
        #[source]
        source: Option<Arc<std::io::Error>>,
    },
}

/// Result type for the fallible surfaces of the crate.
pub type ArimaResult<T> = Result<T, ArimaAnalysisError>;

/// Validates that data has sufficient length for analysis.
///
/// # Example
/// ```rust
/// use arima_finance::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2, "test").is_ok());
/// assert!(validate_data_length(&data, 5, "test").is_err());
/// ```
pub fn validate_data_length(data: &[f64], min_required: usize, operation: &str) -> ArimaResult<()> {
    if data.len() < min_required {
        log::debug!(
            "{}: {} observations available, {} required",
            operation,
            data.len(),
            min_required
        );
        Err(ArimaAnalysisError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is within expected bounds (inclusive).
///
/// # Example
/// ```rust
/// use arima_finance::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, -1.0, 1.0, "phi").is_ok());
/// assert!(validate_parameter(1.5, -1.0, 1.0, "phi").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> ArimaResult<()> {
    if value.is_nan() {
        return Err(ArimaAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(ArimaAnalysisError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: Some("validate_parameter".to_string()),
        });
    }

    if value < min || value > max {
        Err(ArimaAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a count-like parameter is strictly positive.
pub fn validate_positive_count(value: usize, name: &str) -> ArimaResult<()> {
    if value == 0 {
        Err(ArimaAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value: 0.0,
            constraint: "must be > 0".to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> ArimaResult<()> {
    if !value.is_finite() {
        Err(ArimaAnalysisError::NumericalError {
            reason: format!("{} is not finite: {}", name, value),
            operation: Some("validate_finite".to_string()),
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first offending element, reporting its index and the
/// operation that produced or consumed the slice.
pub fn validate_all_finite(data: &[f64], name: &str, operation: &str) -> ArimaResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };

        return Err(ArimaAnalysisError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value_desc
            ),
            operation: Some(operation.to_string()),
        });
    }

    Ok(())
}

impl ArimaAnalysisError {
    /// Wraps an I/O failure together with the operation that triggered it.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        ArimaAnalysisError::IoError {
            operation: operation.into(),
            source: Some(Arc::new(source)),
        }
    }
}
