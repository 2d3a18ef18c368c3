//! Synthetic price series generators for testing and validation.
//!
//! Series with known structure are needed to check that the fitters recover
//! their parameters and that the residual tests hold their nominal size:
//!
//! - **White noise**: independent Gaussian draws
//! - **Random walk prices**: cumulative sum of white-noise differences
//! - **AR(1)-difference prices**: prices whose first differences follow
//!   `Δy_t = φ Δy_{t-1} + ε_t`, i.e. an ARIMA(1,1,0) path
//!
//! All generators draw from a ChaCha20 stream, seeded when
//! [`GeneratorConfig::seed`] is set and from OS entropy otherwise.

use crate::errors::{
    validate_all_finite, validate_finite, validate_parameter, validate_positive_count,
    ArimaAnalysisError, ArimaResult,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Draws discarded before recording an AR(1) path so the start-up value
/// does not dominate the first differences.
const AR1_BURN_IN: usize = 100;

/// Common generation parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Number of values produced
    pub length: usize,
    /// Random seed for reproducible generation
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 250,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Reproducible configuration.
    pub fn seeded(length: usize, seed: u64) -> Self {
        Self {
            length,
            seed: Some(seed),
        }
    }

    fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

/// Parameters of an ARIMA(1,1,0) price path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ar1PathConfig {
    /// AR coefficient of the differences, |φ| < 1
    pub phi: f64,
    /// Innovation standard deviation
    pub sigma: f64,
    /// First price of the path
    pub start_price: f64,
}

impl Default for Ar1PathConfig {
    fn default() -> Self {
        Self {
            phi: 0.3,
            sigma: 1.0,
            start_price: 100.0,
        }
    }
}

fn normal(std_dev: f64) -> ArimaResult<Normal<f64>> {
    validate_parameter(std_dev, 0.0, f64::MAX, "standard deviation")?;
    Normal::new(0.0, std_dev).map_err(|e| ArimaAnalysisError::InvalidParameter {
        parameter: "standard deviation".to_string(),
        value: std_dev,
        constraint: e.to_string(),
    })
}

/// Independent N(0, std_dev²) draws.
///
/// # Example
/// ```rust
/// use arima_finance::generators::{generate_white_noise, GeneratorConfig};
///
/// let a = generate_white_noise(&GeneratorConfig::seeded(100, 42), 1.0).unwrap();
/// let b = generate_white_noise(&GeneratorConfig::seeded(100, 42), 1.0).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn generate_white_noise(config: &GeneratorConfig, std_dev: f64) -> ArimaResult<Vec<f64>> {
    let dist = normal(std_dev)?;
    let mut rng = config.rng();
    let noise: Vec<f64> = (0..config.length).map(|_| dist.sample(&mut rng)).collect();
    validate_all_finite(&noise, "white noise", "generate_white_noise")?;
    Ok(noise)
}

/// Random-walk prices: `y_0 = start_price`, `y_t = y_{t-1} + ε_t`.
pub fn generate_random_walk_prices(
    config: &GeneratorConfig,
    start_price: f64,
    sigma: f64,
) -> ArimaResult<Vec<f64>> {
    validate_positive_count(config.length, "length")?;
    validate_finite(start_price, "start_price")?;
    let dist = normal(sigma)?;
    let mut rng = config.rng();

    let mut prices = Vec::with_capacity(config.length);
    let mut level = start_price;
    prices.push(level);
    for _ in 1..config.length {
        level += dist.sample(&mut rng);
        prices.push(level);
    }
    validate_all_finite(&prices, "prices", "generate_random_walk_prices")?;
    Ok(prices)
}

/// ARIMA(1,1,0) prices of length `config.length` starting at `start_price`.
pub fn generate_ar1_difference_prices(
    config: &GeneratorConfig,
    path: &Ar1PathConfig,
) -> ArimaResult<Vec<f64>> {
    validate_positive_count(config.length, "length")?;
    validate_parameter(path.phi, -0.999, 0.999, "phi")?;
    validate_finite(path.start_price, "start_price")?;
    let dist = normal(path.sigma)?;
    let mut rng = config.rng();

    let mut diff = 0.0;
    for _ in 0..AR1_BURN_IN {
        diff = path.phi * diff + dist.sample(&mut rng);
    }

    let mut prices = Vec::with_capacity(config.length);
    let mut level = path.start_price;
    prices.push(level);
    for _ in 1..config.length {
        diff = path.phi * diff + dist.sample(&mut rng);
        level += diff;
        prices.push(level);
    }
    validate_all_finite(&prices, "prices", "generate_ar1_difference_prices")?;
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::{difference, mean, sample_variance};

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let config = GeneratorConfig::seeded(50, 3);
        let a = generate_ar1_difference_prices(&config, &Ar1PathConfig::default()).unwrap();
        let b = generate_ar1_difference_prices(&config, &Ar1PathConfig::default()).unwrap();
        assert_eq!(a, b);

        let c = generate_ar1_difference_prices(
            &GeneratorConfig::seeded(50, 4),
            &Ar1PathConfig::default(),
        )
        .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_white_noise_moments() {
        let noise = generate_white_noise(&GeneratorConfig::seeded(5000, 1), 2.0).unwrap();
        assert_eq!(noise.len(), 5000);
        assert!(mean(&noise).abs() < 0.15);
        assert!((sample_variance(&noise) - 4.0).abs() < 0.4);
    }

    #[test]
    fn test_paths_start_at_requested_price() {
        let walk =
            generate_random_walk_prices(&GeneratorConfig::seeded(20, 9), 250.0, 1.0).unwrap();
        assert_eq!(walk.len(), 20);
        assert_eq!(walk[0], 250.0);

        let path = Ar1PathConfig {
            start_price: 80.0,
            ..Ar1PathConfig::default()
        };
        let prices =
            generate_ar1_difference_prices(&GeneratorConfig::seeded(20, 9), &path).unwrap();
        assert_eq!(prices[0], 80.0);
        assert_eq!(difference(&prices).len(), 19);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let config = GeneratorConfig::seeded(10, 1);
        assert!(generate_white_noise(&config, -1.0).is_err());
        assert!(generate_random_walk_prices(&GeneratorConfig::seeded(0, 1), 1.0, 1.0).is_err());
        let explosive = Ar1PathConfig {
            phi: 1.5,
            ..Ar1PathConfig::default()
        };
        assert!(generate_ar1_difference_prices(&config, &explosive).is_err());
    }

    #[test]
    fn test_overflowing_paths_are_rejected() {
        let config = GeneratorConfig::seeded(200, 1);
        match generate_random_walk_prices(&config, 0.0, f64::MAX) {
            Err(ArimaAnalysisError::NumericalError { reason, operation }) => {
                assert!(reason.contains("prices"));
                assert_eq!(operation.as_deref(), Some("generate_random_walk_prices"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }

        let wide = Ar1PathConfig {
            sigma: f64::MAX,
            ..Ar1PathConfig::default()
        };
        assert!(matches!(
            generate_ar1_difference_prices(&config, &wide),
            Err(ArimaAnalysisError::NumericalError { .. })
        ));
        assert!(generate_white_noise(&config, f64::MAX).is_err());
    }
}
