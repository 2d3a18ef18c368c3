//! Loader for whitespace-separated daily price files.
//!
//! Each non-blank line carries a date token such as `15Oct24` (day, Spanish
//! three-letter month abbreviation, two-digit year in the 2000s) followed by a
//! price written with either a comma or a dot as decimal separator:
//!
//! ```text
//! 14oct24   1520,35
//! 15oct24   1518.90
//! ```
//!
//! Lines that cannot be parsed are skipped with a warning. The resulting
//! series is sorted by date and annotated with per-observation variations.

use crate::errors::{ArimaAnalysisError, ArimaResult};
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A dated closing price.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    pub date: NaiveDate,
    pub price: f64,
}

/// An observation with its change from the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub price: f64,
    /// `price[i] - price[i-1]`, 0 for the first record
    pub variation: f64,
    /// `variation / price[i-1] * 100`, 0 when the previous price is 0 or absent
    pub variation_percent: f64,
}

/// Date-ordered price records.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Sorts the observations by date (stable, so equal dates keep their
    /// input order) and derives the variations.
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);

        let mut records = Vec::with_capacity(observations.len());
        let mut previous: Option<f64> = None;
        for obs in observations {
            let (variation, variation_percent) = match previous {
                Some(prev) => {
                    let variation = obs.price - prev;
                    let percent = if prev == 0.0 { 0.0 } else { variation / prev * 100.0 };
                    (variation, percent)
                }
                None => (0.0, 0.0),
            };
            records.push(PriceRecord {
                date: obs.date,
                price: obs.price,
                variation,
                variation_percent,
            });
            previous = Some(obs.price);
        }
        Self { records }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Prices in date order, the input expected by the analysis routines.
    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// First differences of the prices.
    pub fn differences(&self) -> Vec<f64> {
        crate::math_utils::difference(&self.prices())
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}

/// Month number for a Spanish three-letter abbreviation (case-insensitive).
///
/// Both `set` and `sep` are accepted for September.
pub fn parse_month_abbreviation(token: &str) -> Option<u32> {
    let month = match token.to_lowercase().as_str() {
        "ene" => 1,
        "feb" => 2,
        "mar" => 3,
        "abr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "ago" => 8,
        "set" | "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dic" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parses `DDMonYY` (one- or two-digit day) into a calendar date.
///
/// # Example
/// ```rust
/// use arima_finance::loader::parse_date_token;
/// use chrono::NaiveDate;
///
/// assert_eq!(parse_date_token("15Oct24"), NaiveDate::from_ymd_opt(2024, 10, 15));
/// assert_eq!(parse_date_token("31feb24"), None);
/// ```
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    let day_len = token.chars().take_while(|c| c.is_ascii_digit()).count();
    if !(1..=2).contains(&day_len) || !token.is_ascii() {
        return None;
    }
    let (day_text, rest) = token.split_at(day_len);
    if rest.len() != 5 {
        return None;
    }
    let (month_text, year_text) = rest.split_at(3);
    if !year_text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let day: u32 = day_text.parse().ok()?;
    let month = parse_month_abbreviation(month_text)?;
    let year: i32 = year_text.parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Parses a finite price with a comma or dot decimal separator.
pub fn parse_price_token(token: &str) -> Option<f64> {
    let normalized = token.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Parses one non-blank line into an observation.
///
/// `line_number` is one-based and only used for the error report.
pub fn parse_price_line(line: &str, line_number: usize) -> ArimaResult<Observation> {
    let mut tokens = line.split_whitespace();
    let (date_token, price_token) = match (tokens.next(), tokens.next()) {
        (Some(d), Some(p)) => (d, p),
        _ => {
            return Err(ArimaAnalysisError::ParseError {
                line: line_number,
                reason: "expected a date and a price".to_string(),
            })
        }
    };

    let date = parse_date_token(date_token).ok_or_else(|| ArimaAnalysisError::ParseError {
        line: line_number,
        reason: format!("invalid date token '{}'", date_token),
    })?;
    let price = parse_price_token(price_token).ok_or_else(|| ArimaAnalysisError::ParseError {
        line: line_number,
        reason: format!("invalid price token '{}'", price_token),
    })?;

    Ok(Observation { date, price })
}

/// Parses dataset text, skipping blank and malformed lines.
pub fn parse_price_text(text: &str) -> PriceSeries {
    let mut observations = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_price_line(line, idx + 1) {
            Ok(obs) => observations.push(obs),
            Err(e) => {
                log::warn!("Skipping line: {}", e);
                skipped += 1;
            }
        }
    }

    log::debug!(
        "Parsed {} observations ({} lines skipped)",
        observations.len(),
        skipped
    );
    PriceSeries::from_observations(observations)
}

/// Reads and parses a price file.
pub fn load_price_file<P: AsRef<Path>>(path: P) -> ArimaResult<PriceSeries> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ArimaAnalysisError::io(format!("reading {}", path.display()), e))?;
    let series = parse_price_text(&text);
    log::info!("Loaded {} prices from {}", series.len(), path.display());
    Ok(series)
}
