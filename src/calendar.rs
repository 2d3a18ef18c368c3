//! Weekday-only calendar stepping used to date forecast horizons.
//!
//! Only Saturdays and Sundays are skipped; no holiday calendar is applied.

use chrono::{Datelike, NaiveDate, Weekday};

/// Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Next weekday strictly after `date`, `None` past the end of the calendar.
pub fn next_business_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut current = date.succ_opt()?;
    while !is_business_day(current) {
        current = current.succ_opt()?;
    }
    Some(current)
}

/// Advances `date` by `n` business days.
///
/// `n = 0` returns `date` unchanged even when it falls on a weekend. Stepping
/// stops at the last representable date.
///
/// # Example
/// ```rust
/// use arima_finance::calendar::add_business_days;
/// use chrono::NaiveDate;
///
/// let friday = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
/// let monday = NaiveDate::from_ymd_opt(2024, 10, 21).unwrap();
/// assert_eq!(add_business_days(friday, 1), monday);
/// ```
pub fn add_business_days(date: NaiveDate, n: usize) -> NaiveDate {
    let mut current = date;
    for _ in 0..n {
        match next_business_day(current) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// The `count` business days following `date`, in order.
pub fn business_days_after(date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = date;
    for _ in 0..count {
        match next_business_day(current) {
            Some(next) => {
                dates.push(next);
                current = next;
            }
            None => break,
        }
    }
    dates
}
