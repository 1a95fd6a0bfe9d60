//! Business-day calendar used to date forecasts
//!
//! Only weekends are skipped. Exchange holidays are not modelled, so a
//! forecast may land on a day the market is closed.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};

/// Whether `date` falls on Monday through Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First business day strictly after `date`
pub fn next_business_day(date: NaiveDate) -> Result<NaiveDate> {
    let mut current = date;
    loop {
        current = current.succ_opt().ok_or_else(|| {
            ForecastError::DataError(format!("No calendar day follows {}", date))
        })?;
        if is_business_day(current) {
            return Ok(current);
        }
    }
}

/// The `count` business days that follow `last`
pub fn business_days_after(last: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(count);
    let mut current = last;
    for _ in 0..count {
        current = next_business_day(current)?;
        dates.push(current);
    }
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekend_detection() {
        assert!(is_business_day(ymd(2024, 1, 5))); // Friday
        assert!(!is_business_day(ymd(2024, 1, 6)));
        assert!(!is_business_day(ymd(2024, 1, 7)));
        assert!(is_business_day(ymd(2024, 1, 8)));
    }

    #[test]
    fn test_next_business_day_skips_weekend() {
        assert_eq!(next_business_day(ymd(2024, 1, 5)).unwrap(), ymd(2024, 1, 8));
        assert_eq!(next_business_day(ymd(2024, 1, 6)).unwrap(), ymd(2024, 1, 8));
        assert_eq!(next_business_day(ymd(2024, 1, 8)).unwrap(), ymd(2024, 1, 9));
    }

    #[test]
    fn test_business_days_after() {
        let dates = business_days_after(ymd(2024, 1, 4), 4).unwrap();
        assert_eq!(
            dates,
            vec![ymd(2024, 1, 5), ymd(2024, 1, 8), ymd(2024, 1, 9), ymd(2024, 1, 10)]
        );
        assert!(business_days_after(ymd(2024, 1, 4), 0).unwrap().is_empty());
    }

    #[test]
    fn test_business_days_after_spans_weekends() {
        let dates = business_days_after(ymd(2024, 2, 1), 10).unwrap();
        assert_eq!(dates.len(), 10);
        assert_eq!(dates.last(), Some(&ymd(2024, 2, 15)));
        assert!(dates.iter().all(|d| is_business_day(*d)));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_holidays_are_not_skipped() {
        // 2024-01-01 is New Year's Day, still a weekday
        let dates = business_days_after(ymd(2023, 12, 29), 1).unwrap();
        assert_eq!(dates, vec![ymd(2024, 1, 1)]);
    }
}
