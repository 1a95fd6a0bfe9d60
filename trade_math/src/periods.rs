//! Trading-calendar period lengths
//!
//! Windows throughout the workspace are expressed in trading days. The
//! defaults follow the usual US equity calendar of 21 sessions a month and
//! 252 a year.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Trading days in one calendar month
pub const TDAYS_PER_MONTH: usize = 21;

/// Trading days in one calendar year
pub const TDAYS_PER_YEAR: usize = 252;

/// Immutable set of period lengths, passed to whatever needs them.
///
/// Deserialization goes through [`TradingPeriods::new`], so a decoded value
/// holds the same invariants as a constructed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PeriodLengths")]
pub struct TradingPeriods {
    days_per_month: usize,
    days_per_year: usize,
}

impl TradingPeriods {
    /// Create a custom calendar
    pub fn new(days_per_month: usize, days_per_year: usize) -> Result<Self> {
        if days_per_month == 0 || days_per_year == 0 {
            return Err(MathError::InvalidInput(
                "Period lengths must be greater than zero".to_string(),
            ));
        }
        if days_per_month > days_per_year {
            return Err(MathError::InvalidInput(format!(
                "A month ({}) cannot be longer than a year ({})",
                days_per_month, days_per_year
            )));
        }

        Ok(Self {
            days_per_month,
            days_per_year,
        })
    }

    pub fn days_per_month(&self) -> usize {
        self.days_per_month
    }

    pub fn days_per_year(&self) -> usize {
        self.days_per_year
    }

    /// Length in trading days of a window spanning `months` months
    pub fn months_to_days(&self, months: usize) -> usize {
        months * self.days_per_month
    }

    /// Multiplier that scales a daily standard deviation to a yearly one
    pub fn annualization_factor(&self) -> f64 {
        (self.days_per_year as f64).sqrt()
    }
}

/// Unchecked wire form of [`TradingPeriods`]
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodLengths {
    pub days_per_month: usize,
    pub days_per_year: usize,
}

impl TryFrom<PeriodLengths> for TradingPeriods {
    type Error = MathError;

    fn try_from(raw: PeriodLengths) -> Result<Self> {
        Self::new(raw.days_per_month, raw.days_per_year)
    }
}

impl Default for TradingPeriods {
    fn default() -> Self {
        Self {
            days_per_month: TDAYS_PER_MONTH,
            days_per_year: TDAYS_PER_YEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_calendar() {
        let periods = TradingPeriods::default();
        assert_eq!(periods.days_per_month(), 21);
        assert_eq!(periods.days_per_year(), 252);
        assert_eq!(periods.months_to_days(3), 63);
        assert_relative_eq!(periods.annualization_factor(), 252_f64.sqrt());
    }

    #[test]
    fn test_invalid_calendar() {
        assert!(TradingPeriods::new(0, 252).is_err());
        assert!(TradingPeriods::new(21, 0).is_err());
        assert!(TradingPeriods::new(30, 20).is_err());
        assert!(TradingPeriods::new(20, 250).is_ok());
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let periods: TradingPeriods =
            serde_json::from_str(r#"{"days_per_month":4,"days_per_year":48}"#).unwrap();
        assert_eq!(periods, TradingPeriods::new(4, 48).unwrap());

        let zero = serde_json::from_str::<TradingPeriods>(r#"{"days_per_month":0,"days_per_year":0}"#);
        assert!(zero.unwrap_err().to_string().contains("greater than zero"));

        let long_month =
            serde_json::from_str::<TradingPeriods>(r#"{"days_per_month":300,"days_per_year":252}"#);
        assert!(long_month.is_err());

        let json = serde_json::to_string(&TradingPeriods::default()).unwrap();
        assert_eq!(json, r#"{"days_per_month":21,"days_per_year":252}"#);
    }
}
