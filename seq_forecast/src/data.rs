//! Price series input and date-indexed forecast tables

use crate::error::{ForecastError, Result};
use crate::calendar::is_business_day;
use chrono::NaiveDate;
use polars::prelude::*;
use serde_json::{Map, Value};
use tracing::warn;

/// Column holding the held-out evaluation predictions produced by `train`
pub const PREDICTION_COLUMN: &str = "Prediction";
/// Column holding forward forecasts produced by `forecast`
pub const FORECAST_COLUMN: &str = "Forecast";
/// Name of the date column in every exported frame
pub const DATE_COLUMN: &str = "date";

/// Ordered (date, price) observations, strictly increasing by date
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl PriceSeries {
    /// Create a validated series
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.is_empty() {
            return Err(ForecastError::DataError("Empty price series".to_string()));
        }
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Non-finite price at {}",
                dates[pos]
            )));
        }

        let weekend_days = dates.iter().filter(|d| !is_business_day(**d)).count();
        if weekend_days > 0 {
            warn!(
                weekend_days,
                "price series contains weekend dates; forecasts assume business-day spacing"
            );
        }

        Ok(Self {
            name: name.into(),
            dates,
            values,
        })
    }

    /// Read a series out of a DataFrame with a Date/Datetime column and a numeric column
    pub fn from_dataframe(df: &DataFrame, date_column: &str, value_column: &str) -> Result<Self> {
        let date_col = df.column(date_column)?;
        let dates: Vec<Option<NaiveDate>> = match date_col.dtype() {
            DataType::Date => date_col.date()?.as_date_iter().collect(),
            DataType::Datetime(_, _) => date_col
                .datetime()?
                .as_datetime_iter()
                .map(|dt| dt.map(|dt| dt.date()))
                .collect(),
            other => {
                return Err(ForecastError::DataError(format!(
                    "Column '{}' has type {}, expected a date",
                    date_column, other
                )))
            }
        };

        let value_col = df.column(value_column)?.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = value_col.f64()?.into_iter().collect();

        let dates = dates
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                d.ok_or_else(|| ForecastError::DataError(format!("Missing date at row {}", i)))
            })
            .collect::<Result<Vec<_>>>()?;
        let values = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| ForecastError::DataError(format!("Missing price at row {}", i)))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(value_column, dates, values)
    }

    /// Export as a two-column DataFrame
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN, self.dates.as_slice()),
            Series::new(&self.name, self.values.as_slice()),
        ])?;
        Ok(df)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// The final `n` prices, or an error if fewer exist
    pub fn tail(&self, n: usize) -> Result<&[f64]> {
        if n > self.len() {
            return Err(ForecastError::InsufficientData {
                required: n,
                available: self.len(),
            });
        }
        Ok(&self.values[self.len() - n..])
    }
}

/// Date-indexed result of `train` or `forecast`.
///
/// `actual` carries the input prices where known; `values` is the payload
/// column named by `column`. Both are `None` where undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    dates: Vec<NaiveDate>,
    series_name: String,
    actual: Vec<Option<f64>>,
    column: String,
    values: Vec<Option<f64>>,
}

impl ForecastTable {
    /// Lay `payload` over the last dates of `dates`, leaving earlier rows null
    pub(crate) fn aligned(
        dates: Vec<NaiveDate>,
        series: &PriceSeries,
        column: &str,
        payload: &[f64],
    ) -> Result<Self> {
        if payload.len() > dates.len() {
            return Err(ForecastError::DataError(format!(
                "Payload length ({}) exceeds table length ({})",
                payload.len(),
                dates.len()
            )));
        }

        let mut actual: Vec<Option<f64>> = series.values().iter().copied().map(Some).collect();
        actual.resize(dates.len(), None);

        let mut values = vec![None; dates.len() - payload.len()];
        values.extend(payload.iter().copied().map(Some));

        Ok(Self {
            dates,
            series_name: series.name().to_string(),
            actual,
            column: column.to_string(),
            values,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Input prices aligned with `dates`
    pub fn actual(&self) -> &[Option<f64>] {
        &self.actual
    }

    /// Name of the payload column
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// The dated rows that carry a payload value
    pub fn payload(&self) -> Vec<(NaiveDate, f64)> {
        self.dates
            .iter()
            .zip(&self.values)
            .filter_map(|(d, v)| v.map(|v| (*d, v)))
            .collect()
    }

    /// Export as a DataFrame with date, input and payload columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN, self.dates.as_slice()),
            Series::new(&self.series_name, self.actual.as_slice()),
            Series::new(&self.column, self.values.as_slice()),
        ])?;
        Ok(df)
    }

    /// Serialize as a JSON array of row objects
    pub fn to_json(&self) -> Result<String> {
        let rows: Vec<Value> = self
            .dates
            .iter()
            .zip(&self.actual)
            .zip(&self.values)
            .map(|((date, actual), value)| -> Result<Value> {
                let mut row = Map::new();
                row.insert(DATE_COLUMN.to_string(), Value::String(date.to_string()));
                row.insert(self.series_name.clone(), serde_json::to_value(actual)?);
                row.insert(self.column.clone(), serde_json::to_value(value)?);
                Ok(Value::Object(row))
            })
            .collect::<Result<_>>()?;

        Ok(serde_json::to_string(&rows)?)
    }
}
