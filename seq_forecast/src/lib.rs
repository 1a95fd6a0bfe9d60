//! # Seq Forecast
//!
//! Sliding-window sequence forecasting of equity price series.
//!
//! ## Features
//!
//! - Min-max scaling fitted once per training run and reused for forecasts
//! - Look-back / horizon windowing with a held-out evaluation window
//! - A single-layer LSTM regressor behind the [`SequenceModel`] trait
//! - Business-day dated forecasts (weekends skipped, holidays not modelled)
//! - Results as date-indexed tables exportable to Polars or JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use seq_forecast::calendar::business_days_after;
//! use seq_forecast::{ForecasterConfig, PriceSeries, SequenceForecaster};
//!
//! # fn main() -> seq_forecast::Result<()> {
//! let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
//! let mut dates = vec![start];
//! dates.extend(business_days_after(start, 299)?);
//! let prices = (0..300).map(|i| 100.0 + i as f64).collect();
//! let series = PriceSeries::new("Close", dates, prices)?;
//!
//! let config = ForecasterConfig::default().with_horizon(21);
//! let mut forecaster = SequenceForecaster::with_config(series, config)?;
//!
//! // Held-out predictions for the last 21 sessions
//! let evaluation = forecaster.train(21, 10)?;
//! assert_eq!(evaluation.non_null_count(), 21);
//!
//! // The next 21 business days
//! let forecast = forecaster.forecast()?;
//! for (date, price) in forecast.payload() {
//!     println!("{}: {:.2}", date, price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod scaler;
pub mod windowing;

// Re-export commonly used types
pub use crate::config::ForecasterConfig;
pub use crate::data::{ForecastTable, PriceSeries, FORECAST_COLUMN, PREDICTION_COLUMN};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{SequenceForecaster, TrainingState};
pub use crate::metrics::ForecastAccuracy;
pub use crate::models::{LstmRegressor, SequenceModel};
pub use crate::scaler::{MinMaxScaler, ScalerState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
