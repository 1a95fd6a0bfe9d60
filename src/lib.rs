//! # Lagcast
//!
//! `lagcast` bundles the workspace crates behind one import:
//!
//! - [`trade_math`]: trading-calendar periods and rolling return metrics
//! - [`seq_forecast`]: the LSTM sequence forecaster for price series
//!
//! ```no_run
//! use lagcast::seq_forecast::{PriceSeries, SequenceForecaster};
//!
//! # fn run(series: PriceSeries) -> lagcast::seq_forecast::Result<()> {
//! let mut forecaster = SequenceForecaster::new(series);
//! forecaster.set_horizon(21)?;
//! forecaster.train(21, 10)?;
//! let forecast = forecaster.forecast()?;
//! println!("{:?}", forecast.payload());
//! # Ok(())
//! # }
//! ```

pub use seq_forecast;
pub use trade_math;

pub use seq_forecast::{ForecastError, PriceSeries, SequenceForecaster};
pub use trade_math::TradingPeriods;
