//! Accuracy of a forecast against realised prices

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point-forecast error measures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, over non-zero actuals
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

/// Compare `forecast` with `actual` position by position
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::DataError(format!(
            "Forecast ({}) and actual ({}) must have the same non-zero length",
            forecast.len(),
            actual.len()
        )));
    }

    let n = forecast.len() as f64;
    let pairs = || forecast.iter().zip(actual).map(|(&f, &a)| (f, a));

    let mae = pairs().map(|(f, a)| (a - f).abs()).sum::<f64>() / n;
    let mse = pairs().map(|(f, a)| (a - f).powi(2)).sum::<f64>() / n;

    let nonzero = pairs().filter(|(_, a)| *a != 0.0).count();
    let mape = if nonzero == 0 {
        0.0
    } else {
        pairs()
            .filter(|(_, a)| *a != 0.0)
            .map(|(f, a)| ((a - f) / a).abs() * 100.0)
            .sum::<f64>()
            / nonzero as f64
    };

    let smape = pairs()
        .map(|(f, a)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape,
    })
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}
