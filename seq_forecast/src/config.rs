//! Forecaster configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use trade_math::TradingPeriods;

/// Tunables for a [`SequenceForecaster`](crate::SequenceForecaster) and the
/// model it builds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    /// Trading calendar used for default window lengths
    pub periods: TradingPeriods,
    /// Forecast horizon; defaults to one trading year
    pub horizon: Option<usize>,
    /// Recurrent units; defaults to the look-back length
    pub hidden_size: Option<usize>,
    /// Adam step size
    pub learning_rate: f64,
    /// Windows per gradient step
    pub batch_size: usize,
    /// Global gradient-norm ceiling
    pub gradient_clip: Option<f64>,
    /// Seed for weight initialization and batch shuffling
    pub seed: u64,
    /// Target range of the min-max scaler
    pub feature_range: (f64, f64),
}

impl ForecasterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_periods(mut self, periods: TradingPeriods) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = Some(hidden_size);
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_gradient_clip(mut self, clip: Option<f64>) -> Self {
        self.gradient_clip = clip;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_feature_range(mut self, low: f64, high: f64) -> Self {
        self.feature_range = (low, high);
        self
    }

    /// Horizon to forecast, falling back to the calendar year
    pub fn resolved_horizon(&self) -> usize {
        self.horizon.unwrap_or_else(|| self.periods.days_per_year())
    }

    /// Hidden width for a model reading `lags` inputs
    pub fn resolved_hidden_size(&self, lags: usize) -> usize {
        self.hidden_size.unwrap_or(lags)
    }

    pub fn validate(&self) -> Result<()> {
        TradingPeriods::new(self.periods.days_per_month(), self.periods.days_per_year())
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        if self.horizon == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be greater than zero".to_string(),
            ));
        }
        if self.hidden_size == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "Hidden size must be greater than zero".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "Learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Batch size must be greater than zero".to_string(),
            ));
        }
        if let Some(clip) = self.gradient_clip {
            if !(clip > 0.0 && clip.is_finite()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Gradient clip must be positive, got {}",
                    clip
                )));
            }
        }
        let (low, high) = self.feature_range;
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(ForecastError::InvalidParameter(format!(
                "Feature range ({}, {}) must be finite with low < high",
                low, high
            )));
        }
        Ok(())
    }
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            periods: TradingPeriods::default(),
            horizon: None,
            hidden_size: None,
            learning_rate: 0.001,
            batch_size: 32,
            gradient_clip: Some(1.0),
            seed: 42,
            feature_range: (-1.0, 1.0),
        }
    }
}
