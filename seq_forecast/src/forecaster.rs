//! The sequence forecaster: windowing, training, evaluation and forward
//! forecasts over one price series

use crate::calendar::business_days_after;
use crate::config::ForecasterConfig;
use crate::data::{ForecastTable, PriceSeries, FORECAST_COLUMN, PREDICTION_COLUMN};
use crate::error::{ForecastError, Result};
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::models::{LstmRegressor, SequenceModel};
use crate::scaler::MinMaxScaler;
use crate::windowing::{evaluation_window, forecast_input, training_windows};
use tracing::info;

/// Whether a model has been fitted, and for which look-back
#[derive(Debug, Clone)]
pub enum TrainingState<M> {
    Untrained,
    Trained { model: M, lags: usize },
}

/// Forecasts one price series with a sequence model trained on its own
/// sliding windows.
///
/// The forecaster owns its series, its scaler and its model; none of them is
/// shared with another instance.
#[derive(Debug, Clone)]
pub struct SequenceForecaster<M: SequenceModel = LstmRegressor> {
    series: PriceSeries,
    config: ForecasterConfig,
    lags: usize,
    horizon: usize,
    scaler: MinMaxScaler,
    state: TrainingState<M>,
    evaluation: Option<ForecastAccuracy>,
}

impl SequenceForecaster {
    /// LSTM forecaster with one trading year of look-back and horizon
    pub fn new(series: PriceSeries) -> Self {
        let config = ForecasterConfig::default();
        Self {
            lags: config.periods.days_per_year(),
            horizon: config.resolved_horizon(),
            scaler: MinMaxScaler::default(),
            series,
            config,
            state: TrainingState::Untrained,
            evaluation: None,
        }
    }

    /// LSTM forecaster with custom settings
    pub fn with_config(series: PriceSeries, config: ForecasterConfig) -> Result<Self> {
        Self::with_model(series, config)
    }
}

impl<M: SequenceModel> SequenceForecaster<M> {
    /// Forecaster backed by any [`SequenceModel`]
    pub fn with_model(series: PriceSeries, config: ForecasterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lags: config.periods.days_per_year(),
            horizon: config.resolved_horizon(),
            scaler: MinMaxScaler::new(config.feature_range)?,
            series,
            config,
            state: TrainingState::Untrained,
            evaluation: None,
        })
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    /// Look-back used by the last `train` call (or the default before one)
    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn state(&self) -> &TrainingState<M> {
        &self.state
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, TrainingState::Trained { .. })
    }

    pub fn model(&self) -> Option<&M> {
        match &self.state {
            TrainingState::Trained { model, .. } => Some(model),
            TrainingState::Untrained => None,
        }
    }

    /// Accuracy on the held-out window from the last successful `train`
    pub fn evaluation_accuracy(&self) -> Option<&ForecastAccuracy> {
        self.evaluation.as_ref()
    }

    /// Change the number of steps forecast. A different horizon changes the
    /// model's output width, so any trained model is discarded.
    pub fn set_horizon(&mut self, horizon: usize) -> Result<()> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be greater than zero".to_string(),
            ));
        }
        if horizon != self.horizon {
            if self.is_trained() {
                info!(
                    old = self.horizon,
                    new = horizon,
                    "horizon changed, discarding trained model"
                );
            }
            self.horizon = horizon;
            self.state = TrainingState::Untrained;
            self.evaluation = None;
        }
        Ok(())
    }

    /// Fit the model on every window of the series except the final
    /// `horizon` points, then predict those held-out points.
    ///
    /// Returns the series' dates with a "Prediction" column that is null
    /// everywhere but the held-out dates. A model built for a different
    /// look-back is rebuilt; otherwise training continues from its current
    /// parameters.
    pub fn train(&mut self, lags: usize, epochs: usize) -> Result<ForecastTable> {
        if lags == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lags must be greater than zero".to_string(),
            ));
        }
        if epochs == 0 {
            return Err(ForecastError::InvalidParameter(
                "Epochs must be greater than zero".to_string(),
            ));
        }

        let horizon = self.horizon;
        let required = lags + 2 * horizon;
        if self.series.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                available: self.series.len(),
            });
        }

        self.lags = lags;
        let scaled = self.scaler.fit_transform(self.series.values())?;
        let dataset = training_windows(&scaled, lags, horizon)?;
        if dataset.is_empty() {
            return Err(ForecastError::InsufficientData {
                required,
                available: self.series.len(),
            });
        }

        let previous = std::mem::replace(&mut self.state, TrainingState::Untrained);
        self.evaluation = None;
        let mut model = match previous {
            TrainingState::Trained { model, .. }
                if model.input_len() == lags && model.output_len() == horizon =>
            {
                model
            }
            TrainingState::Trained { lags: old, .. } => {
                info!(old, new = lags, "look-back changed, rebuilding model");
                M::build(lags, horizon, &self.config)?
            }
            TrainingState::Untrained => M::build(lags, horizon, &self.config)?,
        };

        model.fit(&dataset.inputs(), &dataset.targets(), epochs)?;

        let holdout = evaluation_window(&scaled, lags, horizon)?;
        let predicted = model.predict(&holdout.inputs())?;
        let predicted = self.scaler.inverse_transform(&predicted.row(0).to_vec())?;

        let actual = self.series.tail(horizon)?;
        let accuracy = forecast_accuracy(&predicted, actual)?;
        info!(
            model = model.name(),
            windows = dataset.len(),
            epochs,
            rmse = accuracy.rmse,
            mape = accuracy.mape,
            "training finished"
        );

        self.state = TrainingState::Trained { model, lags };
        self.evaluation = Some(accuracy);

        ForecastTable::aligned(
            self.series.dates().to_vec(),
            &self.series,
            PREDICTION_COLUMN,
            &predicted,
        )
    }

    /// Forecast `horizon` business days past the end of the series.
    ///
    /// The returned table spans the series' dates followed by the new dates;
    /// only the new dates carry a "Forecast" value.
    pub fn forecast(&self) -> Result<ForecastTable> {
        let (model, lags) = match &self.state {
            TrainingState::Trained { model, lags } => (model, *lags),
            TrainingState::Untrained => return Err(ForecastError::NotTrained),
        };

        let scaled = self.scaler.transform(self.series.tail(lags)?)?;
        let output = model.predict(&forecast_input(&scaled, lags)?)?;
        let values = self.scaler.inverse_transform(&output.row(0).to_vec())?;
        if values.len() != self.horizon {
            return Err(ForecastError::ModelError(format!(
                "Model produced {} steps, expected {}",
                values.len(),
                self.horizon
            )));
        }

        let mut dates = self.series.dates().to_vec();
        dates.extend(business_days_after(self.series.last_date(), self.horizon)?);

        info!(
            horizon = self.horizon,
            from = %self.series.last_date(),
            "forecast produced"
        );

        ForecastTable::aligned(dates, &self.series, FORECAST_COLUMN, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::business_days_after;
    use chrono::NaiveDate;

    fn ramp(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let mut dates = vec![start];
        dates.extend(business_days_after(start, n - 1).unwrap());
        let values = (0..n).map(|i| 100.0 + i as f64).collect();
        PriceSeries::new("Close", dates, values).unwrap()
    }

    fn small_config() -> ForecasterConfig {
        ForecasterConfig::default().with_horizon(5).with_hidden_size(4)
    }

    #[test]
    fn test_defaults() {
        let forecaster = SequenceForecaster::new(ramp(10));
        assert_eq!(forecaster.lags(), 252);
        assert_eq!(forecaster.horizon(), 252);
        assert!(!forecaster.is_trained());
        assert!(!forecaster.scaler().is_fitted());
        assert_eq!(forecaster.scaler().feature_range(), (-1.0, 1.0));
    }

    #[test]
    fn test_forecast_before_train() {
        let forecaster = SequenceForecaster::new(ramp(10));
        assert!(matches!(
            forecaster.forecast(),
            Err(ForecastError::NotTrained)
        ));
    }

    #[test]
    fn test_train_rejects_short_series() {
        let mut forecaster = SequenceForecaster::with_config(ramp(14), small_config()).unwrap();
        let err = forecaster.train(5, 1).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                required: 15,
                available: 14
            }
        ));
        assert!(!forecaster.is_trained());
        assert!(!forecaster.scaler().is_fitted());
    }

    #[test]
    fn test_train_rejects_zero_arguments() {
        let mut forecaster = SequenceForecaster::with_config(ramp(40), small_config()).unwrap();
        assert!(forecaster.train(0, 1).is_err());
        assert!(forecaster.train(5, 0).is_err());
    }

    #[test]
    fn test_set_horizon_discards_model() {
        let mut forecaster = SequenceForecaster::with_config(ramp(40), small_config()).unwrap();
        forecaster.train(5, 1).unwrap();
        assert!(forecaster.is_trained());
        assert!(forecaster.evaluation_accuracy().is_some());

        forecaster.set_horizon(5).unwrap();
        assert!(forecaster.is_trained());

        forecaster.set_horizon(3).unwrap();
        assert!(!forecaster.is_trained());
        assert!(forecaster.evaluation_accuracy().is_none());
        assert!(matches!(
            forecaster.forecast(),
            Err(ForecastError::NotTrained)
        ));
        assert!(forecaster.set_horizon(0).is_err());
    }
}
