//! Min-max feature scaling with an explicit fitted state

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Whether the scaler has seen data yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalerState {
    Unfit,
    Fitted { data_min: f64, data_max: f64 },
}

/// Maps prices linearly onto a bounded feature range and back.
///
/// The range is learned once by [`fit`](MinMaxScaler::fit) or
/// [`fit_transform`](MinMaxScaler::fit_transform); every later transform
/// reuses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    feature_range: (f64, f64),
    state: ScalerState,
}

impl MinMaxScaler {
    /// Create an unfit scaler targeting `(low, high)`
    pub fn new(feature_range: (f64, f64)) -> Result<Self> {
        let (low, high) = feature_range;
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(ForecastError::InvalidParameter(format!(
                "Feature range ({}, {}) must be finite with low < high",
                low, high
            )));
        }

        Ok(Self {
            feature_range,
            state: ScalerState::Unfit,
        })
    }

    pub fn feature_range(&self) -> (f64, f64) {
        self.feature_range
    }

    pub fn state(&self) -> ScalerState {
        self.state
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, ScalerState::Fitted { .. })
    }

    /// Learn the data range, replacing any previous fit
    pub fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot fit scaler on empty data".to_string(),
            ));
        }

        let data_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !data_min.is_finite() || !data_max.is_finite() {
            return Err(ForecastError::DataError(
                "Cannot fit scaler on non-finite data".to_string(),
            ));
        }

        self.state = ScalerState::Fitted { data_min, data_max };
        Ok(())
    }

    pub fn fit_transform(&mut self, values: &[f64]) -> Result<Vec<f64>> {
        self.fit(values)?;
        self.transform(values)
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        let (data_min, data_range) = self.fitted_range()?;
        let (low, high) = self.feature_range;
        Ok(values
            .iter()
            .map(|v| low + (v - data_min) / data_range * (high - low))
            .collect())
    }

    pub fn inverse_transform(&self, scaled: &[f64]) -> Result<Vec<f64>> {
        let (data_min, data_range) = self.fitted_range()?;
        let (low, high) = self.feature_range;
        Ok(scaled
            .iter()
            .map(|s| data_min + (s - low) / (high - low) * data_range)
            .collect())
    }

    /// Fitted minimum and span. A zero span is treated as one so constant
    /// input maps to the lower bound.
    fn fitted_range(&self) -> Result<(f64, f64)> {
        let (data_min, data_max) = match self.state {
            ScalerState::Fitted { data_min, data_max } => (data_min, data_max),
            ScalerState::Unfit => return Err(ForecastError::NotTrained),
        };

        let data_range = data_max - data_min;
        let data_range = if data_range == 0.0 { 1.0 } else { data_range };
        Ok((data_min, data_range))
    }
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self {
            feature_range: (-1.0, 1.0),
            state: ScalerState::Unfit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unfit_scaler_refuses_transform() {
        let scaler = MinMaxScaler::default();
        assert!(matches!(scaler.transform(&[1.0]), Err(ForecastError::NotTrained)));
        assert!(matches!(
            scaler.inverse_transform(&[0.0]),
            Err(ForecastError::NotTrained)
        ));
    }

    #[test]
    fn test_fit_transform_maps_to_range() {
        let mut scaler = MinMaxScaler::default();
        let scaled = scaler.fit_transform(&[10.0, 20.0, 30.0]).unwrap();

        assert_relative_eq!(scaled[0], -1.0);
        assert_relative_eq!(scaled[1], 0.0);
        assert_relative_eq!(scaled[2], 1.0);
        assert_eq!(
            scaler.state(),
            ScalerState::Fitted {
                data_min: 10.0,
                data_max: 30.0
            }
        );
    }

    #[test]
    fn test_fitted_extremes_hit_range_ends_exactly() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + i as f64).collect();
        let mut scaler = MinMaxScaler::default();
        scaler.fit(&prices).unwrap();

        assert_eq!(scaler.transform(&[219.0]).unwrap(), vec![1.0]);
        assert_eq!(scaler.transform(&[100.0]).unwrap(), vec![-1.0]);
        assert_eq!(scaler.inverse_transform(&[1.0, -1.0]).unwrap(), vec![219.0, 100.0]);

        let mut unit = MinMaxScaler::new((0.0, 1.0)).unwrap();
        unit.fit(&[0.1, 0.7, 0.3]).unwrap();
        assert_eq!(unit.transform(&[0.1, 0.7]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_round_trip_within_range() {
        let mut scaler = MinMaxScaler::default();
        scaler.fit(&[100.0, 399.0]).unwrap();

        for v in [100.0, 123.456, 250.0, 398.999, 399.0] {
            let scaled = scaler.transform(&[v]).unwrap();
            let back = scaler.inverse_transform(&scaled).unwrap();
            assert_relative_eq!(back[0], v, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_constant_input() {
        let mut scaler = MinMaxScaler::default();
        let scaled = scaler.fit_transform(&[5.0, 5.0, 5.0]).unwrap();
        assert!(scaled.iter().all(|s| *s == -1.0));

        let back = scaler.inverse_transform(&scaled).unwrap();
        assert!(back.iter().all(|v| *v == 5.0));
    }

    #[test]
    fn test_invalid_range() {
        assert!(MinMaxScaler::new((1.0, -1.0)).is_err());
        assert!(MinMaxScaler::new((0.0, 0.0)).is_err());
        assert!(MinMaxScaler::new((0.0, 1.0)).is_ok());
    }
}
