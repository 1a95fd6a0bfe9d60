//! Supervised windows cut from a scaled series
//!
//! A window of `lags + horizon` consecutive points is split into a look-back
//! `inputs` run and the `targets` run that immediately follows it.

use crate::error::{ForecastError, Result};
use ndarray::{Array2, Array3};

/// One look-back / horizon pair
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPair {
    /// Index of the first input point in the source series
    pub start: usize,
    pub inputs: Vec<f64>,
    pub targets: Vec<f64>,
}

impl WindowPair {
    fn cut(scaled: &[f64], start: usize, lags: usize, horizon: usize) -> Self {
        Self {
            start,
            inputs: scaled[start..start + lags].to_vec(),
            targets: scaled[start + lags..start + lags + horizon].to_vec(),
        }
    }
}

/// Ordered collection of windows sharing one shape
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    lags: usize,
    horizon: usize,
    pairs: Vec<WindowPair>,
}

impl Dataset {
    pub fn pairs(&self) -> &[WindowPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Model inputs shaped `(batch, lags, 1)`
    pub fn inputs(&self) -> Array3<f64> {
        Array3::from_shape_fn((self.pairs.len(), self.lags, 1), |(i, t, _)| {
            self.pairs[i].inputs[t]
        })
    }

    /// Model targets shaped `(batch, horizon)`
    pub fn targets(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.pairs.len(), self.horizon), |(i, h)| {
            self.pairs[i].targets[h]
        })
    }
}

fn check_shape(lags: usize, horizon: usize) -> Result<()> {
    if lags == 0 || horizon == 0 {
        return Err(ForecastError::InvalidParameter(format!(
            "Lags ({}) and horizon ({}) must be greater than zero",
            lags, horizon
        )));
    }
    Ok(())
}

/// Windows for fitting.
///
/// The final `horizon` points are held out, so `(n - horizon) - (lags + horizon) + 1`
/// windows are produced. They are ordered most recent first.
pub fn training_windows(scaled: &[f64], lags: usize, horizon: usize) -> Result<Dataset> {
    check_shape(lags, horizon)?;

    let required = lags + 2 * horizon;
    if scaled.len() < required {
        return Err(ForecastError::InsufficientData {
            required,
            available: scaled.len(),
        });
    }

    let usable = scaled.len() - horizon;
    let count = usable - (lags + horizon) + 1;
    let pairs = (0..count)
        .rev()
        .map(|start| WindowPair::cut(scaled, start, lags, horizon))
        .collect();

    Ok(Dataset {
        lags,
        horizon,
        pairs,
    })
}

/// The single held-out window: the last `lags` points before the final
/// `horizon`, paired with those final points
pub fn evaluation_window(scaled: &[f64], lags: usize, horizon: usize) -> Result<Dataset> {
    check_shape(lags, horizon)?;

    let required = lags + horizon;
    if scaled.len() < required {
        return Err(ForecastError::InsufficientData {
            required,
            available: scaled.len(),
        });
    }

    let start = scaled.len() - required;
    Ok(Dataset {
        lags,
        horizon,
        pairs: vec![WindowPair::cut(scaled, start, lags, horizon)],
    })
}

/// Shape the trailing `lags` points as one model input
pub fn forecast_input(scaled: &[f64], lags: usize) -> Result<Array3<f64>> {
    if lags == 0 {
        return Err(ForecastError::InvalidParameter(
            "Lags must be greater than zero".to_string(),
        ));
    }
    if scaled.len() < lags {
        return Err(ForecastError::InsufficientData {
            required: lags,
            available: scaled.len(),
        });
    }

    let tail = &scaled[scaled.len() - lags..];
    Ok(Array3::from_shape_fn((1, lags, 1), |(_, t, _)| tail[t]))
}
