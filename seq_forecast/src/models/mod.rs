//! Sequence models that map a look-back window to a multi-step forecast

use crate::config::ForecasterConfig;
use crate::error::{ForecastError, Result};
use ndarray::{Array2, Array3};
use std::fmt::Debug;

pub mod lstm;

pub use lstm::LstmRegressor;

/// A trainable model over windows shaped `(batch, input_len, 1)` producing
/// `(batch, output_len)`
pub trait SequenceModel: Debug {
    /// Construct an untrained model for the given window widths
    fn build(input_len: usize, output_len: usize, config: &ForecasterConfig) -> Result<Self>
    where
        Self: Sized;

    /// Run `epochs` passes over the windows, continuing from current parameters
    fn fit(&mut self, inputs: &Array3<f64>, targets: &Array2<f64>, epochs: usize) -> Result<()>;

    /// Forward pass without updating parameters
    fn predict(&self, inputs: &Array3<f64>) -> Result<Array2<f64>>;

    /// Look-back length the model was built for
    fn input_len(&self) -> usize;

    /// Number of steps produced per window
    fn output_len(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Check that `inputs` is `(batch, input_len, 1)` with a non-empty batch
pub fn check_inputs(inputs: &Array3<f64>, input_len: usize) -> Result<()> {
    let shape = inputs.shape();
    if shape[0] == 0 || shape[1] != input_len || shape[2] != 1 {
        return Err(ForecastError::ShapeMismatch {
            expected: format!("(batch >= 1, {}, 1)", input_len),
            actual: format!("{:?}", shape),
        });
    }
    Ok(())
}

/// Check that `targets` is `(batch, output_len)` and matches the input batch
pub fn check_targets(targets: &Array2<f64>, batch: usize, output_len: usize) -> Result<()> {
    let shape = targets.shape();
    if shape[0] != batch || shape[1] != output_len {
        return Err(ForecastError::ShapeMismatch {
            expected: format!("({}, {})", batch, output_len),
            actual: format!("{:?}", shape),
        });
    }
    Ok(())
}
