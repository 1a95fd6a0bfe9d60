#![allow(dead_code)]

use chrono::NaiveDate;
use ndarray::{Array2, Array3};
use seq_forecast::calendar::business_days_after;
use seq_forecast::models::check_inputs;
use seq_forecast::{ForecasterConfig, PriceSeries, Result, SequenceModel};

/// Business-day series rising linearly from `start_price` by 1.0 per day
pub fn linear_series(n: usize, start_price: f64) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut dates = vec![start];
    dates.extend(business_days_after(start, n - 1).unwrap());
    let values = (0..n).map(|i| start_price + i as f64).collect();
    PriceSeries::new("Close", dates, values).unwrap()
}

/// Predicts the last observed value for every step and counts training calls
#[derive(Debug, Clone)]
pub struct Persistence {
    input_len: usize,
    output_len: usize,
    pub epochs_seen: usize,
    pub windows_seen: usize,
}

impl SequenceModel for Persistence {
    fn build(input_len: usize, output_len: usize, _config: &ForecasterConfig) -> Result<Self> {
        Ok(Self {
            input_len,
            output_len,
            epochs_seen: 0,
            windows_seen: 0,
        })
    }

    fn fit(&mut self, inputs: &Array3<f64>, _targets: &Array2<f64>, epochs: usize) -> Result<()> {
        check_inputs(inputs, self.input_len)?;
        self.epochs_seen += epochs;
        self.windows_seen = inputs.shape()[0];
        Ok(())
    }

    fn predict(&self, inputs: &Array3<f64>) -> Result<Array2<f64>> {
        check_inputs(inputs, self.input_len)?;
        let last = self.input_len - 1;
        Ok(Array2::from_shape_fn(
            (inputs.shape()[0], self.output_len),
            |(b, _)| inputs[[b, last, 0]],
        ))
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn name(&self) -> &str {
        "persistence"
    }
}
