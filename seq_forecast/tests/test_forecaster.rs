mod common;

use approx::assert_relative_eq;
use common::{linear_series, Persistence};
use pretty_assertions::assert_eq;
use seq_forecast::calendar::is_business_day;
use seq_forecast::{
    ForecastError, ForecasterConfig, SequenceForecaster, SequenceModel, FORECAST_COLUMN,
    PREDICTION_COLUMN,
};

fn persistence_forecaster(n: usize, horizon: usize) -> SequenceForecaster<Persistence> {
    let config = ForecasterConfig::default().with_horizon(horizon);
    SequenceForecaster::with_model(linear_series(n, 100.0), config).unwrap()
}

#[test]
fn test_end_to_end_lstm() {
    let series = linear_series(300, 100.0);
    let last_date = series.last_date();

    let mut forecaster = SequenceForecaster::new(series);
    forecaster.set_horizon(21).unwrap();

    let evaluation = forecaster.train(21, 1).unwrap();
    assert_eq!(evaluation.len(), 300);
    assert_eq!(evaluation.column(), PREDICTION_COLUMN);
    assert_eq!(evaluation.non_null_count(), 21);
    assert!(evaluation.values()[..279].iter().all(|v| v.is_none()));
    assert!(evaluation.values()[279..].iter().all(|v| v.is_some()));

    let forecast = forecaster.forecast().unwrap();
    assert_eq!(forecast.column(), FORECAST_COLUMN);
    assert_eq!(forecast.len(), 321);

    let payload = forecast.payload();
    assert_eq!(payload.len(), 21);
    assert!(payload.iter().all(|(_, v)| v.is_finite()));
    assert!(payload[0].0 > last_date);
    assert!(payload.iter().all(|(d, _)| is_business_day(*d)));
}

#[test]
fn test_rebuild_on_lag_change() {
    let mut forecaster = SequenceForecaster::new(linear_series(300, 100.0));
    forecaster.set_horizon(21).unwrap();

    forecaster.train(21, 1).unwrap();
    assert_eq!(forecaster.model().unwrap().input_len(), 21);

    forecaster.train(10, 1).unwrap();
    assert_eq!(forecaster.lags(), 10);
    assert_eq!(forecaster.model().unwrap().input_len(), 10);
    assert_eq!(forecaster.model().unwrap().hidden_size(), 10);

    let forecast = forecaster.forecast().unwrap();
    assert_eq!(forecast.non_null_count(), 21);
}

#[test]
fn test_repeated_training_continues_same_model() {
    let mut forecaster = persistence_forecaster(100, 5);

    forecaster.train(10, 2).unwrap();
    forecaster.train(10, 3).unwrap();
    assert_eq!(forecaster.model().unwrap().epochs_seen, 5);

    forecaster.train(8, 1).unwrap();
    assert_eq!(forecaster.model().unwrap().epochs_seen, 1);
}

#[test]
fn test_training_window_count() {
    let mut forecaster = persistence_forecaster(300, 21);
    forecaster.train(21, 1).unwrap();
    assert_eq!(
        forecaster.model().unwrap().windows_seen,
        (300 - 21) - (21 + 21) + 1
    );
}

#[test]
fn test_insufficient_data() {
    // exactly lags + 2 * horizon points yields a single window
    let mut forecaster = persistence_forecaster(41, 10);
    forecaster.train(21, 1).unwrap();
    assert_eq!(forecaster.model().unwrap().windows_seen, 1);

    let mut forecaster = persistence_forecaster(40, 10);
    assert!(matches!(
        forecaster.train(21, 1),
        Err(ForecastError::InsufficientData {
            required: 41,
            available: 40
        })
    ));
    assert!(matches!(
        forecaster.forecast(),
        Err(ForecastError::NotTrained)
    ));
}

#[test]
fn test_scaler_fit_once() {
    let mut forecaster = persistence_forecaster(120, 5);
    forecaster.train(10, 1).unwrap();

    let max = 219.0;
    let min = 100.0;
    assert_eq!(forecaster.scaler().transform(&[max]).unwrap(), vec![1.0]);
    assert_eq!(forecaster.scaler().transform(&[min]).unwrap(), vec![-1.0]);

    for _ in 0..3 {
        forecaster.forecast().unwrap();
    }
    assert_eq!(forecaster.scaler().transform(&[max]).unwrap(), vec![1.0]);
}

#[test]
fn test_evaluation_alignment_and_values() {
    let mut forecaster = persistence_forecaster(60, 5);
    let table = forecaster.train(10, 1).unwrap();
    let series = forecaster.series();

    assert_eq!(table.dates(), series.dates());
    let payload = table.payload();
    assert_eq!(payload.len(), 5);
    assert_eq!(
        payload.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
        series.dates()[55..].to_vec()
    );

    // persistence repeats the last look-back price, index 54
    for (_, value) in payload {
        assert_relative_eq!(value, 154.0, epsilon = 1e-9);
    }

    let accuracy = forecaster.evaluation_accuracy().unwrap();
    assert_relative_eq!(accuracy.mae, 3.0, epsilon = 1e-9);
}

#[test]
fn test_forecast_dates_and_values() {
    let mut forecaster = persistence_forecaster(60, 7);
    forecaster.train(10, 1).unwrap();

    let table = forecaster.forecast().unwrap();
    let series = forecaster.series();
    assert_eq!(table.len(), 67);
    assert_eq!(&table.dates()[..60], series.dates());
    assert!(table.values()[..60].iter().all(|v| v.is_none()));
    assert!(table.actual()[60..].iter().all(|v| v.is_none()));

    let payload = table.payload();
    assert_eq!(payload.len(), 7);

    let mut previous = series.last_date();
    for (date, value) in &payload {
        assert!(*date > previous);
        assert!(is_business_day(*date));
        // consecutive business days: at most a weekend in between
        assert!((*date - previous).num_days() <= 3);
        previous = *date;
        assert_relative_eq!(*value, 159.0, epsilon = 1e-9);
    }
}

#[test]
fn test_forecast_is_idempotent() {
    let mut forecaster = persistence_forecaster(60, 5);
    forecaster.train(10, 1).unwrap();

    let first = forecaster.forecast().unwrap();
    let second = forecaster.forecast().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_forecast_tables_export() {
    let mut forecaster = persistence_forecaster(60, 5);
    forecaster.train(10, 1).unwrap();

    let df = forecaster.forecast().unwrap().to_dataframe().unwrap();
    assert_eq!(df.height(), 65);
    assert_eq!(df.get_column_names(), vec!["date", "Close", "Forecast"]);
    assert_eq!(df.column("Forecast").unwrap().null_count(), 60);
    assert_eq!(df.column("Close").unwrap().null_count(), 5);
}
