use chrono::NaiveDate;
use seq_forecast::calendar::business_days_after;
use seq_forecast::{ForecasterConfig, PriceSeries, SequenceForecaster};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seq_forecast=info".into()),
        )
        .init();

    println!("Seq Forecast: LSTM Example");
    println!("==========================\n");

    let series = create_sample_prices(400)?;
    println!(
        "Sample data created: {} business days from {} to {}\n",
        series.len(),
        series.first_date(),
        series.last_date()
    );

    // One trading month ahead, one trading month of look-back
    let config = ForecasterConfig::default()
        .with_horizon(21)
        .with_learning_rate(0.005);
    let mut forecaster = SequenceForecaster::with_config(series, config)?;

    println!("Training...");
    let evaluation = forecaster.train(21, 20)?;
    if let Some(accuracy) = forecaster.evaluation_accuracy() {
        println!("Held-out accuracy: {}", accuracy);
    }

    println!("\nHeld-out predictions:");
    let actual = forecaster.series().tail(forecaster.horizon())?;
    for ((date, predicted), actual) in evaluation.payload().iter().zip(actual) {
        println!("  {}: predicted {:.2}, actual {:.2}", date, predicted, actual);
    }

    println!("\nForecast:");
    let forecast = forecaster.forecast()?;
    for (date, value) in forecast.payload() {
        println!("  {}: {:.2}", date, value);
    }

    println!("\n{}", forecast.to_dataframe()?.tail(Some(5)));

    Ok(())
}

/// Trending price series with a monthly cycle
fn create_sample_prices(n: usize) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).ok_or("invalid start date")?;
    let mut dates = vec![start];
    dates.extend(business_days_after(start, n - 1)?);

    let prices = (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.15 * t + 4.0 * (t * std::f64::consts::TAU / 21.0).sin()
        })
        .collect();

    Ok(PriceSeries::new("Close", dates, prices)?)
}
