//! Rolling metric windows and the risk ratios computed over them
//!
//! Outputs of the `rolling_*` helpers are aligned with their input: position
//! `i` holds the statistic of the window ending at `i`, and positions without a
//! full window are `None`.

use crate::periods::TradingPeriods;
use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Validate that a window fits inside the available data
pub fn check_window(window: usize, available: usize) -> Result<()> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }
    if window > available {
        return Err(MathError::InvalidWindow { window, available });
    }
    Ok(())
}

fn rolling_apply<F>(values: &[f64], window: usize, stat: F) -> Result<Vec<Option<f64>>>
where
    F: Fn(&[f64]) -> f64,
{
    check_window(window, values.len())?;

    let mut out = vec![None; window - 1];
    out.extend(values.windows(window).map(|w| Some(stat(w))));
    Ok(out)
}

/// Rolling arithmetic mean
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    rolling_apply(values, window, |w| w.iter().mean())
}

/// Rolling sample standard deviation (n - 1 denominator)
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    rolling_apply(values, window, |w| w.iter().std_dev())
}

/// Simple period-over-period returns
pub fn daily_returns(prices: &[f64]) -> Result<Vec<f64>> {
    if prices.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Need at least 2 prices to compute returns, have {}",
            prices.len()
        )));
    }
    if prices.iter().any(|&p| p == 0.0) {
        return Err(MathError::CalculationError(
            "Cannot compute returns across a zero price".to_string(),
        ));
    }

    Ok(prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
}

/// Rolling Sharpe ratio over windows of `window_months` trading months.
///
/// For every full window the mean daily return is scaled to the window length
/// and the risk-free rate observed at the window's last day is subtracted; the
/// excess is divided by the window-scaled standard deviation. Positions without
/// a full window, or with zero volatility, are omitted. Each entry carries the
/// index of the return it is aligned with.
pub fn rolling_sharpe(
    daily_returns: &[f64],
    risk_free_rate: &[f64],
    window_months: usize,
    periods: &TradingPeriods,
) -> Result<Vec<(usize, f64)>> {
    if daily_returns.len() != risk_free_rate.len() {
        return Err(MathError::InvalidInput(format!(
            "Returns ({}) and risk-free rate ({}) must have the same length",
            daily_returns.len(),
            risk_free_rate.len()
        )));
    }

    let window = periods.months_to_days(window_months);
    let means = rolling_mean(daily_returns, window)?;
    let stds = rolling_std(daily_returns, window)?;
    let scale = window as f64;

    let ratios = means
        .into_iter()
        .zip(stds)
        .zip(risk_free_rate)
        .enumerate()
        .filter_map(|(i, ((mean, std), &rf))| {
            let excess = mean? * scale - rf;
            let volatility = std? * scale.sqrt();
            if volatility == 0.0 || !volatility.is_finite() {
                return None;
            }
            Some((i, excess / volatility))
        })
        .collect();

    Ok(ratios)
}

/// Rolling volatility annualized with the calendar's trading days per year
pub fn rolling_volatility(
    daily_returns: &[f64],
    window: usize,
    periods: &TradingPeriods,
) -> Result<Vec<Option<f64>>> {
    let factor = periods.annualization_factor();
    Ok(rolling_std(daily_returns, window)?
        .into_iter()
        .map(|s| s.map(|v| v * factor))
        .collect())
}

/// Largest peak-to-trough decline, as a positive fraction of the peak
pub fn max_drawdown(prices: &[f64]) -> Result<f64> {
    if prices.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute drawdown of an empty series".to_string(),
        ));
    }

    let mut peak = prices[0];
    let mut worst: f64 = 0.0;
    for &price in prices {
        if price > peak {
            peak = price;
        }
        if peak > 0.0 {
            worst = worst.max((peak - price) / peak);
        }
    }

    Ok(worst)
}

/// Annualized compound return divided by maximum drawdown
pub fn calmar_ratio(prices: &[f64], periods: &TradingPeriods) -> Result<f64> {
    if prices.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Need at least 2 prices for a Calmar ratio, have {}",
            prices.len()
        )));
    }

    let first = prices[0];
    let last = prices[prices.len() - 1];
    if first <= 0.0 {
        return Err(MathError::CalculationError(
            "Starting price must be positive".to_string(),
        ));
    }

    let years = (prices.len() - 1) as f64 / periods.days_per_year() as f64;
    let annual_return = (last / first).powf(1.0 / years) - 1.0;

    let drawdown = max_drawdown(prices)?;
    if drawdown == 0.0 {
        return Err(MathError::CalculationError(
            "Series never draws down, Calmar ratio is undefined".to_string(),
        ));
    }

    Ok(annual_return / drawdown)
}

fn check_paired(asset: &[f64], market: &[f64]) -> Result<()> {
    if asset.len() != market.len() {
        return Err(MathError::InvalidInput(format!(
            "Asset ({}) and market ({}) returns must have the same length",
            asset.len(),
            market.len()
        )));
    }
    if asset.len() < 2 {
        return Err(MathError::InsufficientData(
            "Need at least 2 paired returns".to_string(),
        ));
    }
    Ok(())
}

/// Sensitivity of asset returns to market returns
pub fn beta(asset_returns: &[f64], market_returns: &[f64]) -> Result<f64> {
    check_paired(asset_returns, market_returns)?;

    let market_variance = market_returns.iter().variance();
    if market_variance == 0.0 {
        return Err(MathError::CalculationError(
            "Market returns have zero variance".to_string(),
        ));
    }

    let covariance = asset_returns.iter().covariance(market_returns.iter());
    Ok(covariance / market_variance)
}

/// Annualized Jensen's alpha against a constant daily risk-free rate
pub fn alpha(
    asset_returns: &[f64],
    market_returns: &[f64],
    daily_risk_free: f64,
    periods: &TradingPeriods,
) -> Result<f64> {
    let b = beta(asset_returns, market_returns)?;

    let asset_excess = asset_returns.iter().mean() - daily_risk_free;
    let market_excess = market_returns.iter().mean() - daily_risk_free;

    Ok((asset_excess - b * market_excess) * periods.days_per_year() as f64)
}
