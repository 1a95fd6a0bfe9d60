//! # Trade Math
//!
//! Shared financial calculations for the lagcast workspace.
//! This crate provides the trading-calendar period lengths used to size
//! look-back windows and the rolling metric utilities built on top of them.

use thiserror::Error;

pub mod periods;
pub mod rolling;

pub use periods::{TradingPeriods, TDAYS_PER_MONTH, TDAYS_PER_YEAR};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Window of {window} values extends past the {available} available")]
    InvalidWindow { window: usize, available: usize },

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
