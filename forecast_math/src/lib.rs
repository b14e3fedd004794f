//! # Forecast Math
//!
//! Numeric building blocks for the seasonal sales forecaster.
//! This crate provides Fourier seasonal terms and a ridge-regularised
//! least-squares solver used to fit additive time series models.

use thiserror::Error;

pub mod fourier;
pub mod regression;

pub use fourier::FourierSeries;
pub use regression::RidgeRegression;

/// Errors that can occur in forecasting math
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;
