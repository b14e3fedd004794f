//! Error types for the sales_etl crate

use polars::prelude::PolarsError;
use sales_forecast::ForecastError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline or replenish run
///
/// A missing warehouse table is not an error: it is reported as
/// [`WarehouseState::Empty`](crate::warehouse::WarehouseState) and handled as a first load.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A raw, staging or warehouse store could not be opened
    #[error("{store} store unavailable at {}: {source}", .path.display())]
    StoreUnavailable {
        store: &'static str,
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A component broke its output contract
    #[error("Shape invariant violated: {0}")]
    ShapeInvariant(String),

    /// Error from the forecasting capability
    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    /// Error from SQLite operations
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// A stored date could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A stored row is missing a column or holds an unusable value
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<PolarsError> for PipelineError {
    fn from(err: PolarsError) -> Self {
        PipelineError::PolarsError(err.to_string())
    }
}
