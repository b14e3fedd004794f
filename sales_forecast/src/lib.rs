//! # Sales Forecast
//!
//! Seasonal forecasting for daily sales totals.
//!
//! ## Features
//!
//! - Daily sales series with a two-column `{ds, y}` frame representation
//! - A pluggable model interface: `fit(history) -> trained`, `predict(trained, horizon)`
//! - An additive seasonal model with weekly, yearly and custom Fourier seasonalities
//!   and per-region holiday effects
//! - A simple exponential smoothing baseline
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sales_forecast::holidays::HolidayRegion;
//! use sales_forecast::models::seasonal::SeasonalModel;
//! use sales_forecast::{DailySalesPoint, DailySalesSeries, ForecastModel, TrainedForecastModel};
//!
//! let history = DailySalesSeries::new(vec![
//!     DailySalesPoint::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 100.0),
//!     DailySalesPoint::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 150.0),
//! ])?;
//!
//! let model = SeasonalModel::new()
//!     .add_country_holidays(HolidayRegion::UnitedStates)
//!     .add_seasonality("monthly", 30.5, 4)?;
//!
//! let forecast = model.fit(&history)?.predict(30)?;
//! assert_eq!(forecast.len(), 32);
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod data;
pub mod error;
pub mod holidays;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use crate::data::{DailySalesPoint, DailySalesSeries, ForecastPoint, ForecastSeries};
pub use crate::error::ForecastError;
pub use crate::models::{ForecastModel, TrainedForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
