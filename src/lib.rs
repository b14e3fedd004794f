//! # Sales Dashboard
//!
//! `sales_dashboard` bundles the crates behind the weekly sales forecast:
//!
//! - [`etl`]: order stores, warehouse loading, the batch pipeline and its CLI
//! - [`forecast`]: daily series types and forecasting models
//! - [`math`]: numeric building blocks used by the models
//!
//! ## Example
//!
//! ```
//! use sales_dashboard::etl::ReplenishWindow;
//! use chrono::NaiveDate;
//!
//! let last = NaiveDate::from_ymd_opt(2017, 1, 10).unwrap();
//! let window = ReplenishWindow::after(last, 7);
//! assert_eq!(window.first, NaiveDate::from_ymd_opt(2017, 1, 11).unwrap());
//! assert_eq!(window.dates().len(), 7);
//! ```

pub use forecast_math as math;
pub use sales_etl as etl;
pub use sales_forecast as forecast;

pub use sales_etl::{Pipeline, PipelineConfig, PipelineError};
pub use sales_forecast::{DailySalesSeries, ForecastSeries};

/// Version of the dashboard crates
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
