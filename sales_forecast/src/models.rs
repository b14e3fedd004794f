//! Forecasting models for daily sales series
//!
//! A model is fitted from scratch on the full history every time; there is no
//! incremental update. [`ForecastModel::fit`] produces a trained model and
//! [`TrainedForecastModel::predict`] turns it into a [`ForecastSeries`] that covers
//! every history date followed by `horizon_days` future dates.

use crate::data::{DailySalesSeries, ForecastSeries};
use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predict every history date plus `horizon_days` future dates, in date order
    fn predict(&self, horizon_days: usize) -> Result<ForecastSeries>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted to a daily sales history
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model to the full history
    fn fit(&self, history: &DailySalesSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Multiplier on the residual standard deviation for a central interval of `width`
pub fn interval_multiplier(width: f64) -> Result<f64> {
    if width <= 0.0 || width >= 1.0 {
        return Err(ForecastError::InvalidParameter(
            "Interval width must be between 0 and 1".to_string(),
        ));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::ForecastingError(e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + width) / 2.0))
}

pub mod exponential_smoothing;
pub mod seasonal;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_interval_multiplier() {
        assert_abs_diff_eq!(interval_multiplier(0.95).unwrap(), 1.959964, epsilon = 1e-5);
        assert_abs_diff_eq!(interval_multiplier(0.80).unwrap(), 1.281552, epsilon = 1e-5);
        assert!(interval_multiplier(0.0).is_err());
        assert!(interval_multiplier(1.0).is_err());
    }
}
