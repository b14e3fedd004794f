//! Simple exponential smoothing for daily sales
//!
//! A level-only baseline: fitted values are one-step-ahead predictions over the
//! history and the forecast stays flat at the final level.

use crate::data::{DailySalesSeries, ForecastPoint, ForecastSeries};
use crate::error::{ForecastError, Result};
use crate::metrics::forecast_accuracy;
use crate::models::{interval_multiplier, ForecastModel, TrainedForecastModel};
use chrono::{Duration, NaiveDate};

/// Simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
}

/// Trained exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    name: String,
    /// One-step-ahead fitted values, paired with their dates
    fitted: Vec<(NaiveDate, f64)>,
    /// Final level
    level: f64,
    interval_half_width: f64,
}

impl ExponentialSmoothing {
    /// Create a new exponential smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Exponential Smoothing (alpha={})", alpha),
            alpha,
        })
    }
}

impl ForecastModel for ExponentialSmoothing {
    type Trained = TrainedExponentialSmoothing;

    fn fit(&self, history: &DailySalesSeries) -> Result<Self::Trained> {
        let totals = history.totals();
        let first = match totals.first() {
            Some(first) => *first,
            None => {
                return Err(ForecastError::DataError(
                    "Cannot fit a model to an empty history".to_string(),
                ))
            }
        };

        let mut level = first;
        let mut fitted = Vec::with_capacity(totals.len());
        for point in history.points() {
            // Prediction for this day is the level before seeing it
            fitted.push((point.date, level));
            level = self.alpha * point.total_sales + (1.0 - self.alpha) * level;
        }

        let predicted: Vec<f64> = fitted.iter().map(|(_, v)| *v).collect();
        let accuracy = forecast_accuracy(&predicted, &totals)?;

        Ok(TrainedExponentialSmoothing {
            name: self.name.clone(),
            fitted,
            level,
            interval_half_width: interval_multiplier(0.8)? * accuracy.rmse,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedExponentialSmoothing {
    fn predict(&self, horizon_days: usize) -> Result<ForecastSeries> {
        let last = match self.fitted.last() {
            Some((date, _)) => *date,
            None => {
                return Err(ForecastError::ForecastingError(
                    "Trained model has no history".to_string(),
                ))
            }
        };

        let future = (1..=horizon_days as i64).map(|d| (last + Duration::days(d), self.level));
        let points = self
            .fitted
            .iter()
            .copied()
            .chain(future)
            .map(|(date, predicted)| ForecastPoint {
                date,
                predicted,
                lower: predicted - self.interval_half_width,
                upper: predicted + self.interval_half_width,
            })
            .collect();

        Ok(ForecastSeries::new(points))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
