//! Forecaster component: fit on the full history, predict history plus horizon

use crate::config::ForecastConfig;
use crate::error::{PipelineError, Result};
use sales_forecast::models::seasonal::SeasonalModel;
use sales_forecast::{DailySalesSeries, ForecastModel, ForecastSeries, TrainedForecastModel};
use tracing::info;

/// Wraps a forecasting model and enforces its output contract
///
/// The model is refit from scratch on every call.
#[derive(Debug, Clone)]
pub struct Forecaster<M: ForecastModel> {
    model: M,
}

impl Forecaster<SeasonalModel> {
    /// Build the seasonal forecaster described by the configuration
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Ok(Self::new(config.build_model()?))
    }
}

impl<M: ForecastModel> Forecaster<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Forecast every history date plus `horizon_days` future dates
    ///
    /// The result must hold exactly `history.len() + horizon_days` points in
    /// strictly ascending date order; a model that breaks this fails the run
    /// with [`PipelineError::ShapeInvariant`].
    pub fn forecast(&self, history: &DailySalesSeries, horizon_days: usize) -> Result<ForecastSeries> {
        let trained = self.model.fit(history)?;
        let forecast = trained.predict(horizon_days)?;

        let expected = history.len() + horizon_days;
        if forecast.len() != expected {
            return Err(PipelineError::ShapeInvariant(format!(
                "{} returned {} points for {} history days and a {}-day horizon",
                trained.name(),
                forecast.len(),
                history.len(),
                horizon_days
            )));
        }
        if !forecast.is_strictly_ascending() {
            return Err(PipelineError::ShapeInvariant(format!(
                "{} returned dates out of order or duplicated",
                trained.name()
            )));
        }

        info!(
            model = self.model.name(),
            history = history.len(),
            horizon = horizon_days,
            "forecast complete"
        );
        Ok(forecast)
    }
}
