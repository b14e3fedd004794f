//! Pipeline orchestration
//!
//! One run is a linear sequence with no branching:
//!
//! 1. read raw orders
//! 2. aggregate them into daily totals
//! 3. merge the totals into the warehouse
//! 4. read the full warehouse series
//! 5. forecast history plus horizon
//! 6. chart the last `horizon_days` points (the future window)
//!
//! The first failing step aborts the run and nothing partial is returned. Store
//! connections live only for the duration of the call.

use crate::aggregate::aggregate;
use crate::chart::ChartPayload;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::forecaster::Forecaster;
use crate::replenish::{self, ReplenishReport};
use crate::store::{OrderStore, StoreKind};
use crate::warehouse::{merge, MergeOutcome, SeriesStore, Warehouse};
use sales_forecast::models::seasonal::SeasonalModel;
use sales_forecast::{ForecastModel, ForecastSeries};
use tracing::info;

/// Everything produced by one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// What the warehouse load did
    pub merge: MergeOutcome,
    /// Number of days in the warehouse after the load
    pub history_len: usize,
    /// Full forecast: fitted history followed by the horizon
    pub forecast: ForecastSeries,
    /// Chart of the future window
    pub chart: ChartPayload,
}

/// The weekly batch pipeline
#[derive(Debug, Clone)]
pub struct Pipeline<M: ForecastModel = SeasonalModel> {
    config: PipelineConfig,
    forecaster: Forecaster<M>,
}

impl Pipeline<SeasonalModel> {
    /// Create a pipeline with the seasonal model described by the configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let forecaster = Forecaster::from_config(&config.forecast)?;
        Self::with_forecaster(config, forecaster)
    }
}

impl<M: ForecastModel> Pipeline<M> {
    /// Create a pipeline with any forecasting model
    pub fn with_forecaster(config: PipelineConfig, forecaster: Forecaster<M>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, forecaster })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline and return the chart payload
    pub fn run(&self) -> Result<ChartPayload> {
        Ok(self.execute()?.chart)
    }

    /// Run the pipeline against the configured stores
    pub fn execute(&self) -> Result<PipelineRun> {
        let raw = OrderStore::open(StoreKind::Raw, &self.config.raw_store)?;
        let mut warehouse = Warehouse::open(&self.config.warehouse)?;

        self.execute_with(&raw, &mut warehouse)
    }

    /// Run the pipeline against already open stores
    pub fn execute_with<S: SeriesStore + ?Sized>(
        &self,
        raw: &OrderStore,
        warehouse: &mut S,
    ) -> Result<PipelineRun> {
        let orders = raw.read_orders()?;
        info!(orders = orders.len(), table = raw.table(), "extracted raw orders");

        let daily = aggregate(&orders)?;
        let outcome = merge(&daily, warehouse)?;

        let history = warehouse.read_series()?;
        let horizon = self.config.horizon_days;
        let forecast = self.forecaster.forecast(&history, horizon)?;

        let chart = ChartPayload::from_window(forecast.tail(horizon), &self.config.chart);

        Ok(PipelineRun {
            merge: outcome,
            history_len: history.len(),
            forecast,
            chart,
        })
    }

    /// Append the next window of staging orders to the raw store
    pub fn replenish(&self) -> Result<ReplenishReport> {
        replenish::replenish(&self.config)
    }
}
