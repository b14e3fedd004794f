//! # Sales ETL
//!
//! `sales_etl` is the weekly batch pipeline behind the sales forecast dashboard.
//!
//! ## Stages
//!
//! - **Aggregate**: raw order rows become one total per calendar date
//! - **Load**: new dates are appended to the warehouse past its high-water mark;
//!   stored dates are never rewritten
//! - **Forecast**: a seasonal model is refit on the full warehouse history and
//!   predicts a fixed horizon
//! - **Chart**: the future window is packaged for the dashboard
//!
//! A separate **replenish** step copies the next week of orders from a staging
//! source into the raw order store, simulating a weekly feed.
//!
//! ## Usage Example
//!
//! ```no_run
//! use sales_etl::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::in_dir("data"))?;
//!
//! let chart = pipeline.run()?;
//! println!("{}", chart.to_json()?);
//!
//! pipeline.replenish()?;
//! # Ok::<(), sales_etl::PipelineError>(())
//! ```

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod forecaster;
pub mod pipeline;
pub mod replenish;
pub mod reset;
pub mod store;
pub mod warehouse;

pub use crate::aggregate::aggregate;
pub use crate::chart::ChartPayload;
pub use crate::config::{ChartConfig, ForecastConfig, PipelineConfig, StoreLocation};
pub use crate::error::{PipelineError, Result};
pub use crate::forecaster::Forecaster;
pub use crate::pipeline::{Pipeline, PipelineRun};
pub use crate::replenish::{replenish, ReplenishReport, ReplenishWindow};
pub use crate::store::{OrderRow, OrderStore, RawOrder, StoreKind};
pub use crate::warehouse::{merge, MergeOutcome, SeriesStore, Warehouse, WarehouseState};
