//! Pipeline configuration
//!
//! Store locations are passed to each component at construction; nothing reads a
//! path from a module-level constant.

use crate::error::{PipelineError, Result};
use sales_forecast::holidays::HolidayRegion;
use sales_forecast::models::seasonal::{Seasonality, SeasonalModel, SeasonalityMode};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// File name of the raw order database inside a data directory
pub const RAW_DB_FILE: &str = "sales.db";
/// File name of the staging database inside a data directory
pub const STAGING_DB_FILE: &str = "new_data.db";
/// File name of the warehouse database inside a data directory
pub const WAREHOUSE_DB_FILE: &str = "warehouse.db";

/// A table inside a SQLite database file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreLocation {
    pub path: PathBuf,
    pub table: String,
}

impl StoreLocation {
    pub fn new(path: impl Into<PathBuf>, table: &str) -> Self {
        Self {
            path: path.into(),
            table: table.to_string(),
        }
    }
}

/// Everything a pipeline or replenish run needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw order store (`customer_sales`)
    pub raw_store: StoreLocation,
    /// Staging source of not-yet-ingested orders (`new_customer_sales`)
    pub staging_store: StoreLocation,
    /// Warehouse daily series store (`daily_sales`)
    pub warehouse: StoreLocation,
    /// Number of future days to forecast and chart
    pub horizon_days: usize,
    /// Number of calendar days appended by one replenish
    pub replenish_window_days: u32,
    pub forecast: ForecastConfig,
    pub chart: ChartConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::in_dir("../data")
    }
}

impl PipelineConfig {
    /// Standard layout with all three databases in one directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            raw_store: StoreLocation::new(dir.join(RAW_DB_FILE), "customer_sales"),
            staging_store: StoreLocation::new(dir.join(STAGING_DB_FILE), "new_customer_sales"),
            warehouse: StoreLocation::new(dir.join(WAREHOUSE_DB_FILE), "daily_sales"),
            horizon_days: 30,
            replenish_window_days: 7,
            forecast: ForecastConfig::default(),
            chart: ChartConfig::default(),
        }
    }

    /// Move all three database files into `dir`, keeping table names
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.raw_store.path = dir.join(RAW_DB_FILE);
        self.staging_store.path = dir.join(STAGING_DB_FILE);
        self.warehouse.path = dir.join(WAREHOUSE_DB_FILE);
        self
    }

    /// Load a configuration from a JSON file; missing fields take default values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(PipelineError::Config(
                "horizon_days must be at least 1".to_string(),
            ));
        }
        if self.replenish_window_days == 0 {
            return Err(PipelineError::Config(
                "replenish_window_days must be at least 1".to_string(),
            ));
        }
        for location in [&self.raw_store, &self.staging_store, &self.warehouse] {
            if location.table.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "Empty table name for store at {}",
                    location.path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Settings of the seasonal forecasting model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub weekly: SeasonalityMode,
    pub yearly: SeasonalityMode,
    /// Region whose public holidays become regressors
    pub holiday_region: Option<HolidayRegion>,
    /// Custom seasonal terms added on top of weekly/yearly
    pub seasonalities: Vec<Seasonality>,
    pub seasonality_prior_scale: f64,
    pub holidays_prior_scale: f64,
    pub interval_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            weekly: SeasonalityMode::Auto,
            yearly: SeasonalityMode::Auto,
            holiday_region: Some(HolidayRegion::UnitedStates),
            seasonalities: vec![Seasonality {
                name: "monthly".to_string(),
                period: 30.5,
                fourier_order: 4,
            }],
            seasonality_prior_scale: 10.0,
            holidays_prior_scale: 10.0,
            interval_width: 0.8,
        }
    }
}

impl ForecastConfig {
    /// Build the seasonal model described by this configuration
    pub fn build_model(&self) -> Result<SeasonalModel> {
        let mut model = SeasonalModel::new()
            .with_weekly(self.weekly)
            .with_yearly(self.yearly)
            .with_seasonality_prior_scale(self.seasonality_prior_scale)?
            .with_holidays_prior_scale(self.holidays_prior_scale)?
            .with_interval_width(self.interval_width)?;

        if let Some(region) = self.holiday_region {
            model = model.add_country_holidays(region);
        }
        for seasonality in &self.seasonalities {
            model = model.add_seasonality(
                &seasonality.name,
                seasonality.period,
                seasonality.fourier_order,
            )?;
        }

        Ok(model)
    }
}

/// Display hints handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub height: u32,
    pub width: u32,
    pub margin_top: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            x_axis_title: "Day".to_string(),
            y_axis_title: "Total Daily Sales ($)".to_string(),
            height: 850,
            width: 1300,
            margin_top: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_in_dir_layout() {
        let config = PipelineConfig::in_dir("/srv/data");

        assert_eq!(config.raw_store.path, PathBuf::from("/srv/data/sales.db"));
        assert_eq!(config.staging_store.table, "new_customer_sales");
        assert_eq!(config.warehouse.table, "daily_sales");
        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.replenish_window_days, 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"horizon_days": 14, "forecast": {{"holiday_region": null}}}}"#
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();

        assert_eq!(config.horizon_days, 14);
        assert_eq!(config.forecast.holiday_region, None);
        assert_eq!(config.forecast.seasonalities.len(), 1);
        assert_eq!(config.chart, ChartConfig::default());
        assert_eq!(config.warehouse, PipelineConfig::default().warehouse);
    }

    #[test]
    fn test_validate_rejects_zero_horizon() {
        let mut config = PipelineConfig::in_dir("data");
        config.horizon_days = 0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));

        let mut config = PipelineConfig::in_dir("data");
        config.warehouse.table = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_model_from_defaults() {
        let model = ForecastConfig::default().build_model().unwrap();

        assert_eq!(model.holiday_region(), Some(HolidayRegion::UnitedStates));
        assert_eq!(model.seasonalities()[0].name, "monthly");
    }
}
