//! Additive seasonal model
//!
//! The daily total is modelled as
//!
//! ```text
//! y(d) = intercept + slope * t(d) + Σ seasonalities(d) + Σ holidays(d)
//! ```
//!
//! where `t` is time rescaled so the history spans `[0, 1]`, each seasonality is a
//! truncated Fourier series in absolute day number, and each holiday is an
//! indicator for a named holiday seen in the history. Coefficients are found by
//! ridge regression, with seasonal and holiday penalties derived from their prior
//! scales. Targets are divided by `max |y|` before fitting.

use crate::data::{date_to_days, DailySalesSeries, ForecastPoint, ForecastSeries};
use crate::error::{ForecastError, Result};
use crate::holidays::HolidayRegion;
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::models::{interval_multiplier, ForecastModel, TrainedForecastModel};
use chrono::{Duration, NaiveDate};
use forecast_math::{FourierSeries, RidgeRegression};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Period of the built-in weekly seasonality, in days
pub const WEEKLY_PERIOD: f64 = 7.0;
/// Fourier order of the built-in weekly seasonality
pub const WEEKLY_ORDER: usize = 3;
/// Period of the built-in yearly seasonality, in days
pub const YEARLY_PERIOD: f64 = 365.25;
/// Fourier order of the built-in yearly seasonality
pub const YEARLY_ORDER: usize = 10;

/// Penalty on the trend slope
const TREND_PENALTY: f64 = 1.0 / 25.0;

/// Whether a built-in seasonality is included in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityMode {
    /// Included once the history is long enough to identify it
    Auto,
    Enabled,
    Disabled,
}

/// A named periodic component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    /// Name of the component
    pub name: String,
    /// Period in days
    pub period: f64,
    /// Fourier order
    pub fourier_order: usize,
}

impl Seasonality {
    fn series(&self) -> Result<FourierSeries> {
        Ok(FourierSeries::new(self.period, self.fourier_order)?)
    }
}

/// Untrained seasonal model configuration
#[derive(Debug, Clone)]
pub struct SeasonalModel {
    name: String,
    weekly: SeasonalityMode,
    yearly: SeasonalityMode,
    custom: Vec<Seasonality>,
    holidays: Option<HolidayRegion>,
    seasonality_prior_scale: f64,
    holidays_prior_scale: f64,
    interval_width: f64,
}

impl Default for SeasonalModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonalModel {
    /// Create a model with automatic weekly and yearly seasonality and no holidays
    pub fn new() -> Self {
        Self {
            name: "Seasonal Additive".to_string(),
            weekly: SeasonalityMode::Auto,
            yearly: SeasonalityMode::Auto,
            custom: Vec::new(),
            holidays: None,
            seasonality_prior_scale: 10.0,
            holidays_prior_scale: 10.0,
            interval_width: 0.8,
        }
    }

    /// Set how the weekly seasonality is included
    pub fn with_weekly(mut self, mode: SeasonalityMode) -> Self {
        self.weekly = mode;
        self
    }

    /// Set how the yearly seasonality is included
    pub fn with_yearly(mut self, mode: SeasonalityMode) -> Self {
        self.yearly = mode;
        self
    }

    /// Add a named custom seasonality
    pub fn add_seasonality(mut self, name: &str, period: f64, fourier_order: usize) -> Result<Self> {
        if name == "weekly" || name == "yearly" {
            return Err(ForecastError::InvalidParameter(format!(
                "'{}' is a built-in seasonality; use with_{} instead",
                name, name
            )));
        }
        if self.custom.iter().any(|s| s.name == name) {
            return Err(ForecastError::InvalidParameter(format!(
                "Seasonality '{}' already added",
                name
            )));
        }

        let seasonality = Seasonality {
            name: name.to_string(),
            period,
            fourier_order,
        };
        // Validate period and order up front
        seasonality.series()?;
        self.custom.push(seasonality);

        Ok(self)
    }

    /// Add the public holidays of a region as regressors
    pub fn add_country_holidays(mut self, region: HolidayRegion) -> Self {
        self.holidays = Some(region);
        self
    }

    /// Set the prior scale of all seasonal components
    pub fn with_seasonality_prior_scale(mut self, scale: f64) -> Result<Self> {
        self.seasonality_prior_scale = validate_prior_scale(scale)?;
        Ok(self)
    }

    /// Set the prior scale of holiday effects
    pub fn with_holidays_prior_scale(mut self, scale: f64) -> Result<Self> {
        self.holidays_prior_scale = validate_prior_scale(scale)?;
        Ok(self)
    }

    /// Set the width of the uncertainty interval
    pub fn with_interval_width(mut self, width: f64) -> Result<Self> {
        interval_multiplier(width)?;
        self.interval_width = width;
        Ok(self)
    }

    /// Custom seasonalities added to the model
    pub fn seasonalities(&self) -> &[Seasonality] {
        &self.custom
    }

    /// Holiday region, if any
    pub fn holiday_region(&self) -> Option<HolidayRegion> {
        self.holidays
    }

    fn resolve_seasonalities(&self, span_days: i64) -> Vec<Seasonality> {
        let mut seasonalities = Vec::new();

        let builtins = [
            (self.weekly, "weekly", WEEKLY_PERIOD, WEEKLY_ORDER, 14),
            (self.yearly, "yearly", YEARLY_PERIOD, YEARLY_ORDER, 730),
        ];
        for (mode, name, period, fourier_order, min_span) in builtins {
            let include = match mode {
                SeasonalityMode::Enabled => true,
                SeasonalityMode::Disabled => false,
                SeasonalityMode::Auto => span_days >= min_span,
            };
            if include {
                seasonalities.push(Seasonality {
                    name: name.to_string(),
                    period,
                    fourier_order,
                });
            }
        }

        seasonalities.extend(self.custom.iter().cloned());
        seasonalities
    }
}

fn validate_prior_scale(scale: f64) -> Result<f64> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ForecastError::InvalidParameter(
            "Prior scale must be positive".to_string(),
        ));
    }
    Ok(scale)
}

/// Column layout of the design matrix
#[derive(Debug, Clone)]
struct FeatureLayout {
    start: NaiveDate,
    span_days: f64,
    seasonalities: Vec<(String, FourierSeries)>,
    region: Option<HolidayRegion>,
    holiday_names: Vec<String>,
}

impl FeatureLayout {
    fn width(&self) -> usize {
        2 + self.seasonalities.iter().map(|(_, s)| s.width()).sum::<usize>()
            + self.holiday_names.len()
    }

    fn penalties(&self, seasonality_penalty: f64, holiday_penalty: f64) -> Vec<f64> {
        let mut penalties = vec![0.0, TREND_PENALTY];
        for (_, series) in &self.seasonalities {
            penalties.extend(std::iter::repeat(seasonality_penalty).take(series.width()));
        }
        penalties.extend(std::iter::repeat(holiday_penalty).take(self.holiday_names.len()));
        penalties
    }

    /// Holiday names by date over `[start, end]`
    fn holiday_index(&self, end: NaiveDate) -> HashMap<NaiveDate, Vec<String>> {
        let mut index: HashMap<NaiveDate, Vec<String>> = HashMap::new();
        if let Some(region) = self.region {
            for holiday in region.holidays_between(self.start, end) {
                index.entry(holiday.date).or_default().push(holiday.name);
            }
        }
        index
    }

    fn row(&self, date: NaiveDate, holidays: &HashMap<NaiveDate, Vec<String>>) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push((date - self.start).num_days() as f64 / self.span_days);

        let day = date_to_days(date) as f64;
        for (_, series) in &self.seasonalities {
            series.extend_terms(day, &mut row);
        }

        let on_date = holidays.get(&date);
        for name in &self.holiday_names {
            let hit = on_date.map_or(false, |names| names.contains(name));
            row.push(if hit { 1.0 } else { 0.0 });
        }

        row
    }
}

/// Seasonal model fitted to a history
#[derive(Debug, Clone)]
pub struct TrainedSeasonalModel {
    name: String,
    layout: FeatureLayout,
    regression: RidgeRegression,
    y_scale: f64,
    history_dates: Vec<NaiveDate>,
    interval_half_width: f64,
    accuracy: ForecastAccuracy,
}

impl TrainedSeasonalModel {
    /// In-sample accuracy of the fit
    pub fn accuracy(&self) -> &ForecastAccuracy {
        &self.accuracy
    }

    /// Names of the seasonal components in the fitted model
    pub fn seasonality_names(&self) -> Vec<&str> {
        self.layout
            .seasonalities
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Names of the holidays that received a coefficient
    pub fn holiday_names(&self) -> &[String] {
        &self.layout.holiday_names
    }

    fn predict_one(&self, row: &[f64]) -> Result<f64> {
        Ok(self.regression.predict(row)? * self.y_scale)
    }
}

impl ForecastModel for SeasonalModel {
    type Trained = TrainedSeasonalModel;

    fn fit(&self, history: &DailySalesSeries) -> Result<Self::Trained> {
        let (start, end) = match (history.first_date(), history.last_date()) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(ForecastError::DataError(
                    "Cannot fit a model to an empty history".to_string(),
                ))
            }
        };
        let span_days = (end - start).num_days();

        let seasonalities = self
            .resolve_seasonalities(span_days)
            .into_iter()
            .map(|s| Ok((s.name.clone(), s.series()?)))
            .collect::<Result<Vec<_>>>()?;

        let holiday_names: Vec<String> = match self.holidays {
            Some(region) => region
                .holidays_between(start, end)
                .into_iter()
                .map(|h| h.name)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => Vec::new(),
        };

        let layout = FeatureLayout {
            start,
            span_days: span_days.max(1) as f64,
            seasonalities,
            region: self.holidays,
            holiday_names,
        };

        let totals = history.totals();
        let y_max = totals.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_max > 0.0 { y_max } else { 1.0 };

        let holidays = layout.holiday_index(end);
        let rows: Vec<Vec<f64>> = history
            .points()
            .iter()
            .map(|p| layout.row(p.date, &holidays))
            .collect();
        let targets: Vec<f64> = totals.iter().map(|v| v / y_scale).collect();

        let penalties = layout.penalties(
            1.0 / self.seasonality_prior_scale.powi(2),
            1.0 / self.holidays_prior_scale.powi(2),
        );
        let mut regression = RidgeRegression::new(penalties)?;
        regression.fit(&rows, &targets)?;

        let mut fitted = Vec::with_capacity(rows.len());
        for row in &rows {
            fitted.push(regression.predict(row)? * y_scale);
        }
        let accuracy = forecast_accuracy(&fitted, &totals)?;
        let interval_half_width = interval_multiplier(self.interval_width)? * accuracy.rmse;

        debug!(
            model = %self.name,
            points = history.len(),
            columns = layout.width(),
            holidays = layout.holiday_names.len(),
            accuracy = %accuracy,
            "fitted seasonal model"
        );

        Ok(TrainedSeasonalModel {
            name: self.name.clone(),
            layout,
            regression,
            y_scale,
            history_dates: history.dates(),
            interval_half_width,
            accuracy,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSeasonalModel {
    fn predict(&self, horizon_days: usize) -> Result<ForecastSeries> {
        let last = match self.history_dates.last() {
            Some(last) => *last,
            None => {
                return Err(ForecastError::ForecastingError(
                    "Trained model has no history".to_string(),
                ))
            }
        };

        let future = (1..=horizon_days as i64).map(|d| last + Duration::days(d));
        let dates: Vec<NaiveDate> = self.history_dates.iter().copied().chain(future).collect();

        let end = dates.last().copied().unwrap_or(last);
        let holidays = self.layout.holiday_index(end);

        let mut points = Vec::with_capacity(dates.len());
        for date in dates {
            let predicted = self.predict_one(&self.layout.row(date, &holidays))?;
            points.push(ForecastPoint {
                date,
                predicted,
                lower: predicted - self.interval_half_width,
                upper: predicted + self.interval_half_width,
            });
        }

        Ok(ForecastSeries::new(points))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DailySalesPoint;
    use chrono::Datelike;

    fn series(start: &str, values: &[f64]) -> DailySalesSeries {
        let start: NaiveDate = start.parse().unwrap();
        DailySalesSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| DailySalesPoint::new(start + Duration::days(i as i64), *v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_auto_seasonality_depends_on_span() {
        let model = SeasonalModel::new();

        let short = model.fit(&series("2024-03-01", &[1.0; 10])).unwrap();
        assert!(short.seasonality_names().is_empty());

        let long = model.fit(&series("2024-03-01", &[1.0; 30])).unwrap();
        assert_eq!(long.seasonality_names(), vec!["weekly"]);
    }

    #[test]
    fn test_custom_seasonality_validation() {
        assert!(SeasonalModel::new().add_seasonality("weekly", 7.0, 3).is_err());
        assert!(SeasonalModel::new().add_seasonality("monthly", 0.0, 4).is_err());
        assert!(SeasonalModel::new()
            .add_seasonality("monthly", 30.5, 4)
            .unwrap()
            .add_seasonality("monthly", 30.5, 4)
            .is_err());
    }

    #[test]
    fn test_learns_weekly_pattern() {
        // Weekends sell double
        let start: NaiveDate = "2024-01-01".parse().unwrap();
        let values: Vec<f64> = (0..56)
            .map(|i| {
                let date = start + Duration::days(i);
                if date.weekday().number_from_monday() >= 6 {
                    200.0
                } else {
                    100.0
                }
            })
            .collect();
        let history = series("2024-01-01", &values);

        let model = SeasonalModel::new()
            .with_weekly(SeasonalityMode::Enabled)
            .with_yearly(SeasonalityMode::Disabled);
        let trained = model.fit(&history).unwrap();
        let forecast = trained.predict(7).unwrap();

        let future = forecast.tail(7);
        let weekend: Vec<f64> = future
            .iter()
            .filter(|p| p.date.weekday().number_from_monday() >= 6)
            .map(|p| p.predicted)
            .collect();
        let weekday: Vec<f64> = future
            .iter()
            .filter(|p| p.date.weekday().number_from_monday() < 6)
            .map(|p| p.predicted)
            .collect();

        let weekend_mean = weekend.iter().sum::<f64>() / weekend.len() as f64;
        let weekday_mean = weekday.iter().sum::<f64>() / weekday.len() as f64;
        assert!(weekend_mean > weekday_mean + 50.0);
    }

    #[test]
    fn test_holidays_in_history_get_columns() {
        let model = SeasonalModel::new().add_country_holidays(HolidayRegion::UnitedStates);
        let trained = model.fit(&series("2023-12-20", &[10.0; 20])).unwrap();

        assert!(trained.holiday_names().contains(&"Christmas Day".to_string()));
        assert!(trained.holiday_names().contains(&"New Year's Day".to_string()));
    }
}
