//! Daily sales and forecast series

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the date column in the two-column frame representation
pub const DATE_COLUMN: &str = "ds";
/// Name of the value column in the two-column frame representation
pub const VALUE_COLUMN: &str = "y";

/// Convert a calendar date to the integer day number used in frames
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

/// Convert an integer day number from a frame back to a calendar date
pub fn days_to_date(days: i32) -> Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days)
        .ok_or_else(|| ForecastError::DataError(format!("Day number {} is out of range", days)))
}

/// Total sales for one calendar date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySalesPoint {
    /// Calendar date
    pub date: NaiveDate,
    /// Sum of all order amounts on that date
    pub total_sales: f64,
}

impl DailySalesPoint {
    pub fn new(date: NaiveDate, total_sales: f64) -> Self {
        Self { date, total_sales }
    }
}

/// A date-ordered series of daily totals with at most one point per date
///
/// Gaps between dates are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySalesSeries {
    points: Vec<DailySalesPoint>,
}

impl DailySalesSeries {
    /// Create a series from points in any order
    ///
    /// Fails if two points share a date or a total is not finite.
    pub fn new(mut points: Vec<DailySalesPoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.total_sales.is_finite()) {
            return Err(ForecastError::ValidationError(format!(
                "Total for {} is not a finite number",
                bad.date
            )));
        }

        points.sort_by_key(|p| p.date);
        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::ValidationError(format!(
                "Date {} appears more than once in the series",
                pair[0].date
            )));
        }

        Ok(Self { points })
    }

    /// Create an empty series
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a series from the two-column `{ds, y}` frame representation
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        if df.width() != 2 {
            return Err(ForecastError::ValidationError(format!(
                "Daily series frame must have exactly 2 columns, found {}",
                df.width()
            )));
        }

        let days = df.column(DATE_COLUMN)?.i32()?;
        let totals = df.column(VALUE_COLUMN)?.f64()?;

        let mut points = Vec::with_capacity(df.height());
        for (day, total) in days.into_iter().zip(totals.into_iter()) {
            match (day, total) {
                (Some(day), Some(total)) => {
                    points.push(DailySalesPoint::new(days_to_date(day)?, total))
                }
                _ => {
                    return Err(ForecastError::DataError(
                        "Daily series frame contains null values".to_string(),
                    ))
                }
            }
        }

        Self::new(points)
    }

    /// Convert to the two-column `{ds, y}` frame representation
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let days = Series::new(
            DATE_COLUMN,
            self.points
                .iter()
                .map(|p| date_to_days(p.date))
                .collect::<Vec<i32>>(),
        );
        let totals = Series::new(
            VALUE_COLUMN,
            self.points.iter().map(|p| p.total_sales).collect::<Vec<f64>>(),
        );

        Ok(DataFrame::new(vec![days, totals])?)
    }

    /// Get the points in ascending date order
    pub fn points(&self) -> &[DailySalesPoint] {
        &self.points
    }

    /// Get the dates in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Get the totals in date order
    pub fn totals(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_sales).collect()
    }

    /// Earliest date in the series
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Latest date in the series
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Total for a given date, if present
    pub fn total_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].total_sales)
    }

    /// Sum of all totals
    pub fn grand_total(&self) -> f64 {
        self.points.iter().map(|p| p.total_sales).sum()
    }

    /// The points strictly after `date`
    pub fn after(&self, date: NaiveDate) -> Self {
        let start = self.points.partition_point(|p| p.date <= date);
        Self {
            points: self.points[start..].to_vec(),
        }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// A predicted total for one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Calendar date
    pub date: NaiveDate,
    /// Predicted total
    pub predicted: f64,
    /// Lower bound of the uncertainty interval
    pub lower: f64,
    /// Upper bound of the uncertainty interval
    pub upper: f64,
}

/// Predictions over the fitted history followed by the future horizon
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Create a forecast series from points in date order
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    /// Get all points
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the dates of all points
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Get the predicted totals of all points
    pub fn predicted(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted).collect()
    }

    /// The last `n` points, or all points if there are fewer
    pub fn tail(&self, n: usize) -> &[ForecastPoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    /// True if dates are strictly increasing (ascending with no duplicates)
    pub fn is_strictly_ascending(&self) -> bool {
        self.points.windows(2).all(|w| w[0].date < w[1].date)
    }

    /// Serialize the series to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.points)?)
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.points.len()
    }
}
