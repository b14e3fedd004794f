//! Raw orders to daily totals

use crate::error::{PipelineError, Result};
use crate::store::{RawOrder, SALES_COLUMN};
use polars::prelude::*;
use sales_forecast::data::{date_to_days, DATE_COLUMN, VALUE_COLUMN};
use sales_forecast::DailySalesSeries;
use tracing::debug;

/// Sum raw order amounts per calendar date
///
/// The result has one point per distinct input date. Its frame form must have
/// exactly the two columns `{ds, y}`; anything else is a [`PipelineError::ShapeInvariant`].
pub fn aggregate(orders: &[RawOrder]) -> Result<DailySalesSeries> {
    if orders.is_empty() {
        return Ok(DailySalesSeries::empty());
    }

    if let Some(bad) = orders.iter().find(|o| !o.sales.is_finite()) {
        return Err(PipelineError::InvalidData(format!(
            "Order on {} has a non-finite amount",
            bad.order_date
        )));
    }

    let raw = DataFrame::new(vec![
        Series::new(
            DATE_COLUMN,
            orders
                .iter()
                .map(|o| date_to_days(o.order_date))
                .collect::<Vec<i32>>(),
        ),
        Series::new(
            SALES_COLUMN,
            orders.iter().map(|o| o.sales).collect::<Vec<f64>>(),
        ),
    ])?;

    let daily = raw
        .lazy()
        .groupby([col(DATE_COLUMN)])
        .agg([col(SALES_COLUMN).sum().alias(VALUE_COLUMN)])
        .sort(DATE_COLUMN, SortOptions::default())
        .collect()?;

    if daily.width() != 2 {
        return Err(PipelineError::ShapeInvariant(format!(
            "Aggregated frame must have exactly 2 columns ({}, {}), found {}",
            DATE_COLUMN,
            VALUE_COLUMN,
            daily.width()
        )));
    }

    let series = DailySalesSeries::from_dataframe(&daily)?;
    debug!(
        orders = orders.len(),
        days = series.len(),
        "aggregated raw orders into daily totals"
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_input_gives_empty_series() {
        let series = aggregate(&[]).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_sums_per_date() {
        let orders = vec![
            RawOrder::new(date("2024-01-02"), 100.0),
            RawOrder::new(date("2024-01-01"), 60.0),
            RawOrder::new(date("2024-01-02"), 50.0),
            RawOrder::new(date("2024-01-01"), 40.0),
        ];

        let series = aggregate(&orders).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.total_on(date("2024-01-01")), Some(100.0));
        assert_eq!(series.total_on(date("2024-01-02")), Some(150.0));
    }

    #[test]
    fn test_rejects_non_finite_amounts() {
        let orders = vec![RawOrder::new(date("2024-01-01"), f64::INFINITY)];
        assert!(matches!(
            aggregate(&orders),
            Err(PipelineError::InvalidData(_))
        ));
    }
}
