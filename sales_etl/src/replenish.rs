//! Weekly replenishment of the raw order store from the staging source
//!
//! Each call copies the staging rows dated within the 7 days after the latest raw
//! order. Rows are not deduplicated: replenishing the same window twice doubles
//! those days' totals, so callers run it once per window.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::store::{OrderRow, OrderStore, StoreKind};
use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

/// Dates covered by one replenish: `[last_date + 1, last_date + days]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplenishWindow {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl ReplenishWindow {
    /// The `days` consecutive dates starting the day after `last_date`
    pub fn after(last_date: NaiveDate, days: u32) -> Self {
        Self {
            first: last_date + Duration::days(1),
            last: last_date + Duration::days(i64::from(days.max(1))),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }

    /// Every date in the window, in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.first
            .iter_days()
            .take_while(|d| *d <= self.last)
            .collect()
    }
}

/// Result of a replenish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplenishReport {
    /// Window used, or `None` when the raw store had no orders to anchor it
    pub window: Option<ReplenishWindow>,
    /// Number of rows appended to the raw store
    pub appended: usize,
}

/// Append staging rows in the next window to the raw order store
pub fn replenish_from(
    raw: &mut OrderStore,
    staging: &OrderStore,
    window_days: u32,
) -> Result<ReplenishReport> {
    let last_date = match raw.last_order_date()? {
        Some(date) => date,
        None => {
            warn!(table = raw.table(), "raw order store is empty, nothing to replenish from");
            return Ok(ReplenishReport {
                window: None,
                appended: 0,
            });
        }
    };

    let window = ReplenishWindow::after(last_date, window_days);
    let selected: Vec<OrderRow> = staging
        .read_rows()?
        .into_iter()
        .filter(|row| window.contains(row.order.order_date))
        .collect();

    let appended = raw.append_rows(&selected)?;
    info!(
        first = %window.first,
        last = %window.last,
        appended,
        "replenished raw order store"
    );

    Ok(ReplenishReport {
        window: Some(window),
        appended,
    })
}

/// Open the raw and staging stores from the configuration and replenish once
pub fn replenish(config: &PipelineConfig) -> Result<ReplenishReport> {
    let mut raw = OrderStore::open(StoreKind::Raw, &config.raw_store)?;
    let staging = OrderStore::open(StoreKind::Staging, &config.staging_store)?;

    replenish_from(&mut raw, &staging, config.replenish_window_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_window_is_seven_closed_days() {
        let window = ReplenishWindow::after(date("2024-02-26"), 7);

        assert_eq!(window.first, date("2024-02-27"));
        assert_eq!(window.last, date("2024-03-04"));
        assert_eq!(window.dates().len(), 7);
        assert!(window.contains(date("2024-03-04")));
        assert!(!window.contains(date("2024-02-26")));
        assert!(!window.contains(date("2024-03-05")));
    }
}
