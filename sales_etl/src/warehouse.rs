//! Warehouse store and incremental loader
//!
//! The warehouse holds the ever-growing daily series `(ds, y)`. Loads are
//! append-only past the high-water mark (the latest stored date): a date that is
//! already stored is never rewritten, so re-running a load with the same or
//! older data writes nothing.
//!
//! Two merges racing on the same warehouse can both observe the same high-water
//! mark and append the same dates twice. Callers must run loads one at a time.

use crate::config::StoreLocation;
use crate::error::Result;
use crate::store::{open_or_create, quote_ident, table_exists, value_to_date, value_to_f64, StoreKind};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use sales_forecast::data::{DATE_COLUMN, VALUE_COLUMN};
use sales_forecast::{DailySalesPoint, DailySalesSeries};
use std::path::Path;
use tracing::{debug, info};

/// What the warehouse currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseState {
    /// No table yet, or a table with no rows
    Empty,
    /// Holds data up to and including this date
    NonEmpty(NaiveDate),
}

impl WarehouseState {
    /// The latest stored date, if any
    pub fn high_water_mark(&self) -> Option<NaiveDate> {
        match self {
            WarehouseState::Empty => None,
            WarehouseState::NonEmpty(date) => Some(*date),
        }
    }
}

/// Result of a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The warehouse was empty and now holds the whole incoming series
    Initialized(usize),
    /// New dates were appended after the high-water mark
    Appended(usize),
    /// Nothing in the incoming series was newer than the high-water mark
    UpToDate,
}

impl MergeOutcome {
    /// Number of points written
    pub fn written(&self) -> usize {
        match self {
            MergeOutcome::Initialized(n) | MergeOutcome::Appended(n) => *n,
            MergeOutcome::UpToDate => 0,
        }
    }
}

/// A durable, append-only daily series
pub trait SeriesStore {
    /// Report whether the store is empty and, if not, its high-water mark
    fn state(&self) -> Result<WarehouseState>;

    /// Read the full stored series
    fn read_series(&self) -> Result<DailySalesSeries>;

    /// Append points, creating the underlying structure on first use
    fn append(&mut self, points: &[DailySalesPoint]) -> Result<()>;
}

/// Merge a freshly aggregated series into the warehouse
///
/// Only points strictly after the high-water mark are appended. An empty
/// warehouse is initialised with the whole series.
pub fn merge<S: SeriesStore + ?Sized>(
    incoming: &DailySalesSeries,
    store: &mut S,
) -> Result<MergeOutcome> {
    let state = store.state()?;
    debug!(?state, incoming = incoming.len(), "merging daily series");

    let fresh = match state {
        WarehouseState::Empty => incoming.clone(),
        WarehouseState::NonEmpty(high_water_mark) => incoming.after(high_water_mark),
    };

    if fresh.is_empty() {
        info!("warehouse up to date, nothing to load");
        return Ok(MergeOutcome::UpToDate);
    }

    store.append(fresh.points())?;

    let outcome = match state {
        WarehouseState::Empty => MergeOutcome::Initialized(fresh.len()),
        WarehouseState::NonEmpty(_) => MergeOutcome::Appended(fresh.len()),
    };
    info!(
        written = outcome.written(),
        first = ?fresh.first_date(),
        last = ?fresh.last_date(),
        "loaded daily sales into warehouse"
    );

    Ok(outcome)
}

/// Warehouse backed by a SQLite table `(ds TEXT, y REAL)`
#[derive(Debug)]
pub struct Warehouse {
    conn: Connection,
    table: String,
}

impl Warehouse {
    /// Open the warehouse database, creating the file if needed
    ///
    /// The table itself is only created by the first append.
    pub fn open(location: &StoreLocation) -> Result<Self> {
        Self::open_path(&location.path, &location.table)
    }

    pub fn open_path(path: &Path, table: &str) -> Result<Self> {
        let conn = open_or_create(StoreKind::Warehouse, path)?;
        Ok(Self::from_connection(conn, table))
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl SeriesStore for Warehouse {
    fn state(&self) -> Result<WarehouseState> {
        if !table_exists(&self.conn, &self.table)? {
            return Ok(WarehouseState::Empty);
        }

        let max: Option<String> = self.conn.query_row(
            &format!(
                "SELECT MAX({}) FROM {}",
                quote_ident(DATE_COLUMN),
                quote_ident(&self.table)
            ),
            [],
            |row| row.get(0),
        )?;

        match max {
            None => Ok(WarehouseState::Empty),
            Some(text) => Ok(WarehouseState::NonEmpty(value_to_date(&Value::Text(text))?)),
        }
    }

    fn read_series(&self) -> Result<DailySalesSeries> {
        if !table_exists(&self.conn, &self.table)? {
            return Ok(DailySalesSeries::empty());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}, {} FROM {}",
            quote_ident(DATE_COLUMN),
            quote_ident(VALUE_COLUMN),
            quote_ident(&self.table)
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Value>(0)?, row.get::<_, Value>(1)?))
        })?;

        let mut points = Vec::new();
        for row in rows {
            let (ds, y) = row?;
            points.push(DailySalesPoint::new(value_to_date(&ds)?, value_to_f64(&y)?));
        }

        Ok(DailySalesSeries::new(points)?)
    }

    fn append(&mut self, points: &[DailySalesPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let table = quote_ident(&self.table);
        let tx = self.conn.transaction()?;
        tx.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} ({} TEXT NOT NULL, {} REAL NOT NULL)",
                table,
                quote_ident(DATE_COLUMN),
                quote_ident(VALUE_COLUMN)
            ),
            [],
        )?;
        {
            let mut insert = tx.prepare(&format!(
                "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
                table,
                quote_ident(DATE_COLUMN),
                quote_ident(VALUE_COLUMN)
            ))?;
            for point in points {
                insert.execute(params![
                    point.date.format("%Y-%m-%d").to_string(),
                    point.total_sales
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_state_of_missing_table_is_empty() {
        let warehouse = Warehouse::from_connection(Connection::open_in_memory().unwrap(), "daily_sales");

        assert_eq!(warehouse.state().unwrap(), WarehouseState::Empty);
        assert!(warehouse.read_series().unwrap().is_empty());
    }

    #[test]
    fn test_state_of_empty_table_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE daily_sales (ds TEXT, y REAL)", [])
            .unwrap();
        let warehouse = Warehouse::from_connection(conn, "daily_sales");

        assert_eq!(warehouse.state().unwrap(), WarehouseState::Empty);
    }

    #[test]
    fn test_reads_legacy_timestamp_dates() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE daily_sales (ds TIMESTAMP, y INTEGER);
             INSERT INTO daily_sales VALUES ('2017-01-03 00:00:00', 16);
             INSERT INTO daily_sales VALUES ('2017-01-04 00:00:00', 288);",
        )
        .unwrap();
        let warehouse = Warehouse::from_connection(conn, "daily_sales");

        assert_eq!(
            warehouse.state().unwrap(),
            WarehouseState::NonEmpty(date("2017-01-04"))
        );
        let series = warehouse.read_series().unwrap();
        assert_eq!(series.total_on(date("2017-01-04")), Some(288.0));
    }

    #[test]
    fn test_merge_outcome_written() {
        assert_eq!(MergeOutcome::Initialized(3).written(), 3);
        assert_eq!(MergeOutcome::Appended(2).written(), 2);
        assert_eq!(MergeOutcome::UpToDate.written(), 0);
    }
}
