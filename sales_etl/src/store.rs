//! SQLite-backed order stores
//!
//! The raw order store and the staging source share one row shape: an
//! `order_date` text column, a numeric `sales` column, and any number of other
//! order attributes that are carried along untouched.

use crate::config::StoreLocation;
use crate::error::{PipelineError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column holding the order date
pub const ORDER_DATE_COLUMN: &str = "order_date";
/// Column holding the order amount
pub const SALES_COLUMN: &str = "sales";

/// Which persistent resource a connection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Raw,
    Staging,
    Warehouse,
}

impl StoreKind {
    pub fn label(&self) -> &'static str {
        match self {
            StoreKind::Raw => "raw order",
            StoreKind::Staging => "staging",
            StoreKind::Warehouse => "warehouse",
        }
    }
}

/// Open an existing database file; a missing file is a fatal store error
pub fn open_existing(kind: StoreKind, path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| unavailable(kind, path, source))
}

/// Open a database file, creating it if needed
pub fn open_or_create(kind: StoreKind, path: &Path) -> Result<Connection> {
    Connection::open(path).map_err(|source| unavailable(kind, path, source))
}

fn unavailable(kind: StoreKind, path: &Path, source: rusqlite::Error) -> PipelineError {
    PipelineError::StoreUnavailable {
        store: kind.label(),
        path: path.to_path_buf(),
        source,
    }
}

/// Quote an SQL identifier
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Check whether a table exists in the main schema
pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Parse a stored date in any of the accepted text formats
///
/// Accepts `M/D/YYYY`, `YYYY-MM-DD`, and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_order_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| PipelineError::InvalidDate(text.to_string()))
}

/// Read a numeric cell as `f64`
pub(crate) fn value_to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Real(r) => Ok(*r),
        Value::Text(t) => t
            .trim()
            .parse::<f64>()
            .map_err(|_| PipelineError::InvalidData(format!("'{}' is not a number", t))),
        other => Err(PipelineError::InvalidData(format!(
            "Expected a number, found {:?}",
            other
        ))),
    }
}

/// Read a date cell
pub(crate) fn value_to_date(value: &Value) -> Result<NaiveDate> {
    match value {
        Value::Text(t) => parse_order_date(t),
        other => Err(PipelineError::InvalidDate(format!("{:?}", other))),
    }
}

/// One transactional sale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawOrder {
    pub order_date: NaiveDate,
    pub sales: f64,
}

impl RawOrder {
    pub fn new(order_date: NaiveDate, sales: f64) -> Self {
        Self { order_date, sales }
    }
}

/// A full stored order row: its parsed date and amount plus every column as stored
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub order: RawOrder,
    pub columns: Vec<(String, Value)>,
}

/// A table of order rows (the raw order store or the staging source)
#[derive(Debug)]
pub struct OrderStore {
    conn: Connection,
    table: String,
    path: PathBuf,
}

impl OrderStore {
    /// Open an existing store
    pub fn open(kind: StoreKind, location: &StoreLocation) -> Result<Self> {
        let conn = open_existing(kind, &location.path)?;
        debug!(store = kind.label(), path = %location.path.display(), "opened order store");
        Ok(Self {
            conn,
            table: location.table.clone(),
            path: location.path.clone(),
        })
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
            path: PathBuf::from(":memory:"),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Read every row with all of its columns
    pub fn read_rows(&self) -> Result<Vec<OrderRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(&self.table)))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let position = |column: &str| {
            names.iter().position(|n| n == column).ok_or_else(|| {
                PipelineError::InvalidData(format!(
                    "Table '{}' has no '{}' column",
                    self.table, column
                ))
            })
        };
        let date_idx = position(ORDER_DATE_COLUMN)?;
        let sales_idx = position(SALES_COLUMN)?;

        let raw_rows = stmt.query_map([], |row| {
            (0..names.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<Value>>>()
        })?;

        let mut rows = Vec::new();
        for values in raw_rows {
            let values = values?;
            let order = RawOrder::new(
                value_to_date(&values[date_idx])?,
                value_to_f64(&values[sales_idx])?,
            );
            rows.push(OrderRow {
                order,
                columns: names.iter().cloned().zip(values).collect(),
            });
        }

        Ok(rows)
    }

    /// Read every row as a date and amount
    pub fn read_orders(&self) -> Result<Vec<RawOrder>> {
        Ok(self.read_rows()?.into_iter().map(|r| r.order).collect())
    }

    /// Latest order date in the store
    ///
    /// Stored dates are not in a sortable text format, so this parses every row.
    pub fn last_order_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.read_orders()?.into_iter().map(|o| o.order_date).max())
    }

    /// Append rows in one transaction, returning the number written
    pub fn append_rows(&mut self, rows: &[OrderRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        for row in rows {
            let columns: Vec<String> = row.columns.iter().map(|(n, _)| quote_ident(n)).collect();
            let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(&self.table),
                columns.join(", "),
                placeholders.join(", ")
            );
            tx.execute(&sql, params_from_iter(row.columns.iter().map(|(_, v)| v)))?;
        }
        tx.commit()?;

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2017, 1, 3).unwrap();

        assert_eq!(parse_order_date("1/3/2017").unwrap(), expected);
        assert_eq!(parse_order_date("01/03/2017").unwrap(), expected);
        assert_eq!(parse_order_date("2017-01-03").unwrap(), expected);
        assert_eq!(parse_order_date("2017-01-03 00:00:00").unwrap(), expected);
        assert!(matches!(
            parse_order_date("yesterday"),
            Err(PipelineError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("daily_sales"), "\"daily_sales\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(value_to_f64(&Value::Integer(3)).unwrap(), 3.0);
        assert_eq!(value_to_f64(&Value::Text("2.5".to_string())).unwrap(), 2.5);
        assert!(value_to_f64(&Value::Null).is_err());
        assert!(value_to_date(&Value::Integer(20170103)).is_err());
    }

    #[test]
    fn test_open_existing_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_existing(StoreKind::Raw, &dir.path().join("missing.db"));

        assert!(matches!(
            result,
            Err(PipelineError::StoreUnavailable { store: "raw order", .. })
        ));
    }
}
