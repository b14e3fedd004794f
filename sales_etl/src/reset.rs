//! Reset the stores to a known starting point
//!
//! Reloads the raw order table and the staging table from CSV files and removes
//! the warehouse database so the next pipeline run starts with a first load.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::store::{open_or_create, quote_ident, StoreKind};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// What a reset did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub raw_rows: usize,
    pub staging_rows: usize,
    /// False if there was no warehouse file to remove
    pub warehouse_removed: bool,
}

/// Replace the raw and staging tables with CSV contents and drop the warehouse
pub fn reset_stores(config: &PipelineConfig, base_csv: &Path, new_csv: &Path) -> Result<ResetReport> {
    let raw_rows = load_csv_table(
        StoreKind::Raw,
        &config.raw_store.path,
        &config.raw_store.table,
        base_csv,
    )?;
    let staging_rows = load_csv_table(
        StoreKind::Staging,
        &config.staging_store.path,
        &config.staging_store.table,
        new_csv,
    )?;

    let warehouse_removed = match fs::remove_file(&config.warehouse.path) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };

    info!(raw_rows, staging_rows, warehouse_removed, "reset stores");
    Ok(ResetReport {
        raw_rows,
        staging_rows,
        warehouse_removed,
    })
}

/// Replace `table` in the database at `db_path` with the rows of a CSV file
pub fn load_csv_table(kind: StoreKind, db_path: &Path, table: &str, csv_path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut conn = open_or_create(kind, db_path)?;
    let tx = conn.transaction()?;

    let table = quote_ident(table);
    let columns: Vec<String> = headers.iter().map(|h| quote_ident(h)).collect();
    tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
    tx.execute(
        &format!("CREATE TABLE {} ({})", table, columns.join(", ")),
        [],
    )?;

    let mut count = 0;
    {
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let mut insert = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        ))?;
        for record in reader.records() {
            let record = record?;
            insert.execute(params_from_iter(record.iter().map(cell_value)))?;
            count += 1;
        }
    }
    tx.commit()?;

    Ok(count)
}

/// Store integers and decimals as numbers, everything else as text
fn cell_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        Value::Null
    } else if let Ok(i) = trimmed.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(r) = trimmed.parse::<f64>() {
        Value::Real(r)
    } else {
        Value::Text(cell.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value() {
        assert_eq!(cell_value("261.96"), Value::Real(261.96));
        assert_eq!(cell_value("2"), Value::Integer(2));
        assert_eq!(cell_value("11/8/2016"), Value::Text("11/8/2016".to_string()));
        assert_eq!(cell_value(""), Value::Null);
    }
}
