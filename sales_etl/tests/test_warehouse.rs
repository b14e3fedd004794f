use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use sales_etl::{merge, MergeOutcome, SeriesStore, Warehouse, WarehouseState};
use sales_forecast::{DailySalesPoint, DailySalesSeries};
use tempfile::tempdir;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn series(points: &[(&str, f64)]) -> DailySalesSeries {
    DailySalesSeries::new(
        points
            .iter()
            .map(|(d, v)| DailySalesPoint::new(date(d), *v))
            .collect(),
    )
    .unwrap()
}

fn in_memory() -> Warehouse {
    Warehouse::from_connection(Connection::open_in_memory().unwrap(), "daily_sales")
}

#[test]
fn test_first_load_stores_exactly_the_incoming_series() {
    let mut warehouse = in_memory();
    let incoming = series(&[("2024-01-01", 100.0), ("2024-01-02", 150.0)]);

    let outcome = merge(&incoming, &mut warehouse).unwrap();

    assert_eq!(outcome, MergeOutcome::Initialized(2));
    assert_eq!(warehouse.read_series().unwrap(), incoming);
    assert_eq!(
        warehouse.state().unwrap(),
        WarehouseState::NonEmpty(date("2024-01-02"))
    );
}

#[test]
fn test_merge_is_idempotent() {
    let mut once = in_memory();
    let mut twice = in_memory();
    let incoming = series(&[("2024-01-01", 100.0), ("2024-01-02", 150.0)]);

    merge(&incoming, &mut once).unwrap();
    merge(&incoming, &mut twice).unwrap();
    let second = merge(&incoming, &mut twice).unwrap();

    assert_eq!(second, MergeOutcome::UpToDate);
    assert_eq!(twice.read_series().unwrap(), once.read_series().unwrap());
}

#[test]
fn test_merge_is_monotonic_and_never_overwrites() {
    let mut warehouse = in_memory();
    merge(
        &series(&[("2024-01-01", 100.0), ("2024-01-02", 150.0)]),
        &mut warehouse,
    )
    .unwrap();
    let before = warehouse.read_series().unwrap();

    // Overlapping load with a revised total for a stored date
    let overlapping = series(&[
        ("2024-01-01", 999.0),
        ("2024-01-02", 999.0),
        ("2024-01-03", 120.0),
        ("2024-01-05", 80.0),
    ]);
    let outcome = merge(&overlapping, &mut warehouse).unwrap();
    let after = warehouse.read_series().unwrap();

    assert_eq!(outcome, MergeOutcome::Appended(2));
    for point in before.points() {
        assert_eq!(after.total_on(point.date), Some(point.total_sales));
    }
    assert_eq!(
        after.dates(),
        vec![
            date("2024-01-01"),
            date("2024-01-02"),
            date("2024-01-03"),
            date("2024-01-05")
        ]
    );
}

#[test]
fn test_dates_at_or_before_high_water_mark_are_ignored() {
    let mut warehouse = in_memory();
    merge(&series(&[("2024-01-10", 10.0)]), &mut warehouse).unwrap();

    // A late-arriving earlier date is not backfilled
    let outcome = merge(&series(&[("2024-01-05", 5.0)]), &mut warehouse).unwrap();

    assert_eq!(outcome, MergeOutcome::UpToDate);
    assert_eq!(warehouse.read_series().unwrap().len(), 1);
}

#[test]
fn test_empty_incoming_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("warehouse.db");
    let mut warehouse = Warehouse::open_path(&path, "daily_sales").unwrap();

    let outcome = merge(&DailySalesSeries::empty(), &mut warehouse).unwrap();

    assert_eq!(outcome, MergeOutcome::UpToDate);
    assert_eq!(warehouse.state().unwrap(), WarehouseState::Empty);
}

#[test]
fn test_warehouse_persists_across_connections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("warehouse.db");
    let incoming = series(&[("2024-01-01", 100.0), ("2024-01-02", 150.0)]);

    {
        let mut warehouse = Warehouse::open_path(&path, "daily_sales").unwrap();
        merge(&incoming, &mut warehouse).unwrap();
    }

    let mut reopened = Warehouse::open_path(&path, "daily_sales").unwrap();
    assert_eq!(reopened.read_series().unwrap(), incoming);
    assert_eq!(
        merge(&incoming, &mut reopened).unwrap(),
        MergeOutcome::UpToDate
    );
}
