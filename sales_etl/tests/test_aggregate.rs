use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use sales_etl::{aggregate, RawOrder};
use std::collections::HashSet;

fn random_orders(seed: u64, count: usize) -> Vec<RawOrder> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2016, 11, 1).unwrap();

    (0..count)
        .map(|_| {
            let day = rng.gen_range(0..45);
            let cents: u32 = rng.gen_range(1..500_000);
            RawOrder::new(start + Duration::days(day), cents as f64 / 100.0)
        })
        .collect()
}

#[rstest]
#[case(1, 1)]
#[case(7, 10)]
#[case(42, 500)]
#[case(2024, 5000)]
fn test_aggregation_preserves_totals(#[case] seed: u64, #[case] count: usize) {
    let orders = random_orders(seed, count);

    let series = aggregate(&orders).unwrap();

    let raw_total: f64 = orders.iter().map(|o| o.sales).sum();
    assert_relative_eq!(series.grand_total(), raw_total, max_relative = 1e-9);

    let distinct: HashSet<NaiveDate> = orders.iter().map(|o| o.order_date).collect();
    assert_eq!(series.len(), distinct.len());
    for date in distinct {
        let expected: f64 = orders
            .iter()
            .filter(|o| o.order_date == date)
            .map(|o| o.sales)
            .sum();
        assert_relative_eq!(series.total_on(date).unwrap(), expected, max_relative = 1e-9);
    }
}

#[test]
fn test_aggregated_frame_has_two_columns() {
    let orders = random_orders(3, 50);

    let df = aggregate(&orders).unwrap().to_dataframe().unwrap();

    assert_eq!(df.width(), 2);
    assert_eq!(df.get_column_names(), vec!["ds", "y"]);
}

#[test]
fn test_output_is_date_ordered() {
    let orders = random_orders(11, 200);

    let dates = aggregate(&orders).unwrap().dates();

    assert!(dates.windows(2).all(|w| w[0] < w[1]));
}
