//! Integration tests for the check battery.
//!
//! These tests run the full battery over a CSV fixture and assert on the
//! serialized report, the same surface the CLI prints.

use polars::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;
use tablecheck::{
    CheckConfig, CheckName, CheckRunner, CheckStatus, DataFrameBackend, DatasetRef, Partition,
    TableRef,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_orders() -> DataFrame {
    let path = fixtures_path().join("orders.csv");
    CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn orders_dataset() -> (DataFrameBackend, DatasetRef) {
    let table = TableRef::new("sales", "orders");
    let backend = DataFrameBackend::new().with_table(table.clone(), load_orders());
    (backend, DatasetRef::new(table))
}

fn orders_config() -> CheckConfig {
    CheckConfig::builder()
        .key_columns(["order_id", "line_no"])
        .lud_column("updated_on")
        .build()
        .expect("Config should validate")
}

fn report_json(config: CheckConfig, dataset: &DatasetRef, backend: &DataFrameBackend) -> Value {
    let report = CheckRunner::new(config)
        .run(backend, dataset)
        .expect("Battery should run");
    serde_json::to_value(&report).expect("Report should serialize")
}

// ============================================================================
// Full Battery Tests
// ============================================================================

#[test]
fn test_full_battery_runs_every_check_in_order() {
    let (backend, dataset) = orders_dataset();
    let report = CheckRunner::new(orders_config())
        .run(&backend, &dataset)
        .expect("Battery should run");

    assert_eq!(report.len(), 6);
    let names: Vec<CheckName> = report.iter().map(|(name, _)| name).collect();
    assert_eq!(names, CheckName::ALL);

    for (name, result) in report.iter() {
        let value = serde_json::to_value(result).unwrap();
        assert!(value["status"].is_string(), "{} has no status", name);
        assert!(value["timestamp"].is_string(), "{} has no timestamp", name);
        assert!(value["details"].is_object(), "{} has no details", name);
    }
}

#[test]
fn test_full_battery_statuses() {
    let (backend, dataset) = orders_dataset();
    let report = CheckRunner::new(orders_config())
        .run(&backend, &dataset)
        .expect("Battery should run");

    // order 1003 line 1 appears twice
    assert_eq!(
        report.get(CheckName::FindDuplicates).unwrap().status,
        CheckStatus::Failed
    );
    // key columns are fully populated
    assert_eq!(
        report.get(CheckName::FindNulls).unwrap().status,
        CheckStatus::Passed
    );
    assert_eq!(
        report.get(CheckName::CheckCompleteness).unwrap().status,
        CheckStatus::Passed
    );
    assert_eq!(
        report.get(CheckName::ValuesRange).unwrap().status,
        CheckStatus::Passed
    );
    assert_eq!(
        report.get(CheckName::KeyDensity).unwrap().status,
        CheckStatus::Passed
    );
    // 2024-03-07 has one row against a prior average of 1.4
    assert_eq!(
        report.get(CheckName::LudDensity).unwrap().status,
        CheckStatus::Failed
    );
    assert!(report.has_failures());
}

// ============================================================================
// Check Payload Tests
// ============================================================================

#[test]
fn test_duplicate_and_null_payloads() {
    let (backend, dataset) = orders_dataset();
    let value = report_json(orders_config(), &dataset, &backend);

    assert_eq!(
        value["find_duplicates"]["details"]["duplicated_rows_count"],
        json!(1)
    );
    // counts are JSON integers, not rendered strings
    assert!(value["find_duplicates"]["details"]["duplicated_rows_count"].is_u64());

    let nulls = &value["find_nulls"]["details"];
    assert_eq!(nulls["total_null_count"], json!(0));
    assert_eq!(nulls["nulls_by_column"]["order_id"], json!(0));
    assert_eq!(nulls["nulls_by_column"]["line_no"], json!(0));
}

#[test]
fn test_completeness_percentages() {
    let (backend, dataset) = orders_dataset();
    let value = report_json(orders_config(), &dataset, &backend);

    let percentages = &value["check_completeness"]["details"]["nulls_percentage_by_column"];
    assert_eq!(percentages["customer"], json!("20%"));
    assert_eq!(percentages["amount"], json!("0%"));
    assert_eq!(percentages["quantity"], json!("0%"));
    assert_eq!(percentages["updated_on"], json!("0%"));
    // key columns are not measured
    assert!(percentages.get("order_id").is_none());
    assert!(percentages.get("line_no").is_none());
}

#[test]
fn test_values_range_statistics() {
    let (backend, dataset) = orders_dataset();
    let value = report_json(orders_config(), &dataset, &backend);

    let ranges = &value["values_range"]["details"]["values_range_details"];
    assert_eq!(ranges["amount"]["min"], json!("8.25"));
    assert_eq!(ranges["amount"]["max"], json!("50"));
    assert_eq!(ranges["amount"]["avg"], json!("19.45"));
    assert_eq!(ranges["quantity"]["min"], json!("1"));
    assert_eq!(ranges["quantity"]["max"], json!("5"));
    assert_eq!(ranges["quantity"]["avg"], json!("2.2"));
    // keys and the update date column are not measures
    assert!(ranges.get("order_id").is_none());
    assert!(ranges.get("updated_on").is_none());
}

#[test]
fn test_key_density_statistics() {
    let (backend, dataset) = orders_dataset();
    let value = report_json(orders_config(), &dataset, &backend);

    let order_id = &value["key_density"]["details"]["key_density_details"]["order_id"];
    assert_eq!(order_id["max_count"], json!({ "value": "1001", "count": "2" }));
    assert_eq!(order_id["min_count"], json!({ "value": "1002", "count": "1" }));
    assert_eq!(order_id["avg_count"], json!("1.25"));
    assert_eq!(order_id["distinct_values"], json!("8"));
    assert_eq!(order_id["total_records"], json!("10"));

    let line_no = &value["key_density"]["details"]["key_density_details"]["line_no"];
    assert_eq!(line_no["max_count"]["count"], json!("9"));
    assert_eq!(line_no["distinct_values"], json!("2"));
}

#[test]
fn test_lud_density_moving_average() {
    let (backend, dataset) = orders_dataset();
    let value = report_json(orders_config(), &dataset, &backend);

    let details = &value["lud_density"]["details"];
    assert_eq!(details["distinct_values"], json!("7"));
    // the update cadence statistic carries no record total
    assert!(details.get("total_records").is_none());

    let average = &details["moving_average"];
    assert_eq!(average["current_count"], json!("1"));
    assert_eq!(average["last_luds_avg"], json!("1.4"));
    assert_eq!(average["below_acceptable_average"], json!(true));
    assert_eq!(
        average["dates_analyzed"]["current_date"],
        json!("2024-03-07")
    );
    assert_eq!(
        average["dates_analyzed"]["analyzed_dates"],
        json!([
            "2024-03-07",
            "2024-03-06",
            "2024-03-05",
            "2024-03-04",
            "2024-03-03",
            "2024-03-02",
        ])
    );
}

// ============================================================================
// Partition Tests
// ============================================================================

#[test]
fn test_partitioned_run_comes_back_green() {
    let (backend, dataset) = orders_dataset();
    let dataset = dataset.with_partition(Partition::new().equals("customer", "alice"));

    let report = CheckRunner::new(orders_config())
        .run(&backend, &dataset)
        .expect("Battery should run");
    assert!(!report.has_failures());

    let value = serde_json::to_value(&report).unwrap();
    // alice has two order lines on a single date
    assert_eq!(
        value["key_density"]["details"]["key_density_details"]["order_id"]["total_records"],
        json!("2")
    );
    assert_eq!(value["lud_density"]["details"]["moving_average"], json!(null));
}

// ============================================================================
// Error Isolation Tests
// ============================================================================

#[test]
fn test_unknown_lud_column_errors_without_stopping_the_battery() {
    let (backend, dataset) = orders_dataset();
    let config = CheckConfig::builder()
        .key_columns(["order_id", "line_no"])
        .lud_column("no_such_column")
        .build()
        .unwrap();

    let report = CheckRunner::new(config)
        .run(&backend, &dataset)
        .expect("Battery should run");
    assert_eq!(report.len(), 6);

    let lud = report.get(CheckName::LudDensity).unwrap();
    assert_eq!(lud.status, CheckStatus::Error);
    let value = serde_json::to_value(lud).unwrap();
    assert_eq!(
        value["details"]["error_message"],
        json!("Column 'no_such_column' not found in dataset")
    );

    // the other checks are untouched
    assert_eq!(
        report.get(CheckName::FindDuplicates).unwrap().status,
        CheckStatus::Failed
    );
    assert_eq!(
        report.get(CheckName::KeyDensity).unwrap().status,
        CheckStatus::Passed
    );
}

#[test]
fn test_run_without_lud_column_skips_cadence_check() {
    let (backend, dataset) = orders_dataset();
    let config = CheckConfig::new(["order_id", "line_no"]);

    let report = CheckRunner::new(config)
        .run(&backend, &dataset)
        .expect("Battery should run");
    assert_eq!(report.len(), 6);

    let lud = report.get(CheckName::LudDensity).unwrap();
    assert_eq!(lud.status, CheckStatus::Passed);
    let value = serde_json::to_value(lud).unwrap();
    assert_eq!(value["details"], json!({}));
}
