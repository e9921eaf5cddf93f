//! Tabular Data Quality Check Battery
//!
//! A statistical data-quality check battery over tabular datasets, built with Rust and Polars.
//!
//! # Overview
//!
//! One run executes six checks against a single dataset and collects their
//! results into an ordered JSON report:
//!
//! - **Duplicate Detection**: surplus rows sharing the configured key tuple
//! - **Null Auditing**: null counts over the key columns
//! - **Completeness**: null percentage per non-key column
//! - **Value Ranges**: min/max/mean of the numeric measure columns
//! - **Key Density**: value frequency statistics per key column
//! - **Update Cadence**: last-update-date density with a moving-average comparison
//!
//! Every check reports through the same envelope (`status`, `timestamp`,
//! `details`), and a check that errors never stops the battery.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use polars::prelude::*;
//! use tablecheck::{CheckConfig, CheckRunner, DataFrameBackend, DatasetRef, TableRef};
//!
//! // Register the dataset with the in-memory backend
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("orders.csv".into()))?
//!     .finish()?;
//! let table = TableRef::new("sales", "orders");
//! let backend = DataFrameBackend::new().with_table(table.clone(), df);
//!
//! // Configure and run the battery
//! let config = CheckConfig::builder()
//!     .key_columns(["order_id", "line_no"])
//!     .lud_column("updated_on")
//!     .build()?;
//! let report = CheckRunner::new(config).run(&backend, &DatasetRef::new(table))?;
//!
//! println!("{}", report.to_pretty_json()?);
//! ```
//!
//! # Partitioned Runs
//!
//! A [`DatasetRef`] can carry a partition predicate. The backend applies it
//! once while resolving the view, so every check sees the restricted rows:
//!
//! ```rust,ignore
//! use tablecheck::{DatasetRef, Partition, TableRef};
//!
//! let dataset = DatasetRef::new(TableRef::new("sales", "orders"))
//!     .with_partition(Partition::new().equals("region", "EU").one_of("year", [2023i64, 2024]));
//! ```
//!
//! # Backends
//!
//! Checks are written against the [`AggregationBackend`] and [`TableView`]
//! traits and only issue aggregate queries (row counts, null counts, grouped
//! counts, numeric summaries). [`DataFrameBackend`] is the bundled Polars
//! implementation; anything that can answer the same queries, a SQL engine
//! included, can host the battery by implementing the two traits.

pub mod backend;
pub mod checks;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;

// Re-exports for convenient access
pub use backend::{
    AggregationBackend, ColumnMeta, ColumnType, DataFrameBackend, DataFrameView, DatasetRef,
    GroupCount, NumericSummary, Partition, TableRef, TableView, Value,
};
pub use checks::{
    CompletenessDetails, DatesAnalyzed, DensityEntry, DensityStatistic, DuplicateDetails,
    KeyDensityDetails, LudDensityDetails, MovingAverage, NullDetails, ValueRangeStat,
    ValuesRangeDetails, check_completeness, find_duplicates, find_nulls, key_density, lud_density,
    values_range,
};
pub use config::{
    CheckConfig, CheckConfigBuilder, ConfigValidationError, DEFAULT_MOVING_AVERAGE_WINDOW,
};
pub use error::{CheckError, Result as TableCheckResult, ResultExt};
pub use report::{
    CheckDetails, CheckName, CheckResult, CheckStatus, EmptyDetails, ErrorDetails, Report,
};
pub use runner::CheckRunner;
