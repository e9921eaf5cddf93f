//! In-memory polars backend.
//!
//! [`DataFrameBackend`] is a small catalog mapping table identities to
//! DataFrames. Resolving a dataset handle clones the registered frame,
//! applies the partition predicate once, and hands back a
//! [`DataFrameView`] that answers every aggregate query from the filtered
//! snapshot.

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use std::collections::HashMap;

use super::{
    AggregationBackend, ColumnMeta, ColumnType, DatasetRef, GroupCount, NumericSummary, Partition,
    TableRef, TableView, Value,
};
use crate::error::{CheckError, Result, ResultExt};

/// Internal name for the count column of grouped queries.
const GROUP_ROWS: &str = "__group_rows";

/// Map a polars dtype onto the coarse classes the checks care about.
fn column_type_of(dtype: &DataType) -> ColumnType {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ColumnType::Numeric,
        DataType::String | DataType::Categorical(_, _) => ColumnType::Text,
        DataType::Date | DataType::Datetime(_, _) | DataType::Time => ColumnType::Date,
        DataType::Boolean => ColumnType::Boolean,
        _ => ColumnType::Other,
    }
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(i64::from(days)))
}

/// Materialize a series into [`Value`]s, dispatching on the dtype once.
///
/// Datetime columns are truncated to their date component; dtypes outside
/// the coarse classes fall back to their display rendering.
fn series_values(series: &Series) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(series.len());
    match series.dtype() {
        DataType::Boolean => {
            for v in series.bool()? {
                out.push(v.map(Value::Bool).unwrap_or(Value::Null));
            }
        }
        DataType::String => {
            for v in series.str()? {
                out.push(v.map(|s| Value::Text(s.to_string())).unwrap_or(Value::Null));
            }
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let cast = series.cast(&DataType::Int64)?;
            for v in cast.i64()? {
                out.push(v.map(Value::Int).unwrap_or(Value::Null));
            }
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = series.cast(&DataType::Float64)?;
            for v in cast.f64()? {
                out.push(v.map(Value::Float).unwrap_or(Value::Null));
            }
        }
        DataType::Date => {
            let cast = series.cast(&DataType::Int32)?;
            for v in cast.i32()? {
                let value = v
                    .and_then(date_from_epoch_days)
                    .map(Value::Date)
                    .unwrap_or(Value::Null);
                out.push(value);
            }
        }
        DataType::Datetime(_, _) => {
            let dates = series.cast(&DataType::Date)?;
            return series_values(&dates);
        }
        _ => {
            for i in 0..series.len() {
                let av = series.get(i)?;
                if matches!(av, AnyValue::Null) {
                    out.push(Value::Null);
                } else {
                    out.push(Value::Text(format!("{av}")));
                }
            }
        }
    }
    Ok(out)
}

fn apply_partition(df: &DataFrame, partition: &Partition) -> Result<DataFrame> {
    let mut filtered = df.clone();
    for (column, accepted) in partition.iter() {
        let series = match filtered.column(column) {
            Ok(col) => col.as_materialized_series().clone(),
            Err(_) => return Err(CheckError::ColumnNotFound(column.to_string())),
        };
        let cells = series_values(&series)?;
        let mask: Vec<bool> = cells
            .iter()
            .map(|cell| accepted.iter().any(|want| cell.matches(want)))
            .collect();
        let mask = Series::new("mask".into(), mask);
        filtered = filtered
            .filter(mask.bool()?)
            .context(format!("While applying partition on '{column}'"))?;
    }
    Ok(filtered)
}

/// Catalog of named in-memory tables.
///
/// # Example
///
/// ```rust,ignore
/// use tablecheck::{DataFrameBackend, TableRef};
///
/// let backend = DataFrameBackend::new()
///     .with_table(TableRef::new("sales", "orders"), orders_df);
/// ```
#[derive(Debug, Default, Clone)]
pub struct DataFrameBackend {
    tables: HashMap<TableRef, DataFrame>,
}

impl DataFrameBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DataFrame under a table identity, replacing any previous
    /// registration.
    pub fn register(&mut self, table: TableRef, df: DataFrame) {
        self.tables.insert(table, df);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_table(mut self, table: TableRef, df: DataFrame) -> Self {
        self.register(table, df);
        self
    }
}

impl AggregationBackend for DataFrameBackend {
    type View = DataFrameView;

    fn open(&self, dataset: &DatasetRef) -> Result<DataFrameView> {
        let df = self
            .tables
            .get(&dataset.table)
            .ok_or_else(|| CheckError::TableNotFound(dataset.table.to_string()))?;
        let df = match &dataset.partition {
            Some(partition) if !partition.is_empty() => apply_partition(df, partition)?,
            _ => df.clone(),
        };
        Ok(DataFrameView::new(df))
    }
}

/// A resolved dataset snapshot answering aggregate queries.
#[derive(Debug, Clone)]
pub struct DataFrameView {
    df: DataFrame,
    columns: Vec<ColumnMeta>,
}

impl DataFrameView {
    /// Wrap an already-filtered DataFrame.
    pub fn new(df: DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnMeta::new(col.name().to_string(), column_type_of(col.dtype())))
            .collect();
        Self { df, columns }
    }

    fn series(&self, column: &str) -> Result<&Series> {
        match self.df.column(column) {
            Ok(col) => Ok(col.as_materialized_series()),
            Err(_) => Err(CheckError::ColumnNotFound(column.to_string())),
        }
    }
}

impl TableView for DataFrameView {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn row_count(&self) -> Result<u64> {
        Ok(self.df.height() as u64)
    }

    fn null_count(&self, column: &str) -> Result<u64> {
        Ok(self.series(column)?.null_count() as u64)
    }

    fn group_count(&self, columns: &[&str]) -> Result<Vec<GroupCount>> {
        // resolve columns up front so a bad name surfaces as ColumnNotFound
        // instead of a polars schema error from the lazy plan
        let mut exprs: Vec<Expr> = Vec::with_capacity(columns.len());
        for column in columns {
            // datetimes group by their date component, so same-day
            // timestamps land in one group
            let expr = match self.series(column)?.dtype() {
                DataType::Datetime(_, _) => col(*column).cast(DataType::Date),
                _ => col(*column),
            };
            exprs.push(expr);
        }
        // stable grouping keeps enumeration in first-appearance order, which
        // makes repeated runs over the same frame reproducible
        let grouped = self
            .df
            .clone()
            .lazy()
            .group_by_stable(exprs)
            .agg([len().alias(GROUP_ROWS)])
            .collect()
            .context("While collecting grouped counts")?;

        let counts = grouped
            .column(GROUP_ROWS)?
            .as_materialized_series()
            .cast(&DataType::UInt64)?;
        let counts = counts.u64()?;

        let mut columns_values: Vec<Vec<Value>> = Vec::with_capacity(columns.len());
        for column in columns {
            let series = grouped.column(column)?.as_materialized_series();
            columns_values.push(series_values(series)?);
        }

        let mut out = Vec::with_capacity(grouped.height());
        for i in 0..grouped.height() {
            let values = columns_values.iter().map(|vs| vs[i].clone()).collect();
            let count = counts.get(i).unwrap_or(0);
            out.push(GroupCount { values, count });
        }
        Ok(out)
    }

    fn numeric_summary(&self, column: &str) -> Result<NumericSummary> {
        let cast = self
            .series(column)?
            .cast(&DataType::Float64)
            .context(format!("While summarizing '{column}' as numeric"))?;
        let values = cast.f64()?;
        Ok(NumericSummary {
            min: values.min(),
            max: values.max(),
            avg: values.mean(),
        })
    }

    fn distinct_count(&self, column: &str) -> Result<u64> {
        Ok(self.series(column)?.n_unique()? as u64)
    }
}
