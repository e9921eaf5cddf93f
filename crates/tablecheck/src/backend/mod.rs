//! Dataset access layer for the check battery.
//!
//! Checks never touch raw rows. They speak to an [`AggregationBackend`]
//! that resolves a [`DatasetRef`] into a [`TableView`] answering a small
//! set of aggregate queries. The partition predicate of the dataset handle
//! is applied exactly once during resolution, so every query a check
//! issues already sees the restricted view.

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;

mod dataframe;

pub use dataframe::{DataFrameBackend, DataFrameView};

// =============================================================================
// Schema types
// =============================================================================

/// Coarse column type classes the checks care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Integer or floating point numbers
    Numeric,
    /// String/text type
    Text,
    /// Date or datetime types
    Date,
    /// Boolean type
    Boolean,
    /// Other/unknown types
    Other,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column's name and coarse type as reported by the backend schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

// =============================================================================
// Scalar values
// =============================================================================

/// A scalar cell value as surfaced by backend aggregations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The date behind this value, when it is one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Report rendering: `None` for null, the display form otherwise.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Whether a cell holding `self` satisfies the predicate value `wanted`.
    ///
    /// Comparison is typed, with two coercions: integers and floats compare
    /// numerically, and a text predicate is parsed into the cell's type
    /// before comparing (the SQL-flavored behavior partition filters need
    /// when values arrive as command-line strings).
    pub fn matches(&self, wanted: &Value) -> bool {
        match (self, wanted) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Int(a), Value::Text(t)) => t.parse::<i64>().is_ok_and(|v| v == *a),
            (Value::Float(a), Value::Text(t)) => t.parse::<f64>().is_ok_and(|v| v == *a),
            (Value::Bool(a), Value::Text(t)) => t.parse::<bool>().is_ok_and(|v| v == *a),
            (Value::Date(a), Value::Text(t)) => {
                NaiveDate::parse_from_str(t, "%Y-%m-%d").is_ok_and(|v| v == *a)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

// =============================================================================
// Query results
// =============================================================================

/// One `(value-tuple, count)` pair from a grouped count query.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    /// Group values, aligned with the requested columns.
    pub values: Vec<Value>,
    /// Number of rows carrying this value tuple.
    pub count: u64,
}

/// Min/max/mean of a numeric column's non-null values.
///
/// All fields are `None` when the column holds no non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

// =============================================================================
// Dataset identity
// =============================================================================

/// Identifies a table by schema and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Column → accepted-values restriction applied when a dataset view is
/// resolved. Entries for several columns combine with AND; several values
/// for one column combine with IN.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Partition {
    entries: IndexMap<String, Vec<Value>>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `column` to a single value.
    pub fn equals(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(column.into(), vec![value.into()]);
        self
    }

    /// Restrict `column` to any of the given values.
    pub fn one_of(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.entries
            .insert(column.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(column, accepted values)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries
            .iter()
            .map(|(column, values)| (column.as_str(), values.as_slice()))
    }
}

/// A dataset handle: table identity plus an optional partition predicate.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetRef {
    pub table: TableRef,
    pub partition: Option<Partition>,
}

impl DatasetRef {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            partition: None,
        }
    }

    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = Some(partition);
        self
    }
}

// =============================================================================
// Capability traits
// =============================================================================

/// Resolves dataset handles into queryable views.
pub trait AggregationBackend {
    /// The view type produced by [`open`](Self::open).
    type View: TableView;

    /// Resolve a dataset handle into a view, applying the partition
    /// predicate exactly once. Fails when the table is unknown or the
    /// partition references columns the table does not have.
    fn open(&self, dataset: &DatasetRef) -> Result<Self::View>;
}

/// Aggregate queries over a resolved dataset view.
pub trait TableView {
    /// Schema of the view: column names with coarse types, in table order.
    fn columns(&self) -> &[ColumnMeta];

    /// Total number of rows in the view.
    fn row_count(&self) -> Result<u64>;

    /// Number of rows where `column` is null.
    fn null_count(&self, column: &str) -> Result<u64>;

    /// Distinct value tuples of `columns` with their row counts. Null
    /// participates as a group value, and timestamp-typed columns group
    /// by their date component. Enumeration order is backend defined;
    /// callers must not rely on it across backends.
    fn group_count(&self, columns: &[&str]) -> Result<Vec<GroupCount>>;

    /// Min/max/mean over the non-null values of a numeric column.
    fn numeric_summary(&self, column: &str) -> Result<NumericSummary>;

    /// Number of distinct values in `column`.
    fn distinct_count(&self, column: &str) -> Result<u64>;

    /// Look up a column's schema entry by name.
    fn column_meta(&self, column: &str) -> Option<&ColumnMeta> {
        self.columns().iter().find(|meta| meta.name == column)
    }
}
