//! Key-integrity checks: duplicated key tuples and null key entries.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::backend::TableView;
use crate::error::Result;
use crate::report::CheckStatus;

/// Details payload of [`find_duplicates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateDetails {
    /// Number of surplus rows: every group of `n > 1` identical key tuples
    /// contributes `n - 1`.
    pub duplicated_rows_count: u64,
}

impl DuplicateDetails {
    pub fn status(&self) -> CheckStatus {
        if self.duplicated_rows_count > 0 {
            CheckStatus::Failed
        } else {
            CheckStatus::Passed
        }
    }
}

/// Count rows that share their full key tuple with an earlier row.
pub fn find_duplicates(
    view: &impl TableView,
    key_columns: &[String],
) -> Result<DuplicateDetails> {
    let columns: Vec<&str> = key_columns.iter().map(String::as_str).collect();
    let groups = view.group_count(&columns)?;
    let duplicated_rows_count = groups
        .iter()
        .filter(|group| group.count > 1)
        .map(|group| group.count - 1)
        .sum();
    debug!(
        "Found {} duplicated rows across {} key groups",
        duplicated_rows_count,
        groups.len()
    );
    Ok(DuplicateDetails {
        duplicated_rows_count,
    })
}

/// Details payload of [`find_nulls`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullDetails {
    /// Sum of null entries across all key columns.
    pub total_null_count: u64,
    /// Null entries per key column, in key-column order.
    pub nulls_by_column: IndexMap<String, u64>,
}

impl NullDetails {
    pub fn status(&self) -> CheckStatus {
        if self.total_null_count > 0 {
            CheckStatus::Failed
        } else {
            CheckStatus::Passed
        }
    }
}

/// Count null entries in every key column.
pub fn find_nulls(view: &impl TableView, key_columns: &[String]) -> Result<NullDetails> {
    let mut nulls_by_column = IndexMap::with_capacity(key_columns.len());
    for column in key_columns {
        let nulls = view.null_count(column)?;
        nulls_by_column.insert(column.clone(), nulls);
    }
    let total_null_count = nulls_by_column.values().sum();
    debug!("Found {} null key entries", total_null_count);
    Ok(NullDetails {
        total_null_count,
        nulls_by_column,
    })
}
