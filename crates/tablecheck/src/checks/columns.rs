//! Column-level profiling checks: completeness and numeric value ranges.
//!
//! Both checks are observational: they describe the dataset and always
//! pass. Their value is the trail they leave in the report.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::backend::{ColumnType, TableView};
use crate::checks::render_number;
use crate::error::Result;
use crate::report::CheckStatus;

/// Details payload of [`check_completeness`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletenessDetails {
    /// Null percentage per non-key column, rendered as `"N%"` with N
    /// rounded to the nearest whole percent.
    pub nulls_percentage_by_column: IndexMap<String, String>,
}

impl CompletenessDetails {
    pub fn status(&self) -> CheckStatus {
        CheckStatus::Passed
    }
}

/// Report the null percentage of every non-key column.
///
/// The row total is fetched once and reused as the denominator for every
/// column. An empty view reports `"0%"` everywhere.
pub fn check_completeness(
    view: &impl TableView,
    key_columns: &[String],
) -> Result<CompletenessDetails> {
    let total_rows = view.row_count()?;
    let mut nulls_percentage_by_column = IndexMap::new();
    for meta in view.columns() {
        if key_columns.contains(&meta.name) {
            continue;
        }
        let nulls = view.null_count(&meta.name)?;
        nulls_percentage_by_column.insert(meta.name.clone(), render_percentage(nulls, total_rows));
    }
    debug!(
        "Computed completeness for {} non-key columns over {} rows",
        nulls_percentage_by_column.len(),
        total_rows
    );
    Ok(CompletenessDetails {
        nulls_percentage_by_column,
    })
}

fn render_percentage(nulls: u64, total_rows: u64) -> String {
    if total_rows == 0 {
        return "0%".to_string();
    }
    let percentage = (nulls as f64 / total_rows as f64) * 100.0;
    format!("{}%", percentage.round() as u64)
}

/// Min/max/mean of one numeric column, rendered as strings.
///
/// Fields are `null` when the column holds no non-null values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueRangeStat {
    pub max: Option<String>,
    pub min: Option<String>,
    pub avg: Option<String>,
}

/// Details payload of [`values_range`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuesRangeDetails {
    /// Range statistics per numeric column; empty when the schema has no
    /// eligible numeric columns.
    pub values_range_details: IndexMap<String, ValueRangeStat>,
}

impl ValuesRangeDetails {
    pub fn status(&self) -> CheckStatus {
        CheckStatus::Passed
    }
}

/// Report min/max/mean for every numeric column outside the key set and
/// the last-update-date column. Eligibility comes from the schema type,
/// never from probing values.
pub fn values_range(
    view: &impl TableView,
    key_columns: &[String],
    lud_column: Option<&str>,
) -> Result<ValuesRangeDetails> {
    let mut values_range_details = IndexMap::new();
    for meta in view.columns() {
        if meta.column_type != ColumnType::Numeric {
            continue;
        }
        if key_columns.contains(&meta.name) {
            continue;
        }
        if lud_column.is_some_and(|lud| lud == meta.name) {
            continue;
        }
        let summary = view.numeric_summary(&meta.name)?;
        values_range_details.insert(
            meta.name.clone(),
            ValueRangeStat {
                max: summary.max.map(render_number),
                min: summary.min.map(render_number),
                avg: summary.avg.map(render_number),
            },
        );
    }
    debug!(
        "Computed value ranges for {} numeric columns",
        values_range_details.len()
    );
    Ok(ValuesRangeDetails {
        values_range_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DataFrameView;
    use polars::prelude::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // ==================== check_completeness tests ====================

    #[test]
    fn test_completeness_rounds_to_nearest_percent() {
        // 1 null out of 3 rows: 33.33% rounds to 33%
        let df = df![
            "k" => [1i64, 2, 3],
            "c" => [Some("a"), None, Some("c")],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = check_completeness(&view, &keys(&["k"])).unwrap();
        assert_eq!(
            details.nulls_percentage_by_column.get("c"),
            Some(&"33%".to_string())
        );
        assert_eq!(details.status(), CheckStatus::Passed);
    }

    #[test]
    fn test_completeness_excludes_key_columns() {
        let df = df![
            "k" => [1i64, 2],
            "c" => ["a", "b"],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = check_completeness(&view, &keys(&["k"])).unwrap();
        assert!(!details.nulls_percentage_by_column.contains_key("k"));
        assert!(details.nulls_percentage_by_column.contains_key("c"));
    }

    #[test]
    fn test_completeness_empty_frame_reports_zero_percent() {
        let df = df![
            "k" => Vec::<i64>::new(),
            "c" => Vec::<String>::new(),
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = check_completeness(&view, &keys(&["k"])).unwrap();
        assert_eq!(
            details.nulls_percentage_by_column.get("c"),
            Some(&"0%".to_string())
        );
    }

    #[test]
    fn test_completeness_fully_null_column() {
        let df = df![
            "k" => [1i64, 2],
            "c" => [Option::<&str>::None, None],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = check_completeness(&view, &keys(&["k"])).unwrap();
        assert_eq!(
            details.nulls_percentage_by_column.get("c"),
            Some(&"100%".to_string())
        );
    }

    #[test]
    fn test_render_percentage_rounds_half_up() {
        assert_eq!(render_percentage(1, 40), "3%"); // 2.5% -> 3%
        assert_eq!(render_percentage(2, 3), "67%"); // 66.67% -> 67%
        assert_eq!(render_percentage(0, 5), "0%");
        assert_eq!(render_percentage(0, 0), "0%");
    }

    // ==================== values_range tests ====================

    #[test]
    fn test_values_range_statistics() {
        let df = df![
            "k" => [1i64, 2],
            "v" => [0.0, 1000.0],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = values_range(&view, &keys(&["k"]), None).unwrap();
        let stat = details.values_range_details.get("v").unwrap();
        assert_eq!(stat.min.as_deref(), Some("0"));
        assert_eq!(stat.max.as_deref(), Some("1000"));
        assert_eq!(stat.avg.as_deref(), Some("500"));
        assert_eq!(details.status(), CheckStatus::Passed);
    }

    #[test]
    fn test_values_range_skips_keys_and_non_numeric() {
        let df = df![
            "k" => [1i64, 2],
            "name" => ["a", "b"],
            "v" => [1.5, 2.5],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = values_range(&view, &keys(&["k"]), None).unwrap();
        let columns: Vec<&String> = details.values_range_details.keys().collect();
        assert_eq!(columns, vec!["v"]);
    }

    #[test]
    fn test_values_range_excludes_lud_column() {
        let df = df![
            "k" => [1i64, 2],
            "epoch_day" => [19000i64, 19001],
            "v" => [1.0, 2.0],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = values_range(&view, &keys(&["k"]), Some("epoch_day")).unwrap();
        let columns: Vec<&String> = details.values_range_details.keys().collect();
        assert_eq!(columns, vec!["v"]);
    }

    #[test]
    fn test_values_range_no_numeric_columns_is_empty() {
        let df = df![
            "k" => ["x", "y"],
            "name" => ["a", "b"],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = values_range(&view, &keys(&["k"]), None).unwrap();
        assert!(details.values_range_details.is_empty());
        assert_eq!(details.status(), CheckStatus::Passed);
    }

    #[test]
    fn test_values_range_all_null_column_renders_nulls() {
        let df = df![
            "k" => [1i64, 2],
            "v" => [Option::<f64>::None, None],
        ]
        .unwrap();
        let view = DataFrameView::new(df);

        let details = values_range(&view, &keys(&["k"]), None).unwrap();
        let stat = details.values_range_details.get("v").unwrap();
        assert_eq!(stat.max, None);
        assert_eq!(stat.min, None);
        assert_eq!(stat.avg, None);
    }
}
