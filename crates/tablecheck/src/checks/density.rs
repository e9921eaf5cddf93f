//! Density checks: key-column value frequencies and last-update-date
//! cadence with a moving-average comparison.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::backend::{ColumnType, GroupCount, TableView, Value};
use crate::checks::render_number;
use crate::error::{CheckError, Result};
use crate::report::CheckStatus;

/// `{value, count}` of a single grouped value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensityEntry {
    /// The grouped value rendered for the report; `null` for the null group.
    pub value: Option<String>,
    pub count: String,
}

/// Frequency statistics over one column's grouped values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensityStatistic {
    /// Most frequent value; ties keep the first-encountered group.
    pub max_count: Option<DensityEntry>,
    /// Least frequent value; ties keep the first-encountered group.
    pub min_count: Option<DensityEntry>,
    /// Mean rows per distinct value.
    pub avg_count: String,
    /// Number of groups (the null group included).
    pub distinct_values: String,
    /// Sum of group counts; equals the view's row count. Omitted for the
    /// last-update-date statistic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<String>,
}

fn density_entry(group: &GroupCount) -> DensityEntry {
    DensityEntry {
        value: group.values.first().and_then(|value| value.render()),
        count: group.count.to_string(),
    }
}

fn density_statistic(groups: &[GroupCount], with_total: bool) -> DensityStatistic {
    let mut max: Option<&GroupCount> = None;
    let mut min: Option<&GroupCount> = None;
    for group in groups {
        // strict comparisons keep the first-encountered group on ties
        if max.map_or(true, |m| group.count > m.count) {
            max = Some(group);
        }
        if min.map_or(true, |m| group.count < m.count) {
            min = Some(group);
        }
    }

    let total: u64 = groups.iter().map(|group| group.count).sum();
    let distinct = groups.len() as u64;
    let avg_count = if distinct == 0 {
        0.0
    } else {
        total as f64 / distinct as f64
    };

    DensityStatistic {
        max_count: max.map(density_entry),
        min_count: min.map(density_entry),
        avg_count: render_number(avg_count),
        distinct_values: distinct.to_string(),
        total_records: with_total.then(|| total.to_string()),
    }
}

/// Details payload of [`key_density`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDensityDetails {
    /// Density statistic per key column, in key-column order.
    pub key_density_details: IndexMap<String, DensityStatistic>,
}

impl KeyDensityDetails {
    pub fn status(&self) -> CheckStatus {
        CheckStatus::Passed
    }
}

/// Report how evenly rows spread over each key column's values.
pub fn key_density(view: &impl TableView, key_columns: &[String]) -> Result<KeyDensityDetails> {
    let mut key_density_details = IndexMap::with_capacity(key_columns.len());
    for column in key_columns {
        let groups = view.group_count(&[column.as_str()])?;
        debug!("Column '{}' groups into {} distinct values", column, groups.len());
        key_density_details.insert(column.clone(), density_statistic(&groups, true));
    }
    Ok(KeyDensityDetails {
        key_density_details,
    })
}

/// Moving-average comparison of the most recent update date against the
/// dates before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverage {
    /// Mean row count over the prior dates in the window.
    pub last_luds_avg: String,
    /// Row count of the most recent date.
    pub current_count: String,
    /// `current_count / last_luds_avg`; 0 when the average itself is 0.
    pub ratio_to_average: String,
    /// Whether the most recent date fell below the prior average.
    pub below_acceptable_average: bool,
    pub dates_analyzed: DatesAnalyzed,
}

/// The dates that fed a moving-average comparison, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatesAnalyzed {
    pub current_date: String,
    /// The current date followed by the prior dates used.
    pub analyzed_dates: Vec<String>,
}

/// Details payload of [`lud_density`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LudDensityDetails {
    #[serde(flatten)]
    pub density: DensityStatistic,
    /// `null` when no prior dates exist to average over.
    pub moving_average: Option<MovingAverage>,
}

impl LudDensityDetails {
    pub fn status(&self) -> CheckStatus {
        match &self.moving_average {
            Some(average) if average.below_acceptable_average => CheckStatus::Failed,
            _ => CheckStatus::Passed,
        }
    }
}

/// Compare the freshest update date's row count against the moving average
/// of the `window` distinct dates before it.
pub fn lud_density(
    view: &impl TableView,
    lud_column: &str,
    window: usize,
) -> Result<LudDensityDetails> {
    let meta = view
        .column_meta(lud_column)
        .ok_or_else(|| CheckError::ColumnNotFound(lud_column.to_string()))?;
    if meta.column_type != ColumnType::Date {
        return Err(CheckError::ColumnTypeMismatch {
            column: lud_column.to_string(),
            expected: ColumnType::Date.to_string(),
            actual: meta.column_type.to_string(),
        });
    }

    let groups = view.group_count(&[lud_column])?;
    let density = density_statistic(&groups, false);

    // index dated groups by date, most recent first; the null group
    // stays out of the date math
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for group in &groups {
        if let Some(date) = group.values.first().and_then(Value::as_date) {
            *by_date.entry(date).or_insert(0) += group.count;
        }
    }
    let ordered: Vec<(NaiveDate, u64)> = by_date.into_iter().rev().collect();
    debug!("Column '{}' spans {} distinct dates", lud_column, ordered.len());

    let moving_average = compute_moving_average(&ordered, window);
    Ok(LudDensityDetails {
        density,
        moving_average,
    })
}

/// `ordered` holds `(date, count)` pairs sorted most recent first.
fn compute_moving_average(ordered: &[(NaiveDate, u64)], window: usize) -> Option<MovingAverage> {
    let (current_date, current_count) = *ordered.first()?;
    let rest = &ordered[1..];
    let prior = &rest[..window.min(rest.len())];
    if prior.is_empty() {
        return None;
    }

    let last_luds_avg =
        prior.iter().map(|(_, count)| *count as f64).sum::<f64>() / prior.len() as f64;
    let (ratio_to_average, below_acceptable_average) = if last_luds_avg == 0.0 {
        (0.0, false)
    } else {
        let ratio = current_count as f64 / last_luds_avg;
        (ratio, ratio < 1.0)
    };

    let analyzed_dates = std::iter::once(current_date)
        .chain(prior.iter().map(|(date, _)| *date))
        .map(|date| date.to_string())
        .collect();

    Some(MovingAverage {
        last_luds_avg: render_number(last_luds_avg),
        current_count: current_count.to_string(),
        ratio_to_average: render_number(ratio_to_average),
        below_acceptable_average,
        dates_analyzed: DatesAnalyzed {
            current_date: current_date.to_string(),
            analyzed_dates,
        },
    })
}
