//! The check battery.
//!
//! Each check is a free function taking a [`TableView`](crate::backend::TableView)
//! and returning a typed details struct. The struct carries its own
//! [`status`](crate::report::CheckStatus) policy so the runner never has to
//! interpret payloads.

mod columns;
mod density;
mod keys;

pub use columns::{
    check_completeness, values_range, CompletenessDetails, ValueRangeStat, ValuesRangeDetails,
};
pub use density::{
    key_density, lud_density, DatesAnalyzed, DensityEntry, DensityStatistic, KeyDensityDetails,
    LudDensityDetails, MovingAverage,
};
pub use keys::{find_duplicates, find_nulls, DuplicateDetails, NullDetails};

/// Render a statistic for the report. Whole numbers drop the fractional
/// part, so `20.0` becomes `"20"` and `2.5` stays `"2.5"`.
pub(crate) fn render_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_number_whole() {
        assert_eq!(render_number(20.0), "20");
        assert_eq!(render_number(0.0), "0");
    }

    #[test]
    fn test_render_number_fractional() {
        assert_eq!(render_number(2.5), "2.5");
        assert_eq!(render_number(0.25), "0.25");
    }
}
