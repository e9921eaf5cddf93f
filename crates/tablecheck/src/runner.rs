//! Orchestration of the check battery over one dataset.

use tracing::{debug, info, warn};

use crate::backend::{AggregationBackend, DatasetRef, TableView};
use crate::checks::{
    check_completeness, find_duplicates, find_nulls, key_density, lud_density, values_range,
};
use crate::config::CheckConfig;
use crate::error::{CheckError, Result};
use crate::report::{CheckName, CheckResult, Report};

/// Runs every check of the battery against a dataset and assembles the
/// ordered [`Report`].
///
/// # Example
///
/// ```rust,ignore
/// use tablecheck::{CheckConfig, CheckRunner, DataFrameBackend, DatasetRef, TableRef};
///
/// let backend = DataFrameBackend::new().with_table(TableRef::new("sales", "orders"), df);
/// let runner = CheckRunner::new(CheckConfig::new(["order_id"]));
/// let report = runner.run(&backend, &DatasetRef::new(TableRef::new("sales", "orders")))?;
/// println!("{}", report.to_pretty_json()?);
/// ```
#[derive(Debug, Clone)]
pub struct CheckRunner {
    config: CheckConfig,
}

impl CheckRunner {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run the full battery and collect one envelope per check, in
    /// execution order.
    ///
    /// Configuration and dataset resolution problems abort the run before
    /// any check executes. Once checks start, a check that errors is
    /// recorded with an `Error` envelope and the battery moves on.
    pub fn run<B: AggregationBackend>(&self, backend: &B, dataset: &DatasetRef) -> Result<Report> {
        self.config.validate()?;

        info!("Opening dataset {}", dataset.table);
        let view = backend.open(dataset)?;
        self.ensure_key_columns(&view)?;

        let mut report = Report::new();
        for name in CheckName::ALL {
            info!("Executing {}...", name);
            let result = match self.execute(name, &view) {
                Ok(result) => result,
                Err(error) => {
                    warn!("Check {} errored: {}", name, error);
                    CheckResult::from_error(error.to_string())
                }
            };
            report.insert(name, result);
        }
        Ok(report)
    }

    /// Every check reads the key columns, so a bad name aborts the run up
    /// front instead of erroring check by check.
    fn ensure_key_columns(&self, view: &impl TableView) -> Result<()> {
        for column in &self.config.key_columns {
            if view.column_meta(column).is_none() {
                return Err(CheckError::ColumnNotFound(column.clone()));
            }
        }
        Ok(())
    }

    fn execute(&self, name: CheckName, view: &impl TableView) -> Result<CheckResult> {
        let key_columns = &self.config.key_columns;
        let result = match name {
            CheckName::FindDuplicates => {
                let details = find_duplicates(view, key_columns)?;
                CheckResult::new(details.status(), details)
            }
            CheckName::FindNulls => {
                let details = find_nulls(view, key_columns)?;
                CheckResult::new(details.status(), details)
            }
            CheckName::CheckCompleteness => {
                let details = check_completeness(view, key_columns)?;
                CheckResult::new(details.status(), details)
            }
            CheckName::ValuesRange => {
                let details = values_range(view, key_columns, self.config.lud_column.as_deref())?;
                CheckResult::new(details.status(), details)
            }
            CheckName::KeyDensity => {
                let details = key_density(view, key_columns)?;
                CheckResult::new(details.status(), details)
            }
            CheckName::LudDensity => match self.config.lud_column.as_deref() {
                Some(lud_column) => {
                    let details =
                        lud_density(view, lud_column, self.config.moving_average_window)?;
                    CheckResult::new(details.status(), details)
                }
                None => {
                    debug!("No last-update-date column configured, skipping lud_density");
                    CheckResult::skipped()
                }
            },
        };
        Ok(result)
    }
}
