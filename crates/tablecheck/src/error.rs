//! Custom error types for the check battery.
//!
//! This module provides the error hierarchy using `thiserror`. Errors fall
//! into two classes the runner treats differently: configuration problems
//! surfaced before any check executes abort a run, while failures inside a
//! single check are converted into that check's `Error` envelope.

use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the check battery.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Table was not registered with the backend.
    #[error("Table '{0}' not registered with the backend")]
    TableNotFound(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Column has the wrong type for the requested operation.
    #[error("Column '{column}' has type {actual}, expected {expected}")]
    ColumnTypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CheckError>,
    },
}

impl CheckError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CheckError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CheckError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CheckError::ColumnNotFound("order_id".to_string());
        assert_eq!(err.to_string(), "Column 'order_id' not found in dataset");

        let err = CheckError::TableNotFound("sales.orders".to_string());
        assert!(err.to_string().contains("sales.orders"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = CheckError::ColumnTypeMismatch {
            column: "updated_on".to_string(),
            expected: "date".to_string(),
            actual: "text".to_string(),
        };
        assert!(err.to_string().contains("updated_on"));
        assert!(err.to_string().contains("expected date"));
    }

    #[test]
    fn test_with_context() {
        let err = CheckError::ColumnNotFound("k".to_string()).with_context("While grouping keys");
        assert!(err.to_string().contains("While grouping keys"));
        assert!(err.to_string().contains("'k'"));
    }

    #[test]
    fn test_result_ext_on_polars_result() {
        let result: std::result::Result<(), polars::error::PolarsError> = Err(
            polars::error::PolarsError::ComputeError("boom".to_string().into()),
        );
        let err = result.context("During aggregation").unwrap_err();
        assert!(err.to_string().starts_with("During aggregation"));
    }
}
