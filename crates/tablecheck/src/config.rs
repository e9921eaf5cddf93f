//! Configuration types for the check battery.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic setup of a check run.

use serde::{Deserialize, Serialize};

/// Number of prior distinct dates the `lud_density` moving average covers
/// when no explicit window is configured.
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 5;

/// Configuration for a check battery run.
///
/// Use [`CheckConfig::builder()`] to create a new configuration with a
/// fluent API, or [`CheckConfig::new()`] when only key columns are needed.
///
/// # Example
///
/// ```rust,ignore
/// use tablecheck::CheckConfig;
///
/// let config = CheckConfig::builder()
///     .key_columns(["order_id", "line_no"])
///     .lud_column("updated_on")
///     .moving_average_window(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Columns forming the logical row identity. Ordered, non-empty, and
    /// free of duplicates (the key is a set).
    pub key_columns: Vec<String>,

    /// Date column holding each row's last update date. When absent the
    /// `lud_density` check is skipped (its envelope still appears in the
    /// report with empty details).
    /// Default: None
    pub lud_column: Option<String>,

    /// Number of prior distinct dates averaged by `lud_density`.
    /// Default: 5
    pub moving_average_window: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            lud_column: None,
            moving_average_window: DEFAULT_MOVING_AVERAGE_WINDOW,
        }
    }
}

impl CheckConfig {
    /// Create a configuration with the given key columns and defaults for
    /// everything else.
    pub fn new(key_columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key_columns: key_columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Create a new configuration builder.
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.key_columns.is_empty() {
            return Err(ConfigValidationError::EmptyKeyColumns);
        }

        for (index, column) in self.key_columns.iter().enumerate() {
            if self.key_columns[..index].contains(column) {
                return Err(ConfigValidationError::DuplicateKeyColumn(column.clone()));
            }
        }

        if self.moving_average_window == 0 {
            return Err(ConfigValidationError::InvalidMovingAverageWindow(
                self.moving_average_window,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("key_columns must not be empty")]
    EmptyKeyColumns,

    #[error("Duplicate key column '{0}' (key columns form a set)")]
    DuplicateKeyColumn(String),

    #[error("Invalid moving average window: {0} (must be at least 1)")]
    InvalidMovingAverageWindow(usize),
}

/// Builder for [`CheckConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CheckConfigBuilder {
    key_columns: Vec<String>,
    lud_column: Option<String>,
    moving_average_window: Option<usize>,
}

impl CheckConfigBuilder {
    /// Append a single key column.
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_columns.push(column.into());
        self
    }

    /// Append several key columns at once.
    pub fn key_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.key_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set the last-update-date column.
    pub fn lud_column(mut self, column: impl Into<String>) -> Self {
        self.lud_column = Some(column.into());
        self
    }

    /// Set the number of prior distinct dates the moving average covers.
    pub fn moving_average_window(mut self, window: usize) -> Self {
        self.moving_average_window = Some(window);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CheckConfig` or an error if validation fails.
    pub fn build(self) -> Result<CheckConfig, ConfigValidationError> {
        let config = CheckConfig {
            key_columns: self.key_columns,
            lud_column: self.lud_column,
            moving_average_window: self
                .moving_average_window
                .unwrap_or(DEFAULT_MOVING_AVERAGE_WINDOW),
        };

        config.validate()?;
        Ok(config)
    }
}
