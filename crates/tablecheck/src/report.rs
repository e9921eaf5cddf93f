//! Report envelope shared by every check.
//!
//! A [`Report`] maps check names to [`CheckResult`] envelopes in execution
//! order, so serializing a report reproduces the order the battery ran in.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::checks::{
    CompletenessDetails, DuplicateDetails, KeyDensityDetails, LudDensityDetails, NullDetails,
    ValuesRangeDetails,
};
use crate::error::Result;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// The check ran and the data met its policy.
    Passed,
    /// The check ran and the data violated its policy.
    Failed,
    /// The check could not run to completion.
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "Passed",
            CheckStatus::Failed => "Failed",
            CheckStatus::Error => "Error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a check in the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    FindDuplicates,
    FindNulls,
    CheckCompleteness,
    ValuesRange,
    KeyDensity,
    LudDensity,
}

impl CheckName {
    /// Every check in the order the battery runs them.
    pub const ALL: [CheckName; 6] = [
        CheckName::FindDuplicates,
        CheckName::FindNulls,
        CheckName::CheckCompleteness,
        CheckName::ValuesRange,
        CheckName::KeyDensity,
        CheckName::LudDensity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::FindDuplicates => "find_duplicates",
            CheckName::FindNulls => "find_nulls",
            CheckName::CheckCompleteness => "check_completeness",
            CheckName::ValuesRange => "values_range",
            CheckName::KeyDensity => "key_density",
            CheckName::LudDensity => "lud_density",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details payload of a check that did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    pub error_message: String,
}

/// Details payload of a check that was skipped; serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyDetails {}

/// The details payload of any check, serialized as the payload itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckDetails {
    Duplicates(DuplicateDetails),
    Nulls(NullDetails),
    Completeness(CompletenessDetails),
    ValuesRange(ValuesRangeDetails),
    KeyDensity(KeyDensityDetails),
    LudDensity(LudDensityDetails),
    Error(ErrorDetails),
    Empty(EmptyDetails),
}

impl From<DuplicateDetails> for CheckDetails {
    fn from(details: DuplicateDetails) -> Self {
        CheckDetails::Duplicates(details)
    }
}

impl From<NullDetails> for CheckDetails {
    fn from(details: NullDetails) -> Self {
        CheckDetails::Nulls(details)
    }
}

impl From<CompletenessDetails> for CheckDetails {
    fn from(details: CompletenessDetails) -> Self {
        CheckDetails::Completeness(details)
    }
}

impl From<ValuesRangeDetails> for CheckDetails {
    fn from(details: ValuesRangeDetails) -> Self {
        CheckDetails::ValuesRange(details)
    }
}

impl From<KeyDensityDetails> for CheckDetails {
    fn from(details: KeyDensityDetails) -> Self {
        CheckDetails::KeyDensity(details)
    }
}

impl From<LudDensityDetails> for CheckDetails {
    fn from(details: LudDensityDetails) -> Self {
        CheckDetails::LudDensity(details)
    }
}

impl From<ErrorDetails> for CheckDetails {
    fn from(details: ErrorDetails) -> Self {
        CheckDetails::Error(details)
    }
}

impl From<EmptyDetails> for CheckDetails {
    fn from(details: EmptyDetails) -> Self {
        CheckDetails::Empty(details)
    }
}

/// One check's envelope: the status, when it finished, and its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    /// RFC 3339 completion timestamp in UTC.
    pub timestamp: String,
    pub details: CheckDetails,
}

impl CheckResult {
    /// Stamp a finished check with the current time.
    pub fn new(status: CheckStatus, details: impl Into<CheckDetails>) -> Self {
        CheckResult {
            status,
            timestamp: Utc::now().to_rfc3339(),
            details: details.into(),
        }
    }

    /// Envelope for a check that blew up; the battery keeps going.
    pub fn from_error(message: impl Into<String>) -> Self {
        CheckResult::new(
            CheckStatus::Error,
            ErrorDetails {
                error_message: message.into(),
            },
        )
    }

    /// Envelope for a check the configuration opted out of.
    pub fn skipped() -> Self {
        CheckResult::new(CheckStatus::Passed, EmptyDetails {})
    }
}

/// All check results of one battery run, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    checks: IndexMap<CheckName, CheckResult>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    pub(crate) fn insert(&mut self, name: CheckName, result: CheckResult) {
        self.checks.insert(name, result);
    }

    pub fn get(&self, name: CheckName) -> Option<&CheckResult> {
        self.checks.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckName, &CheckResult)> {
        self.checks.iter().map(|(name, result)| (*name, result))
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Whether any check came back `Failed` or `Error`.
    pub fn has_failures(&self) -> bool {
        self.checks
            .values()
            .any(|result| result.status != CheckStatus::Passed)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_pretty_json()?)?;
        Ok(())
    }
}
