//! Job identity and run accounting types.

use serde::{Deserialize, Serialize};

use crate::error::FailureMarker;

/// Opaque job identifier, taken from the job file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    /// Create a new job name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for JobName {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

/// Per-row tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub rows: u64,
    pub enriched: u64,
    pub missing_required: u64,
    pub no_match: u64,
    pub api_error: u64,
    pub error: u64,
}

impl RowCounts {
    /// Tally one row by its marker; `None` counts as enriched.
    pub fn record(&mut self, marker: Option<FailureMarker>) {
        self.rows += 1;
        match marker {
            None => self.enriched += 1,
            Some(FailureMarker::MissingRequiredFields) => self.missing_required += 1,
            Some(FailureMarker::NoMatchFound) => self.no_match += 1,
            Some(FailureMarker::ApiError) => self.api_error += 1,
            Some(FailureMarker::Error) => self.error += 1,
        }
    }

    #[must_use]
    pub fn failed(&self) -> u64 {
        self.rows - self.enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_name_display() {
        assert_eq!(JobName::new("supplier_items").to_string(), "supplier_items");
    }

    #[test]
    fn counts_by_marker() {
        let mut counts = RowCounts::default();
        counts.record(None);
        counts.record(Some(FailureMarker::ApiError));
        counts.record(Some(FailureMarker::MissingRequiredFields));
        assert_eq!(counts.rows, 3);
        assert_eq!(counts.enriched, 1);
        assert_eq!(counts.api_error, 1);
        assert_eq!(counts.missing_required, 1);
        assert_eq!(counts.failed(), 2);
    }
}
