//! Per-row failure records.
//!
//! [`RowFailure`] captures one row that ended with a failure marker, for
//! operators who want the diagnostic detail outside the output table.

use crate::error::FailureMarker;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-8601 formatted timestamp string.
///
/// Thin wrapper; callers are trusted to provide valid ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Create a new timestamp from an ISO-8601 string.
    #[must_use]
    pub fn new(iso8601: impl Into<String>) -> Self {
        Self(iso8601.into())
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row that did not enrich successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Zero-based position of the row in the input table.
    pub row_index: usize,
    /// Marker written into the row's output slots.
    pub marker: FailureMarker,
    /// Status, response body, or missing-field list.
    pub detail: String,
    /// When the failure was recorded.
    pub failed_at: Timestamp,
}
