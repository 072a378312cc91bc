//! Job run results.

use std::path::PathBuf;

use carbonfill_types::{JobName, RowCounts};

use crate::config::types::JobKind;

/// Result of a completed job run.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job: JobName,
    pub kind: JobKind,
    pub counts: RowCounts,
    /// Logical requests sent, not counting connection retries.
    pub requests: u64,
    pub retries: u64,
    /// Search pages fetched (`extract` jobs only).
    pub pages: u32,
    pub output: PathBuf,
    pub summary: Option<PathBuf>,
    pub duration_secs: f64,
}

/// Result of `check`: which declared fields the input lacks.
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub input_columns: usize,
    /// Canonical fields with no matching input column. These are synthesized
    /// as empty at run time, so required ones fail every row.
    pub missing_fields: Vec<String>,
}
