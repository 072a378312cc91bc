//! Execution mode types for job runs.

use serde_json::Value;

use crate::result::JobResult;

/// Runtime execution options (not part of job YAML config).
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Build requests without sending them or writing output.
    pub dry_run: bool,
    /// Maximum input rows (or search pages, for `extract`) to process.
    pub limit: Option<u64>,
}

/// One request that would have been sent.
#[derive(Debug, Clone)]
pub struct PlannedRequest {
    /// Input rows the request covers.
    pub rows: Vec<usize>,
    pub payload: Value,
}

/// Result of a dry run.
#[derive(Debug, Clone, Default)]
pub struct DryRunResult {
    pub requests: Vec<PlannedRequest>,
    /// Rows that would be marked `MISSING_REQUIRED_FIELDS`.
    pub invalid_rows: Vec<usize>,
}

/// Either a normal job result or a dry-run result.
#[derive(Debug)]
pub enum JobOutcome {
    Run(JobResult),
    DryRun(DryRunResult),
}
