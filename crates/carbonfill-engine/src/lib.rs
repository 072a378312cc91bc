//! Batch enrichment engine for carbonfill jobs.
//!
//! A job reads a table, normalizes its rows, builds one request per row (or
//! per batch of rows), dispatches each with connection retry and pacing, and
//! merges every outcome back onto its row. Row-level failures become marker
//! values in the output; only resource failures abort a run.

pub mod aggregate;
pub mod config;
pub mod csv_io;
pub mod currency;
pub mod dispatch;
pub mod execution;
pub(crate) mod failures;
pub mod merge;
pub mod normalize;
pub mod orchestrator;
pub mod request;
pub mod result;

// Re-export public API for convenience
pub use dispatch::{Dispatcher, RetryPolicy};
pub use execution::{DryRunResult, ExecutionOptions, JobOutcome};
pub use orchestrator::{check_job, run_job};
pub use result::{CheckResult, JobResult};
