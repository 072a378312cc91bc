//! Resilient dispatch: connection retry, pacing, and outcome classification.

pub mod classify;
pub mod client;
pub mod retry;

pub use classify::{classify_failure, domain_error};
pub use client::{DispatchStats, Dispatcher};
pub use retry::{BackoffPolicy, RetryPolicy};
