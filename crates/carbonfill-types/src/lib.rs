//! Shared carbonfill data model: cells, tables, outcomes, and failure records.
//!
//! This crate carries no I/O so both the engine and the CLI can depend on it.

pub mod cell;
pub mod error;
pub mod failure;
pub mod job;
pub mod table;

pub use cell::Cell;
pub use error::{FailureMarker, Outcome, RowResult, ValidationFailure};
pub use failure::{RowFailure, Timestamp};
pub use job::{JobName, RowCounts};
pub use table::{RowRef, Table};
