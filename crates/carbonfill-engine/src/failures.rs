//! Failure report persistence used by the orchestrator.

use std::io::Write;
use std::path::Path;

use carbonfill_types::{RowFailure, Timestamp};

use crate::merge::MergeFailure;

/// Failure record for `row`, stamped with the current time.
#[must_use]
pub fn row_failure(row_index: usize, failure: &MergeFailure) -> RowFailure {
    RowFailure {
        row_index,
        marker: failure.marker,
        detail: failure.detail.clone(),
        failed_at: Timestamp::new(chrono::Utc::now().to_rfc3339()),
    }
}

/// Write collected failures as JSON lines.
///
/// The report is auxiliary output: a write failure is logged and the run
/// carries on.
pub(crate) fn write_failure_report(path: &Path, records: &[RowFailure]) {
    match try_write(path, records) {
        Ok(()) => {
            tracing::info!(
                path = %path.display(),
                failures = records.len(),
                "Wrote failure report"
            );
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                failures = records.len(),
                error = %e,
                "Failed to write failure report"
            );
        }
    }
}

fn try_write(path: &Path, records: &[RowFailure]) -> anyhow::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut file, record)?;
        file.write_all(b"\n")?;
    }
    file.flush()?;
    Ok(())
}
