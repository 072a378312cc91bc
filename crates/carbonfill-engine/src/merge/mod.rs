//! Result merging: write each row's outcome into its output slots.
//!
//! Slots live in a [`SlotBuffer`] owned separately from the input table and
//! are appended to it in one step once every row is done. Merging a row
//! resets its slots first, so merging the same result twice is a no-op.

pub mod freight;
pub mod procurement;
pub mod suggest;

use carbonfill_types::{Cell, FailureMarker, Outcome, RowResult, Table};
use serde_json::Value;

pub use freight::FreightMapper;
pub use procurement::{split_batch_outcome, ProcurementMapper};
pub use suggest::SuggestMapper;

/// Output columns written for every row of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    slots: Vec<String>,
    diagnostic: Option<String>,
}

impl SlotLayout {
    /// Single-valued columns.
    #[must_use]
    pub fn flat(names: &[&str]) -> Self {
        Self {
            slots: names.iter().map(|n| (*n).to_string()).collect(),
            diagnostic: None,
        }
    }

    /// `base` repeated `ranks` times as `<base>_<i>`, grouped by rank.
    #[must_use]
    pub fn ranked(base: &[&str], ranks: usize) -> Self {
        let slots = (1..=ranks)
            .flat_map(|rank| base.iter().map(move |name| format!("{name}_{rank}")))
            .collect();
        Self {
            slots,
            diagnostic: None,
        }
    }

    /// Extra column holding the failure message of failed rows. It is not a
    /// slot: it never receives a marker.
    #[must_use]
    pub fn with_diagnostic(mut self, name: &str) -> Self {
        self.diagnostic = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Every appended column: slots, then the diagnostic column if any.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.slots.clone();
        columns.extend(self.diagnostic.iter().cloned());
        columns
    }
}

/// Response body did not have the shape a mapper expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected response shape: {0}")]
pub struct ShapeError(pub String);

/// Maps a successful response body onto a row's slots.
pub trait SuccessMapper {
    fn layout(&self) -> SlotLayout;

    /// Write values for a successful body. Slots left untouched stay absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] when the body cannot be mapped; the row is
    /// then marked as an unexpected failure.
    fn map_success(&self, body: &Value, slots: &mut SlotWriter<'_>) -> Result<(), ShapeError>;
}

/// Named write access to the slot section of one buffer row.
pub struct SlotWriter<'a> {
    columns: &'a [String],
    cells: &'a mut [Cell],
}

impl SlotWriter<'_> {
    /// Set slot `column`. Unknown names are ignored.
    pub fn set(&mut self, column: &str, cell: Cell) {
        if let Some(idx) = self.columns.iter().position(|c| c == column) {
            self.cells[idx] = cell;
        }
    }
}

/// A row that ended with a failure marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFailure {
    pub marker: FailureMarker,
    pub detail: String,
}

/// Per-row output values, initialized to absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotBuffer {
    layout: SlotLayout,
    rows: Vec<Vec<Cell>>,
}

impl SlotBuffer {
    #[must_use]
    pub fn new(layout: SlotLayout, row_count: usize) -> Self {
        let width = layout.columns().len();
        Self {
            layout,
            rows: vec![vec![Cell::Absent; width]; row_count],
        }
    }

    #[must_use]
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    /// All appended cells of row `idx`.
    #[must_use]
    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Merge one row result into row `idx`.
    ///
    /// Returns the failure the row ended with, or `None` when it was
    /// enriched.
    pub fn merge_row(
        &mut self,
        idx: usize,
        result: &RowResult,
        mapper: &dyn SuccessMapper,
    ) -> Option<MergeFailure> {
        let slot_count = self.layout.slots.len();
        let Some(cells) = self.rows.get_mut(idx) else {
            tracing::warn!(row = idx, "Merge target row out of range");
            return None;
        };
        cells.fill(Cell::Absent);
        let (slot_cells, diagnostic) = cells.split_at_mut(slot_count);

        let failure = match result {
            RowResult::Dispatched(Outcome::Success { body }) => {
                let mut writer = SlotWriter {
                    columns: &self.layout.slots,
                    cells: slot_cells,
                };
                match mapper.map_success(body, &mut writer) {
                    Ok(()) => return None,
                    Err(e) => MergeFailure {
                        marker: FailureMarker::Error,
                        detail: e.to_string(),
                    },
                }
            }
            RowResult::Dispatched(outcome) => MergeFailure {
                marker: outcome.failure_marker().unwrap_or(FailureMarker::Error),
                detail: outcome.service_message().unwrap_or_else(|| outcome.detail()),
            },
            RowResult::MissingRequired(failure) => MergeFailure {
                marker: FailureMarker::MissingRequiredFields,
                detail: failure.to_string(),
            },
        };

        // Success mapping may have written some slots before failing.
        slot_cells.fill(Cell::from(failure.marker.as_str()));
        if let Some(cell) = diagnostic.first_mut() {
            *cell = Cell::Text(failure.detail.clone());
        }
        Some(failure)
    }

    /// Append the buffered columns to `table`, row for row.
    pub fn merge_into(self, table: &mut Table) {
        table.append_columns(&self.layout.columns(), self.rows);
    }
}

/// Dotted-path lookup (`emission_factor.name`) into a JSON object.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}
