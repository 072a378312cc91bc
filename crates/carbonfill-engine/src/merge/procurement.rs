//! Procurement results: per-item batch outcomes mapped by dotted path.

use carbonfill_types::{Cell, Outcome};
use serde_json::Value;

use super::{lookup, ShapeError, SlotLayout, SlotWriter, SuccessMapper};
use crate::dispatch::domain_error;

/// Output columns, each a dotted path into one batch result item.
pub const PROCUREMENT_COLUMNS: &[&str] = &[
    "co2e",
    "co2e_unit",
    "co2e_calculation_method",
    "co2e_calculation_origin",
    "emission_factor.activity_id",
    "emission_factor.name",
    "emission_factor.source",
    "emission_factor.year",
    "emission_factor.region",
    "emission_factor.category",
    "activity_data.activity_value",
    "activity_data.activity_unit",
];

/// Maps one batch result item onto a spend row.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcurementMapper;

impl SuccessMapper for ProcurementMapper {
    fn layout(&self) -> SlotLayout {
        SlotLayout::flat(PROCUREMENT_COLUMNS)
    }

    fn map_success(&self, body: &Value, slots: &mut SlotWriter<'_>) -> Result<(), ShapeError> {
        if !body.is_object() {
            return Err(ShapeError("procurement result is not an object".to_string()));
        }
        for path in PROCUREMENT_COLUMNS {
            slots.set(path, lookup(body, path).map_or(Cell::Absent, Cell::from_json));
        }
        Ok(())
    }
}

/// Split one batch outcome into per-row outcomes, in batch order.
///
/// A failed batch fails every row with the same outcome. A successful batch
/// hands each row its own result item; items carrying an error are
/// classified like an error response, and rows without an item get an
/// unexpected failure.
#[must_use]
pub fn split_batch_outcome(
    rows: &[usize],
    outcome: &Outcome,
    no_match_codes: &[String],
) -> Vec<(usize, Outcome)> {
    let Outcome::Success { body } = outcome else {
        return rows.iter().map(|row| (*row, outcome.clone())).collect();
    };

    let Some(results) = body.get("results").and_then(Value::as_array) else {
        let failure = Outcome::unexpected("batch response has no results array");
        return rows.iter().map(|row| (*row, failure.clone())).collect();
    };

    if results.len() != rows.len() {
        tracing::warn!(
            expected = rows.len(),
            received = results.len(),
            "Batch result count does not match request"
        );
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let item_outcome = match results.get(i) {
                Some(item) => classify_item(item, no_match_codes),
                None => Outcome::unexpected(format!("no result for batch item {i}")),
            };
            (*row, item_outcome)
        })
        .collect()
}

fn classify_item(item: &Value, no_match_codes: &[String]) -> Outcome {
    let has_error = item.get("error").is_some_and(|e| !e.is_null())
        || item.get("error_code").is_some_and(|e| !e.is_null());
    if !has_error {
        return Outcome::success(item.clone());
    }
    domain_error(item, no_match_codes).unwrap_or_else(|| Outcome::TransportError {
        status: 200,
        body: item.to_string(),
    })
}
