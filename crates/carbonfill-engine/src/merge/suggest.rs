//! Suggest results: ranked emission-factor columns per row.

use carbonfill_types::Cell;
use serde_json::Value;

use super::{ShapeError, SlotLayout, SlotWriter, SuccessMapper};

/// Per-rank output columns, in output order.
pub const SUGGEST_COLUMNS: &[&str] = &[
    "suggestion_name",
    "sector",
    "category",
    "unit_type",
    "source",
    "year_relevant",
    "year_released",
    "region_name",
    "source_lca_activity",
    "data_quality_flag",
    "suggestion_details",
];

/// Emission-factor attribute behind each plain column.
const FACTOR_FIELDS: &[(&str, &str)] = &[
    ("suggestion_name", "name"),
    ("sector", "sector"),
    ("category", "category"),
    ("unit_type", "unit_type"),
    ("source", "source"),
    ("year_relevant", "year"),
    ("year_released", "year_released"),
    ("region_name", "region_name"),
    ("source_lca_activity", "source_lca_activity"),
];

/// Fills ranked suggestion groups `1..=min(k, n)`.
#[derive(Debug, Clone, Copy)]
pub struct SuggestMapper {
    pub max_suggestions: usize,
}

impl SuccessMapper for SuggestMapper {
    fn layout(&self) -> SlotLayout {
        SlotLayout::ranked(SUGGEST_COLUMNS, self.max_suggestions)
    }

    fn map_success(&self, body: &Value, slots: &mut SlotWriter<'_>) -> Result<(), ShapeError> {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| ShapeError("suggest response has no results array".to_string()))?;

        for (i, suggestion) in results.iter().take(self.max_suggestions).enumerate() {
            let rank = i + 1;
            let factor = suggestion.get("emission_factor").unwrap_or(&Value::Null);
            for (column, field) in FACTOR_FIELDS {
                let cell = factor.get(*field).map_or(Cell::Absent, Cell::from_json);
                slots.set(&format!("{column}_{rank}"), cell);
            }

            let flagged = factor
                .get("data_quality_flags")
                .and_then(Value::as_array)
                .is_some_and(|flags| !flags.is_empty());
            slots.set(
                &format!("data_quality_flag_{rank}"),
                Cell::from(if flagged { "TRUE" } else { "FALSE" }),
            );

            let label = suggestion
                .get("suggestion_details")
                .and_then(|d| d.get("label"))
                .map_or(Cell::Absent, Cell::from_json);
            slots.set(&format!("suggestion_details_{rank}"), label);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::SlotBuffer;
    use carbonfill_types::{Outcome, RowResult};
    use serde_json::json;

    fn suggestion(name: &str, flags: &[&str]) -> Value {
        json!({
            "emission_factor": {
                "name": name,
                "sector": "Materials",
                "category": "Metals",
                "unit_type": "Weight",
                "source": "EPA",
                "year": 2021,
                "year_released": 2023,
                "region_name": "Germany",
                "source_lca_activity": "cradle_to_gate",
                "data_quality_flags": flags,
            },
            "suggestion_details": {"label": "Exact match"},
        })
    }

    fn cell<'a>(buf: &'a SlotBuffer, column: &str) -> &'a Cell {
        let idx = buf
            .layout()
            .slots()
            .iter()
            .position(|c| c == column)
            .unwrap();
        &buf.row(0).unwrap()[idx]
    }

    #[test]
    fn test_two_results_fill_two_ranks() {
        let mapper = SuggestMapper { max_suggestions: 5 };
        let mut buf = SlotBuffer::new(mapper.layout(), 1);
        let body = json!({"results": [suggestion("Steel", &[]), suggestion("Iron", &["partial_factor"])]});
        assert!(buf
            .merge_row(0, &RowResult::Dispatched(Outcome::success(body)), &mapper)
            .is_none());

        assert_eq!(cell(&buf, "suggestion_name_1"), &Cell::from("Steel"));
        assert_eq!(cell(&buf, "suggestion_name_2"), &Cell::from("Iron"));
        assert_eq!(cell(&buf, "year_relevant_1").render(), "2021");
        assert_eq!(cell(&buf, "data_quality_flag_1"), &Cell::from("FALSE"));
        assert_eq!(cell(&buf, "data_quality_flag_2"), &Cell::from("TRUE"));
        assert_eq!(cell(&buf, "suggestion_details_1"), &Cell::from("Exact match"));
        for rank in 3..=5 {
            for base in SUGGEST_COLUMNS {
                assert!(cell(&buf, &format!("{base}_{rank}")).is_absent());
            }
        }
    }

    #[test]
    fn test_results_beyond_k_ignored() {
        let mapper = SuggestMapper { max_suggestions: 1 };
        let mut buf = SlotBuffer::new(mapper.layout(), 1);
        let body = json!({"results": [suggestion("A", &[]), suggestion("B", &[])]});
        buf.merge_row(0, &RowResult::Dispatched(Outcome::success(body)), &mapper);
        assert_eq!(buf.layout().slots().len(), SUGGEST_COLUMNS.len());
        assert_eq!(cell(&buf, "suggestion_name_1"), &Cell::from("A"));
    }

    #[test]
    fn test_missing_results_is_error() {
        let mapper = SuggestMapper { max_suggestions: 2 };
        let mut buf = SlotBuffer::new(mapper.layout(), 1);
        let failure = buf
            .merge_row(0, &RowResult::Dispatched(Outcome::success(json!({}))), &mapper)
            .unwrap();
        assert_eq!(failure.marker.as_str(), "ERROR");
        assert_eq!(cell(&buf, "sector_2"), &Cell::from("ERROR"));
    }
}
