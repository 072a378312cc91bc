//! Suggest requests: one free-text item in, ranked emission factors out.

use carbonfill_types::{RowRef, ValidationFailure};
use serde_json::{json, Map, Value};

use super::fields::{apply_optional_fields, require_fields, FieldKind, OptionalField};

const REQUIRED: &[&str] = &["text"];

const OPTIONAL: &[OptionalField] = &[
    OptionalField::new("model", FieldKind::Text),
    OptionalField::new("unit_type", FieldKind::List),
    OptionalField::new("year", FieldKind::Integer),
    OptionalField::new("region", FieldKind::Text),
    OptionalField::new("region_fallback", FieldKind::Boolean),
    OptionalField::exclusive("source", FieldKind::List, &["exclude_source"]),
    OptionalField::exclusive("exclude_source", FieldKind::List, &["source"]),
    OptionalField::new("source_lca_activity", FieldKind::List),
];

/// Build the suggest payload for one row.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] when `text` is empty.
pub fn build_suggest(row: &RowRef<'_>, max_suggestions: usize) -> Result<Value, ValidationFailure> {
    let mut values = require_fields(row, REQUIRED)?;
    let mut suggest = Map::new();
    suggest.insert("text".to_string(), Value::String(values.remove(0)));
    apply_optional_fields(row, OPTIONAL, &mut suggest);

    Ok(json!({
        "suggest": suggest,
        "max_suggestions": max_suggestions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonfill_types::{Cell, Table};

    fn one_row(pairs: &[(&str, &str)]) -> Table {
        let mut t = Table::new(pairs.iter().map(|(c, _)| (*c).to_string()).collect());
        t.push_row(pairs.iter().map(|(_, v)| Cell::from_raw(v)).collect());
        t
    }

    #[test]
    fn test_minimal_payload() {
        let t = one_row(&[("text", "  office chairs ")]);
        let payload = build_suggest(&t.row(0).unwrap(), 5).unwrap();
        assert_eq!(
            payload,
            json!({"suggest": {"text": "office chairs"}, "max_suggestions": 5})
        );
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let t = one_row(&[("text", "   "), ("region", "DE")]);
        let err = build_suggest(&t.row(0).unwrap(), 5).unwrap_err();
        assert_eq!(err.missing, vec!["text"]);
    }

    #[test]
    fn test_all_optional_fields_coerced() {
        let t = one_row(&[
            ("text", "steel"),
            ("model", "custom-v2"),
            ("unit_type", "Weight, Money"),
            ("year", "2021.0"),
            ("region", "DE"),
            ("region_fallback", "TRUE"),
            ("exclude_source", "EPA"),
            ("source_lca_activity", "cradle_to_gate"),
        ]);
        let payload = build_suggest(&t.row(0).unwrap(), 3).unwrap();
        assert_eq!(
            payload["suggest"],
            json!({
                "text": "steel",
                "model": "custom-v2",
                "unit_type": ["Weight", "Money"],
                "year": 2021,
                "region": "DE",
                "region_fallback": true,
                "exclude_source": ["EPA"],
                "source_lca_activity": ["cradle_to_gate"],
            })
        );
        assert_eq!(payload["max_suggestions"], 3);
    }

    #[test]
    fn test_source_wins_over_exclude_source() {
        let t = one_row(&[("text", "steel"), ("source", "BEIS"), ("exclude_source", "EPA")]);
        let payload = build_suggest(&t.row(0).unwrap(), 5).unwrap();
        assert_eq!(payload["suggest"]["source"], json!(["BEIS"]));
        assert!(payload["suggest"].get("exclude_source").is_none());
    }

    #[test]
    fn test_non_true_fallback_is_false() {
        let t = one_row(&[("text", "steel"), ("region_fallback", "yes")]);
        let payload = build_suggest(&t.row(0).unwrap(), 5).unwrap();
        assert_eq!(payload["suggest"]["region_fallback"], false);
    }
}
