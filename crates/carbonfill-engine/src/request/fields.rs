//! Per-field coercion policies shared by the request builders.

use carbonfill_types::{RowRef, ValidationFailure};
use serde_json::{Map, Value};

/// Target shape of an optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed string.
    Text,
    /// Whole number; unparseable values omit the field.
    Integer,
    /// `true` only for the literal token `"true"` (any case).
    Boolean,
    /// Comma-separated list, trimmed, empties dropped.
    List,
}

/// An optional request field and the fields it cannot coexist with.
#[derive(Debug, Clone, Copy)]
pub struct OptionalField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// If any of these is already on the request, this field is skipped.
    pub exclusive_with: &'static [&'static str],
}

impl OptionalField {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            exclusive_with: &[],
        }
    }

    #[must_use]
    pub const fn exclusive(
        name: &'static str,
        kind: FieldKind,
        exclusive_with: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind,
            exclusive_with,
        }
    }
}

/// Trimmed values for every required field, in declaration order.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] listing each required field that is
/// missing or blank.
pub fn require_fields(row: &RowRef<'_>, names: &[&str]) -> Result<Vec<String>, ValidationFailure> {
    let mut values = Vec::with_capacity(names.len());
    let mut missing = Vec::new();
    for name in names {
        match row.text(name) {
            Some(value) => values.push(value),
            None => missing.push((*name).to_string()),
        }
    }
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(ValidationFailure::new(missing))
    }
}

/// Apply `fields` in declaration order onto `target`.
///
/// Order matters: when two exclusive fields are both present, the first one
/// declared wins.
pub fn apply_optional_fields(row: &RowRef<'_>, fields: &[OptionalField], target: &mut Map<String, Value>) {
    for field in fields {
        let Some(raw) = row.text(field.name) else {
            continue;
        };
        if field
            .exclusive_with
            .iter()
            .any(|other| target.contains_key(*other))
        {
            tracing::debug!(
                row = row.index(),
                field = field.name,
                "Skipping field: exclusive partner already set"
            );
            continue;
        }
        if let Some(value) = coerce(field.kind, &raw) {
            target.insert(field.name.to_string(), value);
        }
    }
}

fn coerce(kind: FieldKind, raw: &str) -> Option<Value> {
    match kind {
        FieldKind::Text => Some(Value::String(raw.to_string())),
        FieldKind::Integer => coerce_integer(raw).map(Value::from),
        FieldKind::Boolean => Some(Value::Bool(parse_flag(raw))),
        FieldKind::List => {
            let items = split_list(raw);
            (!items.is_empty()).then(|| Value::from(items))
        }
    }
}

/// Parse a whole number, accepting integral decimal spellings like `2021.0`.
#[must_use]
pub fn coerce_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let v = trimmed.parse::<f64>().ok()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Parse a finite floating-point number.
#[must_use]
pub fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split a comma-separated list, trimming and dropping empty items.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true` iff the trimmed, lower-cased value is `"true"`.
#[must_use]
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}
