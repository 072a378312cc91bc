//! Cell values for loosely-typed tabular rows.
//!
//! Input tables routinely carry blanks, spreadsheet NA tokens, and mixed
//! text/number columns. [`Cell`] makes the "missing" case explicit so request
//! builders can tell an omitted field from an empty string.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw tokens treated as missing when loading a table.
///
/// Matches the default NA set of common dataframe loaders, so files exported
/// from spreadsheets behave the same way they did before enrichment.
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single tabular value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Canonical empty marker.
    #[default]
    Absent,
    /// Free text, stored as read.
    Text(String),
    /// Numeric value produced by enrichment.
    Number(f64),
}

impl Cell {
    /// Classify a raw field read from a file.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        if MISSING_TOKENS.contains(&raw.trim()) {
            Self::Absent
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// Returns `true` for the canonical empty marker.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Trimmed textual content, or `None` when the cell carries nothing.
    ///
    /// Whitespace-only text is treated as missing.
    #[must_use]
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Absent => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(Cow::Borrowed(trimmed))
            }
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
        }
    }

    /// Text cell, or absent when `value` is empty.
    #[must_use]
    pub fn from_text(value: String) -> Self {
        if value.is_empty() {
            Self::Absent
        } else {
            Self::Text(value)
        }
    }

    /// Convert a JSON value from a service response.
    ///
    /// `null` is absent; arrays and objects are kept as compact JSON text.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Absent,
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Value as written to an output file.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
