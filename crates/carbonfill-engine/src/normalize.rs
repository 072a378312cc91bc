//! Row normalization: rename declared columns, synthesize missing fields, and
//! canonicalize empty cells.
//!
//! No validation happens here; required-field checks belong to the request
//! builders so every row still reaches the merger with a defined result.

use std::collections::BTreeMap;

use carbonfill_types::{Cell, Table};

/// Normalize a raw table for a request builder.
///
/// - each `rename` entry (external -> canonical) renames a present column;
///   absent source columns are skipped,
/// - every name in `canonical_fields` exists afterwards, all-absent if new,
/// - any text cell holding a missing token becomes [`Cell::Absent`].
///
/// Columns not mentioned anywhere pass through untouched.
#[must_use]
pub fn normalize_table(
    mut table: Table,
    rename: &BTreeMap<String, String>,
    canonical_fields: &[&str],
) -> Table {
    for (from, to) in rename {
        if from == to {
            continue;
        }
        if table.column_index(to).is_some() {
            tracing::warn!(
                from = from.as_str(),
                to = to.as_str(),
                "Rename target already present, keeping existing column"
            );
            continue;
        }
        if !table.rename_column(from, to) {
            tracing::debug!(column = from.as_str(), "Declared column not found in input");
        }
    }

    for field in canonical_fields {
        table.ensure_column(field);
    }

    for cell in table.cells_mut() {
        if let Cell::Text(raw) = cell {
            if Cell::from_raw(raw).is_absent() {
                *cell = Cell::Absent;
            }
        }
    }

    table
}
