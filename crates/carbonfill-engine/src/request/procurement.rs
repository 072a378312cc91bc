//! Spend-based procurement requests, sent to the service in batches.

use carbonfill_types::{RowRef, ValidationFailure};
use serde_json::{Map, Value};

use super::fields::{apply_optional_fields, coerce_number, require_fields, FieldKind, OptionalField};
use crate::currency::{normalize_spend, ExchangeRates};

const OPTIONAL: &[OptionalField] = &[
    OptionalField::new("spend_year", FieldKind::Integer),
    OptionalField::new("spend_region", FieldKind::Text),
];

/// How a spend row identifies its activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityReference {
    /// Rows carry an `activity_id` directly.
    ActivityId,
    /// Rows carry a `classification_code` under the given scheme.
    Classification(String),
}

impl ActivityReference {
    #[must_use]
    pub fn from_scheme(scheme: Option<&str>) -> Self {
        match scheme {
            Some(s) => Self::Classification(s.trim().to_string()),
            None => Self::ActivityId,
        }
    }

    fn field(&self) -> &'static str {
        match self {
            Self::ActivityId => "activity_id",
            Self::Classification(_) => "classification_code",
        }
    }

    fn activity(&self, value: String) -> Value {
        let mut activity = Map::new();
        match self {
            Self::ActivityId => {
                activity.insert("activity_id".to_string(), Value::String(value));
            }
            Self::Classification(scheme) => {
                activity.insert(
                    "classification_type".to_string(),
                    Value::String(scheme.clone()),
                );
                activity.insert("classification_code".to_string(), Value::String(value));
            }
        }
        Value::Object(activity)
    }
}

/// Build one batch item for a spend row.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] when the amount, currency, or activity
/// reference is missing, or the amount is not a number.
pub fn build_procurement_item(
    row: &RowRef<'_>,
    reference: &ActivityReference,
    rates: &dyn ExchangeRates,
) -> Result<Value, ValidationFailure> {
    let required = ["money", "money_unit", reference.field()];
    let mut values = require_fields(row, &required)?.into_iter();
    let (Some(money), Some(currency), Some(activity)) = (values.next(), values.next(), values.next())
    else {
        return Err(ValidationFailure::new(
            required.iter().map(|s| (*s).to_string()).collect(),
        ));
    };

    let Some(money) = coerce_number(&money) else {
        return Err(ValidationFailure::field("money"));
    };
    let (money, money_unit) = normalize_spend(money, &currency, rates);

    let mut item = Map::new();
    item.insert("money".to_string(), Value::from(money));
    item.insert("money_unit".to_string(), Value::String(money_unit));
    apply_optional_fields(row, OPTIONAL, &mut item);
    item.insert("activity".to_string(), reference.activity(activity));
    Ok(Value::Object(item))
}

/// One batch request and the rows it covers, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub rows: Vec<usize>,
    pub payload: Value,
}

/// Group built items into batches of at most `batch_size`, in row order.
#[must_use]
pub fn into_batches(items: Vec<(usize, Value)>, batch_size: usize) -> Vec<Batch> {
    let size = batch_size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        let (rows, payloads): (Vec<usize>, Vec<Value>) = iter.by_ref().take(size).unzip();
        batches.push(Batch {
            rows,
            payload: Value::Array(payloads),
        });
    }
    batches
}
