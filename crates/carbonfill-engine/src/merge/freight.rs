//! Freight results: emission totals, distance, and joined notices.

use carbonfill_types::Cell;
use serde_json::Value;

use super::{ShapeError, SlotLayout, SlotWriter, SuccessMapper};

pub const FREIGHT_COLUMNS: &[&str] = &[
    "co2e",
    "hub_equipment_co2e",
    "vehicle_operation_co2e",
    "vehicle_energy_provision_co2e",
    "distance_km",
    "notices",
];

const NUMERIC: &[&str] = &[
    "co2e",
    "hub_equipment_co2e",
    "vehicle_operation_co2e",
    "vehicle_energy_provision_co2e",
    "distance_km",
];

/// Flat freight totals plus the service's error message on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreightMapper;

impl SuccessMapper for FreightMapper {
    fn layout(&self) -> SlotLayout {
        SlotLayout::flat(FREIGHT_COLUMNS).with_diagnostic("error")
    }

    fn map_success(&self, body: &Value, slots: &mut SlotWriter<'_>) -> Result<(), ShapeError> {
        if !body.is_object() {
            return Err(ShapeError("freight response is not an object".to_string()));
        }
        for field in NUMERIC {
            slots.set(field, body.get(*field).map_or(Cell::Absent, Cell::from_json));
        }
        slots.set("notices", Cell::Text(join_notices(body.get("notices"))));
        Ok(())
    }
}

/// Join notices with `", "`. Object notices contribute their `message`.
fn join_notices(notices: Option<&Value>) -> String {
    let Some(Value::Array(items)) = notices else {
        return String::new();
    };
    items
        .iter()
        .filter_map(|notice| match notice {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("message").and_then(Value::as_str).map(str::to_string),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
