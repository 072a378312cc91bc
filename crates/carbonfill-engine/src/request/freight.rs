//! Freight requests: a multi-leg route between two locations.
//!
//! Non-road shipments are bracketed by road legs to and from the hubs, so the
//! route has 5 steps; pure road shipments have 3.

use carbonfill_types::{RowRef, ValidationFailure};
use serde_json::{json, Map, Value};

use super::fields::{coerce_number, require_fields};

const REQUIRED: &[&str] = &[
    "start",
    "destination",
    "main_mode_of_transport",
    "cargo_weight",
    "cargo_weight_unit",
];

/// `leg_details` key that carries the vehicle type for a transport mode.
#[must_use]
pub fn leg_detail_key(mode: &str) -> Option<&'static str> {
    match mode {
        "air" => Some("aircraft_type"),
        "sea" => Some("vessel_type"),
        "road" => Some("vehicle_type"),
        _ => None,
    }
}

fn main_leg(mode: &str, vehicle_type: Option<String>) -> Value {
    let mut leg = Map::new();
    leg.insert("transport_mode".to_string(), Value::String(mode.to_string()));
    if let (Some(key), Some(vehicle)) = (leg_detail_key(mode), vehicle_type) {
        leg.insert("leg_details".to_string(), json!({ key: vehicle }));
    }
    Value::Object(leg)
}

/// Build the freight payload for one row.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] when a required field is empty or the
/// cargo weight is not a number.
pub fn build_freight(row: &RowRef<'_>) -> Result<Value, ValidationFailure> {
    let values = require_fields(row, REQUIRED)?;
    let [start, destination, mode, weight, weight_unit] = <[String; 5]>::try_from(values)
        .map_err(|_| ValidationFailure::new(REQUIRED.iter().map(|s| (*s).to_string()).collect()))?;

    let Some(weight) = coerce_number(&weight) else {
        return Err(ValidationFailure::field("cargo_weight"));
    };

    let mode = mode.to_lowercase();
    let bracketed = mode != "road";

    let mut route = Vec::with_capacity(5);
    route.push(json!({"location": {"query": start}}));
    if bracketed {
        route.push(json!({"transport_mode": "road"}));
    }
    route.push(main_leg(&mode, row.text("vehicle_type")));
    if bracketed {
        route.push(json!({"transport_mode": "road"}));
    }
    route.push(json!({"location": {"query": destination}}));

    Ok(json!({
        "route": route,
        "cargo": {"weight": weight, "weight_unit": weight_unit},
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonfill_types::{Cell, Table};

    fn shipment(mode: &str, vehicle: &str, weight: &str) -> Table {
        let mut t = Table::new(
            [
                "start",
                "destination",
                "main_mode_of_transport",
                "vehicle_type",
                "cargo_weight",
                "cargo_weight_unit",
            ]
            .iter()
            .map(|c| (*c).to_string())
            .collect(),
        );
        t.push_row(
            ["Hamburg", "Rotterdam", mode, vehicle, weight, "t"]
                .iter()
                .map(|v| Cell::from_raw(v))
                .collect(),
        );
        t
    }

    #[test]
    fn test_road_route_has_three_steps() {
        let t = shipment("road", "hgv_diesel", "12");
        let payload = build_freight(&t.row(0).unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "route": [
                    {"location": {"query": "Hamburg"}},
                    {"transport_mode": "road", "leg_details": {"vehicle_type": "hgv_diesel"}},
                    {"location": {"query": "Rotterdam"}},
                ],
                "cargo": {"weight": 12.0, "weight_unit": "t"},
            })
        );
    }

    #[test]
    fn test_sea_route_is_road_bracketed() {
        let t = shipment(" Sea ", "container_ship", "3.5");
        let payload = build_freight(&t.row(0).unwrap()).unwrap();
        let route = payload["route"].as_array().unwrap();
        assert_eq!(route.len(), 5);
        assert_eq!(route[1], json!({"transport_mode": "road"}));
        assert_eq!(
            route[2],
            json!({"transport_mode": "sea", "leg_details": {"vessel_type": "container_ship"}})
        );
        assert_eq!(route[3], json!({"transport_mode": "road"}));
    }

    #[test]
    fn test_unparseable_weight_is_rejected() {
        let t = shipment("road", "", "heavy");
        let err = build_freight(&t.row(0).unwrap()).unwrap_err();
        assert_eq!(err.missing, vec!["cargo_weight"]);
    }

    #[test]
    fn test_missing_fields_listed() {
        let t = shipment("", "", "");
        let err = build_freight(&t.row(0).unwrap()).unwrap_err();
        assert_eq!(err.missing, vec!["main_mode_of_transport", "cargo_weight"]);
    }
}
