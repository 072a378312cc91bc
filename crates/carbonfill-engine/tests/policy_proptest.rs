use carbonfill_engine::merge::{SlotBuffer, SuccessMapper, SuggestMapper};
use carbonfill_engine::request::fields::split_list;
use carbonfill_engine::request::{build_freight, build_suggest};
use carbonfill_types::{Cell, Outcome, RowResult, Table};
use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;

fn one_row(pairs: &[(&str, &str)]) -> Table {
    let mut t = Table::new(pairs.iter().map(|(c, _)| (*c).to_string()).collect());
    t.push_row(pairs.iter().map(|(_, v)| Cell::from_raw(v)).collect());
    t
}

fn suggestions(n: usize) -> serde_json::Value {
    let results: Vec<_> = (0..n)
        .map(|i| json!({"emission_factor": {"name": format!("factor {i}")}}))
        .collect();
    json!({ "results": results })
}

proptest! {
    #[test]
    fn exclusive_sources_never_both_set(
        source in "[A-H]{0,4}( ?, ?[A-H]{1,4}){0,2}",
        exclude in "[A-H]{0,4}( ?, ?[A-H]{1,4}){0,2}",
    ) {
        let t = one_row(&[("text", "steel"), ("source", &source), ("exclude_source", &exclude)]);
        let payload = build_suggest(&t.row(0).unwrap(), 5).unwrap();
        let suggest = &payload["suggest"];
        prop_assert!(!(suggest.get("source").is_some() && suggest.get("exclude_source").is_some()));
        if !split_list(&source).is_empty() {
            prop_assert!(suggest.get("source").is_some());
        } else if !split_list(&exclude).is_empty() {
            prop_assert!(suggest.get("exclude_source").is_some());
        }
    }

    #[test]
    fn split_list_items_are_trimmed_and_non_empty(raw in "[a-z ,]{0,30}") {
        for item in split_list(&raw) {
            prop_assert!(!item.is_empty());
            prop_assert_eq!(item.trim(), item.as_str());
            prop_assert!(!item.contains(','));
        }
    }

    #[test]
    fn ranked_slots_filled_equal_min_k_n(k in 1_usize..8, n in 0_usize..10) {
        let mapper = SuggestMapper { max_suggestions: k };
        let mut buffer = SlotBuffer::new(mapper.layout(), 1);
        let result = RowResult::Dispatched(Outcome::success(suggestions(n)));
        prop_assert!(buffer.merge_row(0, &result, &mapper).is_none());

        let names = buffer.layout().slots().iter().zip(buffer.row(0).unwrap());
        let filled = names
            .filter(|(column, cell)| column.starts_with("suggestion_name_") && !cell.is_absent())
            .count();
        prop_assert_eq!(filled, k.min(n));
    }

    #[test]
    fn merge_is_idempotent(n in 0_usize..4, status in 400_u16..600) {
        let mapper = SuggestMapper { max_suggestions: 3 };
        for result in [
            RowResult::Dispatched(Outcome::success(suggestions(n))),
            RowResult::Dispatched(Outcome::TransportError { status, body: String::new() }),
        ] {
            let mut buffer = SlotBuffer::new(mapper.layout(), 1);
            let first = buffer.merge_row(0, &result, &mapper);
            let snapshot = buffer.clone();
            let second = buffer.merge_row(0, &result, &mapper);
            prop_assert_eq!(first, second);
            prop_assert_eq!(&snapshot, &buffer);
        }
    }

    #[test]
    fn blank_text_never_builds(text in "[ \t]{0,5}") {
        let t = one_row(&[("text", &text), ("region", "DE")]);
        prop_assert!(build_suggest(&t.row(0).unwrap(), 5).is_err());
    }
}

#[rstest]
#[case::road("road", "hgv", 3, Some(("vehicle_type", "hgv")))]
#[case::road_no_vehicle("road", "", 3, None)]
#[case::air("air", "freighter", 5, Some(("aircraft_type", "freighter")))]
#[case::sea("SEA", "container_ship", 5, Some(("vessel_type", "container_ship")))]
#[case::rail("rail", "electric", 5, None)]
fn freight_route_shape(
    #[case] mode: &str,
    #[case] vehicle: &str,
    #[case] steps: usize,
    #[case] detail: Option<(&str, &str)>,
) {
    let t = one_row(&[
        ("start", "Hamburg"),
        ("destination", "Munich"),
        ("main_mode_of_transport", mode),
        ("vehicle_type", vehicle),
        ("cargo_weight", "1.5"),
        ("cargo_weight_unit", "t"),
    ]);
    let payload = build_freight(&t.row(0).unwrap()).unwrap();
    let route = payload["route"].as_array().unwrap();
    assert_eq!(route.len(), steps);
    assert_eq!(route[0], json!({"location": {"query": "Hamburg"}}));
    assert_eq!(route[steps - 1], json!({"location": {"query": "Munich"}}));

    let main = &route[steps / 2];
    assert_eq!(main["transport_mode"], mode.to_lowercase());
    match detail {
        Some((key, value)) => assert_eq!(main["leg_details"], json!({ key: value })),
        None => assert!(main.get("leg_details").is_none()),
    }
    if steps == 5 {
        assert_eq!(route[1], json!({"transport_mode": "road"}));
        assert_eq!(route[3], json!({"transport_mode": "road"}));
    }
}
