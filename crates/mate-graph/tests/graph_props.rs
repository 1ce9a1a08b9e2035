//! Property tests for blank-id assignment and flattening

use mate_graph::blank::blank_number;
use mate_graph::flatten::{duplicate_ids, has_inline_objects};
use mate_graph::{assign_blank_ids, flatten, CrateGraph};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Nested attribute values: scalars, inline objects (with or without ids) and lists
fn attribute() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        "[a-z]{1,6}".prop_map(Value::String),
        any::<i32>().prop_map(|n| json!(n)),
        (1u64..40).prop_map(|n| json!({ "@id": format!("#b{n}") })),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            (
                prop::option::of(prop_oneof![
                    (1u64..40).prop_map(|n| format!("#b{n}")),
                    "https://orcid\\.org/[0-9]{4}",
                    Just(String::new()),
                ]),
                prop::collection::btree_map("[a-z]{1,5}", inner, 1..4),
            )
                .prop_map(|(id, attributes)| {
                    let mut map: Map<String, Value> = attributes.into_iter().collect();
                    if let Some(id) = id {
                        map.insert("@id".into(), Value::String(id));
                    }
                    Value::Object(map)
                }),
        ]
    })
}

fn crate_graph() -> impl Strategy<Value = CrateGraph> {
    prop::collection::vec(prop::collection::btree_map("[a-z]{1,5}", attribute(), 0..4), 1..4).prop_map(|nodes| {
        let nodes: Vec<Value> = nodes
            .into_iter()
            .enumerate()
            .map(|(i, attributes)| {
                let mut map: Map<String, Value> = attributes.into_iter().collect();
                map.insert("@id".into(), json!(format!("./node-{i}")));
                Value::Object(map)
            })
            .collect();
        CrateGraph::from_document(json!({ "@graph": nodes })).expect("generated graph is well formed")
    })
}

fn all_ids(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("@id") {
                out.push(id.clone());
            }
            map.values().for_each(|v| all_ids(v, out));
        }
        Value::Array(items) => items.iter().for_each(|v| all_ids(v, out)),
        _ => {}
    }
}

fn nested_objects(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(nested_objects).sum::<usize>(),
        Value::Array(items) => items.iter().map(nested_objects).sum(),
        _ => 0,
    }
}

proptest! {
    #[test]
    fn blank_id_assignment_is_idempotent(graph in crate_graph()) {
        let once = assign_blank_ids(graph);
        let twice = assign_blank_ids(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn existing_ids_survive_assignment(graph in crate_graph()) {
        let mut before = Vec::new();
        all_ids(&graph.to_document(), &mut before);
        before.retain(|id| !id.is_empty());

        let mut after = Vec::new();
        all_ids(&assign_blank_ids(graph).to_document(), &mut after);

        for id in before {
            prop_assert!(after.contains(&id));
        }
    }

    #[test]
    fn fresh_blank_ids_are_above_existing_ones(graph in crate_graph()) {
        let mut before = Vec::new();
        all_ids(&graph.to_document(), &mut before);
        let max_before = before.iter().filter_map(|id| blank_number(id)).max().unwrap_or(0);

        let mut after = Vec::new();
        all_ids(&assign_blank_ids(graph).to_document(), &mut after);

        let fresh: Vec<u64> = after
            .iter()
            .filter(|id| !before.contains(*id))
            .filter_map(|id| blank_number(id))
            .collect();
        for n in &fresh {
            prop_assert!(*n > max_before);
        }
        let mut sorted = fresh.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), fresh.len());
    }

    #[test]
    fn flatten_terminates_compacted(graph in crate_graph()) {
        let bound = nested_objects(&graph.to_document()["@graph"]);
        let start = graph.len();
        let flat = flatten(graph);

        prop_assert!(flat.len() >= start);
        prop_assert!(flat.len() <= bound);
        prop_assert!(!has_inline_objects(&flat));
    }

    #[test]
    fn flattened_ids_are_unique(graph in crate_graph()) {
        let flat = flatten(graph);
        prop_assert!(duplicate_ids(&flat).is_empty());
    }

    #[test]
    fn flatten_is_stable(graph in crate_graph()) {
        let flat = flatten(graph);
        prop_assert_eq!(flatten(flat.clone()), flat);
    }
}
