//! List broadcast properties of the projection engine

use mate_projection::{project, ProjectionTable};
use mate_record::{FieldMapping, SourceSpec};
use proptest::prelude::*;
use serde_json::{json, Value};

fn table(rows: &[(&str, &str)]) -> ProjectionTable {
    let mapping: FieldMapping = rows
        .iter()
        .map(|(target, source)| ((*target).to_string(), Some(SourceSpec::from(*source))))
        .collect();
    ProjectionTable::from_mapping(&mapping).unwrap()
}

proptest! {
    #[test]
    fn explicit_broadcast_keeps_one_entry_per_element(names in prop::collection::vec("[A-Za-z]{1,8}", 0..6)) {
        let authors: Vec<Value> = names.iter().map(|n| json!({"name": n})).collect();
        let record = json!({"authors": authors});

        let out = project(&record, &table(&[("people.#.label", "authors.#.name")]));

        let labels: Vec<&str> = out.document["people"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["label"].as_str().unwrap())
            .collect();
        prop_assert_eq!(labels, names.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert!(out.warnings.is_empty());
    }

    #[test]
    fn implicit_broadcast_aligns_parallel_fields(people in prop::collection::vec(("[A-Z][a-z]{1,6}", "[A-Z][a-z]{1,6}"), 1..5)) {
        let creators: Vec<Value> = people
            .iter()
            .map(|(given, family)| json!({"givenName": given, "familyName": family}))
            .collect();
        let record = json!({"creators": creators});

        let out = project(
            &record,
            &table(&[("creators.name", "creators.givenName"), ("creators.family_name", "creators.familyName")]),
        );

        let projected = out.document["creators"].as_array().unwrap();
        prop_assert_eq!(projected.len(), people.len());
        for (entry, (given, family)) in projected.iter().zip(&people) {
            prop_assert_eq!(entry["name"].as_str(), Some(given.as_str()));
            prop_assert_eq!(entry["family_name"].as_str(), Some(family.as_str()));
        }
    }
}

#[test]
fn scalar_sources_are_not_broadcast() {
    let record = json!({"title": "Plumes", "keywords": ["a", "b"]});
    let out = project(&record, &table(&[("title", "title"), ("research_tags", "keywords")]));
    assert_eq!(out.document, json!({"title": "Plumes", "research_tags": ["a", "b"]}));
}
