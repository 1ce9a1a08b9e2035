//! Blank node identifiers
//!
//! Every object in the graph needs an `@id`. Objects without one (or with an
//! empty one) get the next free `#bN`. Existing `#bN` ids anywhere in the
//! graph are collected first, so fresh ids never collide with ids that appear
//! later in traversal order, and a second run changes nothing.

use crate::graph::CrateGraph;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

static BLANK_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#b(\d+)$").expect("valid blank id regex"));

/// Number of a `#bN` id
#[must_use]
pub fn blank_number(id: &str) -> Option<u64> {
    BLANK_ID
        .captures(id)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether an id is a blank node id
#[inline]
#[must_use]
pub fn is_blank_id(id: &str) -> bool {
    blank_number(id).is_some()
}

/// Allocator for `#bN` ids
#[derive(Debug, Clone, Default)]
pub struct BlankIds {
    used: BTreeSet<u64>,
}

impl BlankIds {
    /// Allocator aware of every blank id already in the graph
    #[must_use]
    pub fn scan(graph: &CrateGraph) -> Self {
        let mut ids = Self::default();
        for node in graph.nodes() {
            ids.collect_object(node);
        }
        ids
    }

    fn collect(&mut self, value: &Value) {
        match value {
            Value::Object(map) => self.collect_object(map),
            Value::Array(items) => items.iter().for_each(|item| self.collect(item)),
            _ => {}
        }
    }

    fn collect_object(&mut self, map: &Map<String, Value>) {
        if let Some(n) = map.get("@id").and_then(Value::as_str).and_then(blank_number) {
            self.used.insert(n);
        }
        map.values().for_each(|v| self.collect(v));
    }

    /// Next unused id, `max + 1` or `#b1`
    ///
    /// When `max` is `u64::MAX` the lowest free number is used instead.
    pub fn next_id(&mut self) -> String {
        let next = match self.used.last() {
            None => 1,
            Some(max) => max
                .checked_add(1)
                .or_else(|| (1..u64::MAX).find(|n| !self.used.contains(n)))
                .unwrap_or(0),
        };
        self.used.insert(next);
        format!("#b{next}")
    }
}

fn needs_id(map: &Map<String, Value>) -> bool {
    match map.get("@id") {
        None | Some(Value::Null) => true,
        Some(Value::String(id)) => id.is_empty(),
        Some(_) => false,
    }
}

fn assign_value(value: &mut Value, ids: &mut BlankIds) {
    match value {
        Value::Object(map) => assign_object(map, ids),
        Value::Array(items) => items.iter_mut().for_each(|item| assign_value(item, ids)),
        _ => {}
    }
}

fn assign_object(map: &mut Map<String, Value>, ids: &mut BlankIds) {
    if needs_id(map) {
        map.insert("@id".into(), Value::String(ids.next_id()));
    }
    map.values_mut().for_each(|v| assign_value(v, ids));
}

/// Give every id-less object in the graph a blank node id
///
/// Depth-first, in document order. Idempotent.
#[must_use]
pub fn assign_blank_ids(mut graph: CrateGraph) -> CrateGraph {
    let mut ids = BlankIds::scan(&graph);
    for node in graph.nodes_mut() {
        assign_object(node, &mut ids);
    }
    graph
}
