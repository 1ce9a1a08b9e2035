//! RO-Crate document wrapper
//!
//! [`CrateGraph`] holds a JSON-LD document whose `@graph` is known to be an
//! array of objects. The check happens once, in [`CrateGraph::from_document`].

use crate::error::{GraphError, GraphResult};
use serde_json::{Map, Value};

/// Id of the root data entity
pub const ROOT_ID: &str = "./";

/// One `@graph` node
pub type Node = Map<String, Value>;

/// JSON-LD crate document with a validated `@graph`
#[derive(Debug, Clone, PartialEq)]
pub struct CrateGraph {
    context: Value,
    nodes: Vec<Node>,
    /// Top-level keys other than `@context` and `@graph`
    extra: Map<String, Value>,
}

impl CrateGraph {
    /// Wrap a crate document
    ///
    /// # Errors
    /// [`GraphError::MissingGraph`] without a `@graph` array,
    /// [`GraphError::NotAnObject`] when an entry is not an object.
    pub fn from_document(document: Value) -> GraphResult<Self> {
        let Value::Object(mut document) = document else {
            return Err(GraphError::MissingGraph);
        };
        let Some(Value::Array(entries)) = document.remove("@graph") else {
            return Err(GraphError::MissingGraph);
        };

        let nodes = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| match entry {
                Value::Object(node) => Ok(node),
                _ => Err(GraphError::NotAnObject(i)),
            })
            .collect::<GraphResult<Vec<_>>>()?;
        let context = document.remove("@context").unwrap_or(Value::Null);

        Ok(Self {
            context,
            nodes,
            extra: document,
        })
    }

    /// Graph from bare nodes, without a context
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            context: Value::Null,
            nodes,
            extra: Map::new(),
        }
    }

    /// JSON-LD context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Nodes in document order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable nodes
    #[inline]
    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if graph has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of the first node with this id
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| node_id(n) == Some(id))
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Mutable node by id
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.index_of(id).map(move |i| &mut self.nodes[i])
    }

    /// Root data entity
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] when there is no `./` node.
    pub fn root_mut(&mut self) -> GraphResult<&mut Node> {
        self.node_mut(ROOT_ID)
            .ok_or_else(|| GraphError::NodeNotFound(ROOT_ID.to_string()))
    }

    /// Ids of the top-level nodes, in order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(node_id)
    }

    /// Append a node
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Reassemble the JSON-LD document
    #[must_use]
    pub fn to_document(&self) -> Value {
        let mut document = Map::new();
        if !self.context.is_null() {
            document.insert("@context".into(), self.context.clone());
        }
        for (key, value) in &self.extra {
            document.insert(key.clone(), value.clone());
        }
        document.insert(
            "@graph".into(),
            Value::Array(self.nodes.iter().cloned().map(Value::Object).collect()),
        );
        Value::Object(document)
    }

    /// Pretty-printed JSON-LD
    ///
    /// # Errors
    /// Only on serializer failure.
    pub fn to_json_pretty(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }
}

/// `@id` of a node, when it is a string
#[must_use]
pub fn node_id(node: &Node) -> Option<&str> {
    node.get("@id").and_then(Value::as_str)
}
