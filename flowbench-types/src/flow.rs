//! Wire format of workflow graphs and run requests.
//!
//! Only the parts of the graph format that the provisioner writes are modelled here. Component
//! code is carried as an opaque string inside a [`TemplateField`] and never interpreted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The node type used by the graph editor for all component nodes.
pub const GENERIC_NODE: &str = "genericNode";

/// Payload of a flow creation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewFlow {
    /// Display name of the flow. Names are expected to be unique per user.
    pub name: String,
    /// Optional human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The graph of the flow.
    pub data: FlowData,
}

/// The graph of a flow: its nodes and the edges connecting them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowData {
    /// All nodes of the graph.
    pub nodes: Vec<Node>,
    /// Directed edges between nodes, referencing [`Node::id`].
    pub edges: Vec<Edge>,
}

/// A single component in a flow graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier of the node, unique within the graph.
    pub id: String,
    /// Node type, usually [`GENERIC_NODE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Position on the editor canvas.
    pub position: Position,
    /// Component description.
    pub data: NodeData,
}

/// Canvas coordinates of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// The component carried by a [`Node`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Identifier of the node, repeated from [`Node::id`].
    pub id: String,
    /// Component type, such as `ChatInput`.
    #[serde(rename = "type")]
    pub component: String,
    /// Component template.
    pub node: ComponentNode,
}

/// Display information and template values of a component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Name shown in the editor.
    pub display_name: String,
    /// Template fields by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub template: BTreeMap<String, TemplateField>,
}

/// A single template value of a component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Field type, such as `str` or `code`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Field value.
    pub value: String,
}

/// A directed connection between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Identifier of the edge, unique within the graph.
    pub id: String,
    /// Identifier of the source node.
    pub source: String,
    /// Identifier of the target node.
    pub target: String,
}

impl Edge {
    /// Creates an edge from `source` to `target` with the editor's id convention.
    pub fn between(source: &str, target: &str) -> Self {
        Self {
            id: format!("reactflow__edge-{source}-{target}"),
            source: source.to_owned(),
            target: target.to_owned(),
        }
    }
}

/// Body of a flow run request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// The chat input passed to the flow.
    pub input_value: String,
    /// The kind of input, `text` for benchmarks.
    pub input_type: String,
    /// The kind of output, `text` for benchmarks.
    pub output_type: String,
}

impl RunRequest {
    /// Creates a text-in, text-out run request.
    pub fn text(input_value: impl Into<String>) -> Self {
        Self {
            input_value: input_value.into(),
            input_type: "text".to_owned(),
            output_type: "text".to_owned(),
        }
    }
}

impl Default for RunRequest {
    fn default() -> Self {
        Self::text("hello from stresstest")
    }
}
