use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node, unique for the lifetime of a [`Graph`].
pub type NodeId = u64;

/// Largest node id a document may carry, the largest integer the editor
/// represents exactly. Ids assigned after loading stay far below `u64::MAX`.
pub const MAX_NODE_ID: NodeId = (1 << 53) - 1;

/// Position of a node on the canvas. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visual kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Circle,
    Square,
    Triangle,
    Diamond,
    Hexagon,
    Parallelogram,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Diamond => "diamond",
            Shape::Hexagon => "hexagon",
            Shape::Parallelogram => "parallelogram",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form classification and port declarations of a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Input port specs, each `name` or `name:type`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    /// Output port specs, each `name` or `name:type`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl NodeMeta {
    fn is_empty(&self) -> bool {
        self.role.is_none() && self.group.is_none() && self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// A partial update of [`NodeMeta`]; `Some` fields replace the current value.
#[derive(Debug, Clone, Default)]
pub struct NodeMetaPatch {
    pub role: Option<String>,
    pub group: Option<String>,
    pub inputs: Option<Vec<String>>,
    pub outputs: Option<Vec<String>>,
}

impl NodeMetaPatch {
    pub fn inputs<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = Some(ports.into_iter().map(Into::into).collect());
        self
    }

    pub fn outputs<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = Some(ports.into_iter().map(Into::into).collect());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A step in the flowchart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "type", default)]
    pub shape: Shape,
    /// The predicate evaluated when the node is used as a decision point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "NodeMeta::is_empty")]
    pub meta: NodeMeta,
}

impl Node {
    /// The trimmed predicate, or `None` for a pass-through node.
    pub fn predicate(&self) -> Option<&str> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// A directed control-flow arrow between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            label: None,
        }
    }

    pub fn labeled(from: NodeId, to: NodeId, label: impl Into<String>) -> Self {
        Self {
            from,
            to,
            label: Some(label.into()),
        }
    }

    /// An edge with no label, or an empty one.
    pub fn is_unlabeled(&self) -> bool {
        self.label.as_deref().is_none_or(str::is_empty)
    }

    /// Case-insensitive label comparison; an unlabeled edge matches the empty string.
    pub fn label_matches(&self, expected: &str) -> bool {
        self.label
            .as_deref()
            .unwrap_or_default()
            .eq_ignore_ascii_case(expected)
    }
}

/// A node removed from the graph together with the edges that touched it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

/// The nodes and edges of one editing session.
///
/// Nodes keep their insertion order. Node ids are assigned monotonically and
/// never reused, even after the node with the highest id is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_id: NodeId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_id: 1,
        }
    }

    /// Builds a graph from already validated parts.
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let next_id = nodes
            .iter()
            .map(|n| n.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        Self {
            nodes,
            edges,
            next_id,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// The node execution starts from: the first one in insertion order.
    pub fn first_node(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Outgoing edges of `id` with their indices, in edge order.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, edge)| edge.from == id)
    }

    /// Whether an edge `from -> to` labeled exactly `label` exists.
    pub fn has_edge(&self, from: NodeId, to: NodeId, label: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.from == from && e.to == to && e.label.as_deref() == Some(label))
    }

    pub fn add_node(&mut self, position: Position, shape: Shape) -> NodeId {
        let id = self.next_id;
        self.next_id = id.saturating_add(1);
        self.nodes.push(Node {
            id,
            position,
            shape,
            label: None,
            meta: NodeMeta::default(),
        });
        id
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), GraphError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    pub fn set_label(&mut self, id: NodeId, label: Option<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.label = label;
        Ok(())
    }

    pub fn set_meta(&mut self, id: NodeId, patch: NodeMetaPatch) -> Result<(), GraphError> {
        let meta = &mut self.node_mut(id)?.meta;
        if let Some(role) = patch.role {
            meta.role = Some(role);
        }
        if let Some(group) = patch.group {
            meta.group = Some(group);
        }
        if let Some(inputs) = patch.inputs {
            meta.inputs = inputs;
        }
        if let Some(outputs) = patch.outputs {
            meta.outputs = outputs;
        }
        Ok(())
    }

    /// Appends an edge and returns its index. Duplicate edges are allowed.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        label: Option<String>,
    ) -> Result<usize, GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop(from));
        }
        for id in [from, to] {
            if !self.contains_node(id) {
                return Err(GraphError::NodeNotFound(id));
            }
        }
        self.edges.push(Edge { from, to, label });
        Ok(self.edges.len() - 1)
    }

    pub fn set_edge_label(&mut self, index: usize, label: Option<String>) -> Result<(), GraphError> {
        let edge = self
            .edges
            .get_mut(index)
            .ok_or(GraphError::EdgeNotFound(index))?;
        edge.label = label;
        Ok(())
    }

    pub fn remove_edge(&mut self, index: usize) -> Result<Edge, GraphError> {
        if index >= self.edges.len() {
            return Err(GraphError::EdgeNotFound(index));
        }
        Ok(self.edges.remove(index))
    }

    /// Removes a node and every edge incident to it.
    ///
    /// Only reachable through the session, which repairs the execution
    /// cursor in the same call.
    pub(crate) fn remove_node(&mut self, id: NodeId) -> Result<RemovedNode, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(GraphError::NodeNotFound(id))?;
        let node = self.nodes.remove(index);
        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.from == id || e.to == id);
        self.edges = kept;
        Ok(RemovedNode {
            node,
            edges: removed,
        })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(GraphError::NodeNotFound(id))
    }
}
