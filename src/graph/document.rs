use super::{Edge, Graph, MAX_NODE_ID, Node};
use crate::error::DocumentError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The only document version this crate reads and writes.
pub const DOCUMENT_VERSION: &str = "1.0";

/// The exported form of a flowchart, matching the editor's JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowchartDocument {
    pub version: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_code: Option<String>,
}

impl FlowchartDocument {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            nodes: graph.nodes().to_vec(),
            edges: graph.edges().to_vec(),
            generated_code: None,
        }
    }

    pub fn with_generated_code(mut self, code: impl Into<String>) -> Self {
        self.generated_code = Some(code.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a flowchart document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Validates the document and turns it into a graph.
    ///
    /// Node ids must be unique and every edge must connect two nodes of the
    /// document. New nodes added to the graph get ids above the largest one here.
    pub fn into_graph(self) -> Result<Graph, DocumentError> {
        if self.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion(self.version));
        }

        let mut ids = AHashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.id > MAX_NODE_ID {
                return Err(DocumentError::NodeIdOutOfRange(node.id));
            }
            if !ids.insert(node.id) {
                return Err(DocumentError::DuplicateNodeId(node.id));
            }
        }
        if let Some(edge) = self
            .edges
            .iter()
            .find(|e| !ids.contains(&e.from) || !ids.contains(&e.to))
        {
            return Err(DocumentError::DanglingEdge {
                from: edge.from,
                to: edge.to,
            });
        }

        Ok(Graph::from_parts(self.nodes, self.edges))
    }
}
