use crate::graph::NodeId;
use thiserror::Error;

/// Errors that can occur while parsing a predicate.
///
/// These never escape the predicate service; a predicate that fails to parse
/// simply evaluates to `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("Expected '{expected}', but found {found}")]
    ExpectedToken { expected: String, found: String },

    #[error("Unexpected trailing token '{token}' at position {position}")]
    TrailingTokens { token: String, position: usize },

    #[error("Expression nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("Expression has {count} tokens, more than the limit of {limit}")]
    TooManyTokens { count: usize, limit: usize },
}

/// Errors returned by graph mutations that name a node or edge that does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {0} not found in the graph")]
    NodeNotFound(NodeId),

    #[error("Edge #{0} not found in the graph")]
    EdgeNotFound(usize),

    #[error("Node {0} cannot be connected to itself")]
    SelfLoop(NodeId),
}

/// Errors that can occur when loading or saving a flowchart document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse flowchart JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to access flowchart file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported flowchart document version '{0}'")]
    UnsupportedVersion(String),

    #[error("Node id {0} appears more than once in the document")]
    DuplicateNodeId(NodeId),

    #[error("Edge {from} -> {to} references a node that is not in the document")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("Node id {0} exceeds the largest supported id {max}", max = crate::graph::MAX_NODE_ID)]
    NodeIdOutOfRange(NodeId),
}

/// Errors that can occur when starting timer-driven playback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Playback requires a running Tokio runtime to schedule ticks")]
    NoRuntime,
}

/// Errors that can occur when loading an engine configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse engine configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read engine configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tick interval must be at least 1 ms")]
    ZeroTickInterval,
}
