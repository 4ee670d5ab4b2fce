//! Prelude module for convenient imports
//!
//! Re-exports the types most hosts need to build a graph, run it and wire it.
//!
//! # Example
//!
//! ```rust,no_run
//! use nagare::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let document = FlowchartDocument::from_file("path/to/flowchart.json")?;
//! let mut session = Session::builder()
//!     .with_graph(document.into_graph()?)
//!     .with_context_json(r#"{"x": 1}"#)
//!     .build();
//!
//! for _ in 0..64 {
//!     if let StepOutcome::Halted { .. } | StepOutcome::EmptyGraph = session.step() {
//!         break;
//!     }
//! }
//! println!("{}", session.generate_code());
//! # Ok(())
//! # }
//! ```

// Predicates
pub use crate::ast::{EvaluationTrace, Expression, Value};
pub use crate::compiler::compile;
pub use crate::evaluator::{Context, Evaluator, Explanation};
pub use crate::trace::TraceFormatter;

// Graph model
pub use crate::graph::{
    Edge, FlowchartDocument, Graph, GroupBy, Node, NodeId, NodeMetaPatch, Position, Shape,
};

// Execution
pub use crate::config::EngineConfig;
pub use crate::interpreter::{
    CandidateEdge, Cursor, EdgeChoice, ExecutionState, Playback, RunToggle, Session,
    StepOutcome,
};

// Wiring
pub use crate::wiring::{ApplyScope, Suggestion, SuggestionId, SuggestionOptions};

// Error types
pub use crate::error::{ConfigError, DocumentError, GraphError, ParseError, PlaybackError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
