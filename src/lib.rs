//! # Nagare - Flowchart Execution Engine
//!
//! **Nagare** is the execution core of a visual flowchart editor. A flowchart
//! is a directed graph of shaped nodes; node labels double as predicates, and
//! edges labeled `true`/`false` decide where execution goes next.
//!
//! ## Core Workflow
//!
//! 1.  **Build or load a graph**: edit a [`graph::Graph`] directly or load a
//!     [`graph::FlowchartDocument`] exported by the editor.
//! 2.  **Open a session**: a [`interpreter::Session`] bundles the graph, the
//!     JSON evaluation context, the execution cursor and wiring suggestions.
//! 3.  **Execute**: step through the graph by hand, or hand the session to a
//!     [`interpreter::Playback`] that ticks on the Tokio runtime.
//! 4.  **Wire and export**: let [`wiring`] propose edges between matching
//!     ports, then generate Cubit code with [`codegen`].
//!
//! Predicates use a small, safe expression language (see [`compiler`] and
//! [`evaluator`]). It has arithmetic, comparison and boolean operators,
//! number, string and boolean literals, and context lookups, and nothing
//! else. A predicate that fails to parse is simply false.
//!
//! ## Quick Start
//!
//! ```rust
//! use nagare::prelude::*;
//!
//! let mut session = Session::builder()
//!     .with_context_json(r#"{"x": 5}"#)
//!     .build();
//!
//! let check = session.add_node(Position::new(0.0, 0.0), Shape::Square);
//! let positive = session.add_node(Position::new(200.0, -80.0), Shape::Parallelogram);
//! let negative = session.add_node(Position::new(200.0, 80.0), Shape::Parallelogram);
//! session.set_label(check, Some("x > 0".into())).unwrap();
//! session.add_edge(check, positive, Some("true".into())).unwrap();
//! session.add_edge(check, negative, Some("false".into())).unwrap();
//!
//! assert_eq!(session.step(), StepOutcome::Entered(check));
//! session.step();
//! assert_eq!(session.current(), Some(positive));
//! ```

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod interpreter;
pub mod prelude;
pub mod trace;
pub mod wiring;
