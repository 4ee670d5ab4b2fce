//! The execution engine: a state machine that walks the flowchart one node at a time.
//!
//! The cursor is `idle` (no current node), `positioned` (a current node, not
//! running) or `running` (a current node with a periodic tick scheduled).
//! Each step evaluates the current node's predicate and follows the outgoing
//! edge whose label matches the result.

use crate::evaluator::{Context, Evaluator};
use crate::graph::{Graph, NodeId};
use serde::Serialize;

pub mod playback;
pub mod session;

pub use playback::{Playback, RunToggle};
pub use session::{Session, SessionBuilder};

const TRACING_TARGET: &str = "nagare::interpreter";

/// The interpreter's transient position in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Cursor {
    pub current: Option<NodeId>,
    pub running: bool,
}

/// The three states of the execution state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Positioned(NodeId),
    Running(NodeId),
}

/// Why an outgoing edge was (or would be) taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeChoice {
    /// The edge label matches the predicate result, case-insensitively.
    MatchesResult(bool),
    /// No label matched, so an unlabeled edge is taken.
    UnlabeledFallback,
    /// The first outgoing edge: the node has no predicate, or nothing else fit.
    DefaultPath,
}

/// An outgoing edge considered by edge selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateEdge {
    pub index: usize,
    pub to: NodeId,
    pub choice: EdgeChoice,
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cursor was idle and moved onto the first node.
    Entered(NodeId),
    /// The cursor followed an edge.
    Advanced {
        from: NodeId,
        to: NodeId,
        edge: usize,
        choice: EdgeChoice,
    },
    /// The current node has no outgoing edges; the cursor is idle again.
    Halted { at: NodeId },
    /// The graph has no nodes to start from.
    EmptyGraph,
}

/// Identifies one run of the periodic tick. Ticks carrying a token from an
/// earlier run are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

/// The execution state machine.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    cursor: Cursor,
    run_generation: u64,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn state(&self) -> ExecutionState {
        match self.cursor {
            Cursor { current: None, .. } => ExecutionState::Idle,
            Cursor {
                current: Some(id),
                running: false,
            } => ExecutionState::Positioned(id),
            Cursor {
                current: Some(id),
                running: true,
            } => ExecutionState::Running(id),
        }
    }

    pub fn is_running(&self) -> bool {
        self.cursor.running
    }

    /// Advances the cursor by one node.
    ///
    /// From idle this enters the first node of the graph. Reaching a node
    /// without outgoing edges returns to idle and ends any run.
    pub fn step(&mut self, graph: &Graph, context: &Context) -> StepOutcome {
        let Some(current) = self.cursor.current else {
            return match graph.first_node() {
                Some(first) => {
                    self.cursor.current = Some(first.id);
                    tracing::debug!(target: TRACING_TARGET, node = first.id, "Entered first node");
                    StepOutcome::Entered(first.id)
                }
                None => StepOutcome::EmptyGraph,
            };
        };

        match select_edge(graph, current, context) {
            Some(candidate) => {
                self.cursor.current = Some(candidate.to);
                tracing::debug!(
                    target: TRACING_TARGET,
                    from = current,
                    to = candidate.to,
                    edge = candidate.index,
                    choice = ?candidate.choice,
                    "Followed edge"
                );
                StepOutcome::Advanced {
                    from: current,
                    to: candidate.to,
                    edge: candidate.index,
                    choice: candidate.choice,
                }
            }
            None => {
                tracing::debug!(target: TRACING_TARGET, node = current, "Reached a node without outgoing edges");
                self.reset();
                StepOutcome::Halted { at: current }
            }
        }
    }

    /// Returns to idle and invalidates any scheduled tick.
    pub fn reset(&mut self) {
        self.cursor = Cursor::default();
        self.run_generation += 1;
    }

    /// Starts a run, entering the first node when idle.
    ///
    /// Returns `None` when already running or when there is nothing to run.
    pub fn begin_run(&mut self, graph: &Graph) -> Option<RunToken> {
        if self.cursor.running {
            return None;
        }
        if self.cursor.current.is_none() {
            self.cursor.current = Some(graph.first_node()?.id);
        }
        self.cursor.running = true;
        self.run_generation += 1;
        Some(RunToken(self.run_generation))
    }

    /// Stops a run without moving the cursor. Returns whether a run was active.
    pub fn end_run(&mut self) -> bool {
        let was_running = self.cursor.running;
        self.cursor.running = false;
        self.run_generation += 1;
        was_running
    }

    /// Whether `token` belongs to the run in progress.
    pub fn is_current_run(&self, token: RunToken) -> bool {
        self.cursor.running && self.run_generation == token.0
    }

    /// One periodic tick: the same transition as [`Interpreter::step`], but
    /// only for the run identified by `token`.
    pub fn tick(&mut self, token: RunToken, graph: &Graph, context: &Context) -> Option<StepOutcome> {
        if !self.is_current_run(token) {
            return None;
        }
        Some(self.step(graph, context))
    }

    /// Repairs the cursor after `node` was removed from the graph.
    /// Returns whether the cursor had to be reset.
    pub(crate) fn node_removed(&mut self, node: NodeId) -> bool {
        if self.cursor.current == Some(node) {
            self.reset();
            return true;
        }
        false
    }
}

/// Picks the outgoing edge of `node` to follow.
///
/// With a predicate, the first edge labeled like the result (`"true"` or
/// `"false"`, any case) wins, then the first unlabeled edge, then the first
/// edge. Without a predicate the first edge is taken. `None` means the node
/// has no outgoing edges.
pub fn select_edge(graph: &Graph, node: NodeId, context: &Context) -> Option<CandidateEdge> {
    candidate_edges(graph, node, context).into_iter().next()
}

/// Every outgoing edge of `focus` that edge selection would consider, with
/// the reason. Selection takes the first one.
pub fn candidate_edges(graph: &Graph, focus: NodeId, context: &Context) -> Vec<CandidateEdge> {
    let Some(node) = graph.node(focus) else {
        return Vec::new();
    };
    let outs: Vec<_> = graph.outgoing(focus).collect();
    let Some(&(first_index, first_edge)) = outs.first() else {
        return Vec::new();
    };
    let default_path = vec![CandidateEdge {
        index: first_index,
        to: first_edge.to,
        choice: EdgeChoice::DefaultPath,
    }];

    let Some(predicate) = node.predicate() else {
        return default_path;
    };

    let result = Evaluator::evaluate_predicate_safe(predicate, context);
    let expected = if result { "true" } else { "false" };

    let matching: Vec<_> = outs
        .iter()
        .filter(|(_, edge)| edge.label_matches(expected))
        .map(|&(index, edge)| CandidateEdge {
            index,
            to: edge.to,
            choice: EdgeChoice::MatchesResult(result),
        })
        .collect();
    if !matching.is_empty() {
        return matching;
    }

    let unlabeled: Vec<_> = outs
        .iter()
        .filter(|(_, edge)| edge.is_unlabeled())
        .map(|&(index, edge)| CandidateEdge {
            index,
            to: edge.to,
            choice: EdgeChoice::UnlabeledFallback,
        })
        .collect();
    if !unlabeled.is_empty() {
        return unlabeled;
    }

    default_path
}
