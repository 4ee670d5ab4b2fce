use super::{CandidateEdge, Cursor, ExecutionState, Interpreter, RunToken, StepOutcome, TRACING_TARGET};
use crate::codegen;
use crate::config::EngineConfig;
use crate::error::GraphError;
use crate::evaluator::Context;
use crate::graph::{
    Edge, FlowchartDocument, Graph, GroupBy, NodeGroup, NodeId, NodeMetaPatch, Position,
    RemovedNode, Shape, group_nodes,
};
use crate::wiring::{ApplyScope, Suggestion, SuggestionBoard, SuggestionId, SuggestionOptions};

/// Builds a [`Session`] from an optional starting graph, configuration and context.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    graph: Graph,
    config: EngineConfig,
    context_source: String,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the raw context JSON. It is parsed leniently on every evaluation.
    pub fn with_context_json(mut self, source: impl Into<String>) -> Self {
        self.context_source = source.into();
        self
    }

    pub fn build(self) -> Session {
        Session {
            graph: self.graph,
            interpreter: Interpreter::new(),
            suggestions: SuggestionBoard::new(),
            context_source: self.context_source,
            config: self.config,
            selected: None,
        }
    }
}

/// One editing session: the graph, the execution cursor and the pending
/// wiring suggestions, kept consistent with each other.
///
/// Every mutation that can invalidate the cursor or a suggestion repairs it
/// before returning.
///
/// A session only runs under [`Playback`](super::Playback), which owns the
/// tick timer. On its own it steps manually:
///
/// ```compile_fail
/// let mut session = nagare::prelude::Session::new();
/// session.begin_run();
/// ```
#[derive(Debug)]
pub struct Session {
    graph: Graph,
    interpreter: Interpreter,
    suggestions: SuggestionBoard,
    context_source: String,
    config: EngineConfig,
    selected: Option<NodeId>,
}

impl Default for Session {
    fn default() -> Self {
        SessionBuilder::new().build()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cursor(&self) -> Cursor {
        self.interpreter.cursor()
    }

    pub fn state(&self) -> ExecutionState {
        self.interpreter.state()
    }

    pub fn current(&self) -> Option<NodeId> {
        self.interpreter.cursor().current
    }

    pub fn is_running(&self) -> bool {
        self.interpreter.is_running()
    }

    // --- Context ---

    pub fn context_source(&self) -> &str {
        &self.context_source
    }

    pub fn set_context_json(&mut self, source: impl Into<String>) {
        self.context_source = source.into();
    }

    /// The current context, re-read from the raw JSON text.
    pub fn context(&self) -> Context {
        Context::from_json_lenient(&self.context_source)
    }

    // --- Graph editing ---

    pub fn add_node(&mut self, position: Position, shape: Shape) -> NodeId {
        self.graph.add_node(position, shape)
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), GraphError> {
        self.graph.move_node(id, position)
    }

    pub fn set_label(&mut self, id: NodeId, label: Option<String>) -> Result<(), GraphError> {
        self.graph.set_label(id, label)
    }

    pub fn set_meta(&mut self, id: NodeId, patch: NodeMetaPatch) -> Result<(), GraphError> {
        self.graph.set_meta(id, patch)
    }

    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        label: Option<String>,
    ) -> Result<usize, GraphError> {
        self.graph.add_edge(from, to, label)
    }

    pub fn set_edge_label(&mut self, index: usize, label: Option<String>) -> Result<(), GraphError> {
        self.graph.set_edge_label(index, label)
    }

    pub fn delete_edge(&mut self, index: usize) -> Result<Edge, GraphError> {
        self.graph.remove_edge(index)
    }

    /// Deletes a node and every edge touching it.
    ///
    /// If the cursor was on the node it returns to idle and any run stops.
    /// Selection and pending suggestions that refer to the node are dropped.
    pub fn delete_node(&mut self, id: NodeId) -> Result<RemovedNode, GraphError> {
        let removed = self.graph.remove_node(id)?;
        let cursor_reset = self.interpreter.node_removed(id);
        self.suggestions.forget_node(id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(
            target: TRACING_TARGET,
            node = id,
            edges = removed.edges.len(),
            cursor_reset,
            "Deleted node"
        );
        Ok(removed)
    }

    // --- Selection and edge inspection ---

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<NodeId>) -> Result<(), GraphError> {
        if let Some(id) = id.filter(|id| !self.graph.contains_node(*id)) {
            return Err(GraphError::NodeNotFound(id));
        }
        self.selected = id;
        Ok(())
    }

    /// The outgoing edges of the selected node, or of the current node when
    /// nothing is selected, that the next step would consider.
    pub fn candidate_edges(&self) -> Vec<CandidateEdge> {
        self.selected
            .or(self.current())
            .map(|focus| super::candidate_edges(&self.graph, focus, &self.context()))
            .unwrap_or_default()
    }

    // --- Execution ---

    pub fn step(&mut self) -> StepOutcome {
        let context = self.context();
        self.interpreter.step(&self.graph, &context)
    }

    pub fn reset(&mut self) {
        self.interpreter.reset();
    }

    /// Marks the session as running. See [`Interpreter::begin_run`].
    pub(crate) fn begin_run(&mut self) -> Option<RunToken> {
        let token = self.interpreter.begin_run(&self.graph);
        if token.is_some() {
            tracing::debug!(target: TRACING_TARGET, current = ?self.current(), "Run started");
        }
        token
    }

    pub(crate) fn end_run(&mut self) -> bool {
        let was_running = self.interpreter.end_run();
        if was_running {
            tracing::debug!(target: TRACING_TARGET, current = ?self.current(), "Run stopped");
        }
        was_running
    }

    /// A periodic tick of the run identified by `token`; `None` when that run is over.
    pub(crate) fn tick(&mut self, token: RunToken) -> Option<StepOutcome> {
        let context = self.context();
        self.interpreter.tick(token, &self.graph, &context)
    }

    // --- Wiring suggestions ---

    pub fn suggestions(&self) -> &[Suggestion] {
        self.suggestions.pending()
    }

    /// Rescans the graph with the configured options, replacing pending suggestions.
    pub fn compute_suggestions(&mut self) -> &[Suggestion] {
        let options = self.config.suggestions;
        self.compute_suggestions_with(options)
    }

    pub fn compute_suggestions_with(&mut self, options: SuggestionOptions) -> &[Suggestion] {
        self.suggestions.compute(&self.graph, &options)
    }

    pub fn toggle_suggestion(&mut self, id: SuggestionId) -> Option<bool> {
        self.suggestions.toggle(id)
    }

    /// Turns suggestions into edges labeled with the port name and removes
    /// them from the pending list. Returns the number of edges added.
    ///
    /// Suggestions whose nodes are gone, or whose edge already exists, are
    /// discarded without adding anything.
    pub fn apply_suggestions(&mut self, scope: ApplyScope) -> usize {
        let taken = self.suggestions.take(scope);
        let considered = taken.len();
        let mut added = 0;
        for suggestion in taken {
            if self
                .graph
                .has_edge(suggestion.from, suggestion.to, &suggestion.port_name)
            {
                continue;
            }
            match self
                .graph
                .add_edge(suggestion.from, suggestion.to, Some(suggestion.port_name))
            {
                Ok(_) => added += 1,
                Err(err) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        suggestion = %suggestion.id,
                        error = %err,
                        "Skipped stale suggestion"
                    );
                }
            }
        }
        tracing::debug!(target: TRACING_TARGET, ?scope, considered, added, "Applied suggestions");
        added
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
    }

    // --- Views ---

    pub fn groups(&self, by: GroupBy) -> Vec<NodeGroup> {
        group_nodes(&self.graph, by)
    }

    pub fn generate_code(&self) -> String {
        codegen::generate(&self.graph)
    }

    /// The document form of the graph, including generated code.
    pub fn to_document(&self) -> FlowchartDocument {
        FlowchartDocument::from_graph(&self.graph).with_generated_code(self.generate_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Session, NodeId, NodeId) {
        let mut session = Session::new();
        let a = session.add_node(Position::new(0.0, 0.0), Shape::Circle);
        let b = session.add_node(Position::new(100.0, 0.0), Shape::Square);
        session.add_edge(a, b, None).unwrap();
        (session, a, b)
    }

    #[test]
    fn deleting_current_node_resets_cursor() {
        let (mut session, a, b) = chain();
        assert_eq!(session.step(), StepOutcome::Entered(a));
        session.step();
        assert_eq!(session.current(), Some(b));

        session.delete_node(b).unwrap();
        assert_eq!(session.state(), ExecutionState::Idle);
        assert!(session.graph().edges().is_empty());
    }

    #[test]
    fn deleting_other_node_keeps_cursor() {
        let (mut session, a, b) = chain();
        session.step();
        session.delete_node(b).unwrap();
        assert_eq!(session.current(), Some(a));
    }

    #[test]
    fn stale_run_token_is_ignored() {
        let (mut session, a, _) = chain();
        let token = session.begin_run().unwrap();
        session.end_run();
        assert_eq!(session.tick(token), None);
        assert_eq!(session.current(), Some(a));
    }

    #[test]
    fn deleting_current_node_ends_run() {
        let (mut session, _, b) = chain();
        session.step();
        session.step();
        let token = session.begin_run().unwrap();
        assert_eq!(session.state(), ExecutionState::Running(b));

        session.delete_node(b).unwrap();
        assert_eq!(session.state(), ExecutionState::Idle);
        assert_eq!(session.tick(token), None);
        assert_eq!(session.current(), None);
    }

    #[test]
    fn empty_session_cannot_run() {
        let mut session = Session::new();
        assert!(session.begin_run().is_none());
        assert!(!session.is_running());
    }

    #[test]
    fn selecting_unknown_node_fails() {
        let (mut session, _, _) = chain();
        assert_eq!(session.select(Some(99)), Err(GraphError::NodeNotFound(99)));
    }
}
