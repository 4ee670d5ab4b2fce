//! Renders a flowchart as Cubit source text.
//!
//! The walk starts at the first node and visits every reachable node once.
//! Circles become `while` loops, squares become `if`/`else` on their
//! `true`/`false` edges, and the other shapes emit a statement and continue
//! along all outgoing edges.

use crate::graph::{Graph, Node, NodeId, Shape};
use ahash::AHashSet;
use itertools::Itertools;

const INDENT: &str = "  ";

/// Generates Cubit code for the whole graph.
pub fn generate(graph: &Graph) -> String {
    let Some(start) = graph.first_node() else {
        return "# No flowchart nodes defined".to_string();
    };

    let mut generator = CodeGenerator::new(graph);
    generator.push_header();
    generator.emit_from(start.id);
    generator.lines.join("\n")
}

struct CodeGenerator<'a> {
    graph: &'a Graph,
    visited: AHashSet<NodeId>,
    lines: Vec<String>,
}

impl<'a> CodeGenerator<'a> {
    fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            visited: AHashSet::new(),
            lines: Vec::new(),
        }
    }

    fn push_header(&mut self) {
        self.lines.push("# Auto-generated from flowchart".to_string());
        self.lines.push(String::new());
        self.lines.push("# Variable initialization".to_string());

        let graph = self.graph;
        let variables = graph
            .nodes()
            .iter()
            .flat_map(|node| &node.meta.inputs)
            .filter_map(|spec| spec.split(':').next())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unique();
        for name in variables {
            self.lines.push(format!("let {name} = 0"));
        }
        self.lines.push(String::new());
    }

    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", INDENT.repeat(depth), text.as_ref()));
    }

    /// Walks the graph depth-first from `start`. Pending work lives on an
    /// explicit stack, so long chains do not grow the call stack.
    fn emit_from(&mut self, start: NodeId) {
        let mut pending = vec![Step::Visit(start, 0)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Line(depth, text) => self.line(depth, text),
                Step::Visit(id, depth) => {
                    let follow = self.emit_node(id, depth);
                    pending.extend(follow.into_iter().rev());
                }
            }
        }
    }

    /// Emits the lines that open `id` and returns what follows them, in order.
    fn emit_node(&mut self, id: NodeId, depth: usize) -> Vec<Step> {
        let mut follow = Vec::new();
        if !self.visited.insert(id) {
            return follow;
        }
        let graph = self.graph;
        let Some(node) = graph.node(id) else {
            return follow;
        };
        let label = label_of(node);
        let visit_all = move |depth: usize| {
            graph
                .outgoing(id)
                .map(move |(_, edge)| Step::Visit(edge.to, depth))
        };

        match node.shape {
            Shape::Circle => {
                self.line(depth, format!("# Loop node: {}", label.unwrap_or("loop")));
                if let Some(condition) = label {
                    self.line(depth, format!("while {condition} {{"));
                    follow.extend(visit_all(depth + 1));
                    follow.push(Step::Line(depth, "}".to_string()));
                }
            }
            Shape::Square => {
                self.line(depth, "# Conditional node");
                if let Some(condition) = label {
                    self.line(depth, format!("if {condition} {{"));
                    let branch = |expected: &str| {
                        graph
                            .outgoing(id)
                            .find(|(_, edge)| edge.label_matches(expected))
                            .map(|(_, edge)| edge.to)
                    };
                    if let Some(target) = branch("true") {
                        follow.push(Step::Visit(target, depth + 1));
                    }
                    if let Some(target) = branch("false") {
                        follow.push(Step::Line(depth, "} else {".to_string()));
                        follow.push(Step::Visit(target, depth + 1));
                    }
                    follow.push(Step::Line(depth, "}".to_string()));
                }
            }
            Shape::Triangle => {
                self.line(depth, format!("# Function: {}", label.unwrap_or("function")));
                if let Some(name) = label {
                    self.line(depth, format!("print \"{name}\""));
                }
                follow.extend(visit_all(depth));
            }
            Shape::Diamond => {
                self.line(depth, "# Decision/Assignment");
                if let Some(statement) = label {
                    self.line(depth, statement);
                }
                follow.extend(visit_all(depth));
            }
            Shape::Parallelogram => {
                self.line(depth, "# Input/Output");
                if let Some(expression) = label {
                    self.line(depth, format!("print {expression}"));
                }
                follow.extend(visit_all(depth));
            }
            Shape::Hexagon => follow.extend(visit_all(depth)),
        }
        follow
    }
}

enum Step {
    Visit(NodeId, usize),
    Line(usize, String),
}

fn label_of(node: &Node) -> Option<&str> {
    node.label.as_deref().filter(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;

    #[test]
    fn empty_graph_has_placeholder() {
        assert_eq!(generate(&Graph::new()), "# No flowchart nodes defined");
    }

    #[test]
    fn hexagon_only_walks_on() {
        let mut graph = Graph::new();
        let hub = graph.add_node(Position::default(), Shape::Hexagon);
        let io = graph.add_node(Position::default(), Shape::Parallelogram);
        graph.set_label(io, Some("x".into())).unwrap();
        graph.add_edge(hub, io, None).unwrap();

        let code = generate(&graph);
        assert!(code.ends_with("# Input/Output\nprint x"), "{code}");
    }

    #[test]
    fn long_chain_does_not_exhaust_the_stack() {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (0..10_000)
            .map(|_| graph.add_node(Position::default(), Shape::Parallelogram))
            .collect();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1], None).unwrap();
        }

        let code = generate(&graph);
        assert_eq!(code.matches("# Input/Output").count(), ids.len());
    }
}
