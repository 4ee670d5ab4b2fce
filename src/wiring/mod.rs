//! Port auto-wiring: proposes edges from declared output ports to matching input ports.

use crate::graph::{Graph, NodeId, PortSpec};
use ahash::AHashSet;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

const TRACING_TARGET: &str = "nagare::wiring";

/// How port names and types are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionOptions {
    /// Lowercase names and strip everything outside `[a-z0-9_]` before comparing.
    pub normalize: bool,
    /// When both ports declare a type, require the types to be equal.
    ///
    /// Types are always compared exactly, case included, even with `normalize` on.
    pub strict_types: bool,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            strict_types: false,
        }
    }
}

/// Identifier of a pending suggestion, unique within one [`SuggestionBoard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SuggestionId(pub u64);

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s-{}", self.0)
    }
}

/// A candidate edge awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: SuggestionId,
    pub from: NodeId,
    pub to: NodeId,
    /// The matched output port name, as written on the source node.
    pub port_name: String,
    pub from_type: Option<String>,
    pub to_type: Option<String>,
    pub selected: bool,
}

/// Which pending suggestions to turn into edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyScope {
    All,
    Selected,
}

/// A suggestion before it is given an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMatch {
    pub from: NodeId,
    pub to: NodeId,
    pub port_name: String,
    pub from_type: Option<String>,
    pub to_type: Option<String>,
}

fn normalize_name(name: &str, options: &SuggestionOptions) -> String {
    if options.normalize {
        name.to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
            .collect()
    } else {
        name.to_string()
    }
}

fn types_compatible(output: &PortSpec, input: &PortSpec, options: &SuggestionOptions) -> bool {
    match (&output.port_type, &input.port_type) {
        (Some(out_type), Some(in_type)) if options.strict_types => out_type == in_type,
        _ => true,
    }
}

/// Scans every ordered pair of distinct nodes for output → input port matches.
///
/// A match is skipped when an edge `(from, to, port name)` already exists, and
/// each `(from, to, port name)` triple is reported at most once. The graph is
/// not modified.
pub fn find_port_matches(graph: &Graph, options: &SuggestionOptions) -> Vec<PortMatch> {
    let mut matches = Vec::new();
    let mut seen: AHashSet<(NodeId, NodeId, String)> = AHashSet::new();

    for (from_node, to_node) in iproduct!(graph.nodes(), graph.nodes()) {
        if from_node.id == to_node.id
            || from_node.meta.outputs.is_empty()
            || to_node.meta.inputs.is_empty()
        {
            continue;
        }
        for (out_spec, in_spec) in iproduct!(&from_node.meta.outputs, &to_node.meta.inputs) {
            let output = PortSpec::parse(out_spec);
            let input = PortSpec::parse(in_spec);
            if output.name.is_empty() || input.name.is_empty() {
                continue;
            }

            if graph.has_edge(from_node.id, to_node.id, &output.name) {
                continue;
            }
            if normalize_name(&output.name, options) != normalize_name(&input.name, options) {
                continue;
            }
            if !types_compatible(&output, &input, options) {
                continue;
            }
            if !seen.insert((from_node.id, to_node.id, output.name.clone())) {
                continue;
            }

            matches.push(PortMatch {
                from: from_node.id,
                to: to_node.id,
                port_name: output.name,
                from_type: output.port_type,
                to_type: input.port_type,
            });
        }
    }

    tracing::debug!(
        target: TRACING_TARGET,
        nodes = graph.nodes().len(),
        matches = matches.len(),
        normalize = options.normalize,
        strict_types = options.strict_types,
        "Port scan finished"
    );
    matches
}

/// The pending suggestion list of one editing session.
#[derive(Debug, Clone, Default)]
pub struct SuggestionBoard {
    pending: Vec<Suggestion>,
    next_id: u64,
}

impl SuggestionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending list with a fresh scan of `graph`. Every
    /// suggestion starts out selected.
    pub fn compute(&mut self, graph: &Graph, options: &SuggestionOptions) -> &[Suggestion] {
        let matches = find_port_matches(graph, options);
        self.pending = matches
            .into_iter()
            .map(|m| {
                self.next_id += 1;
                Suggestion {
                    id: SuggestionId(self.next_id),
                    from: m.from,
                    to: m.to,
                    port_name: m.port_name,
                    from_type: m.from_type,
                    to_type: m.to_type,
                    selected: true,
                }
            })
            .collect();
        &self.pending
    }

    pub fn pending(&self) -> &[Suggestion] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Flips the `selected` flag. Returns the new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: SuggestionId) -> Option<bool> {
        let suggestion = self.pending.iter_mut().find(|s| s.id == id)?;
        suggestion.selected = !suggestion.selected;
        Some(suggestion.selected)
    }

    /// Removes and returns the suggestions in `scope`, leaving the rest pending.
    pub fn take(&mut self, scope: ApplyScope) -> Vec<Suggestion> {
        let (taken, kept): (Vec<Suggestion>, Vec<Suggestion>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|s| scope == ApplyScope::All || s.selected);
        self.pending = kept;
        taken
    }

    /// Drops every suggestion that starts or ends at `node`.
    pub fn forget_node(&mut self, node: NodeId) {
        self.pending.retain(|s| s.from != node && s.to != node);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_punctuation() {
        let options = SuggestionOptions::default();
        assert_eq!(normalize_name("User-Name!", &options), "username");
        assert_eq!(normalize_name("max_2", &options), "max_2");

        let raw = SuggestionOptions {
            normalize: false,
            ..options
        };
        assert_eq!(normalize_name("User-Name", &raw), "User-Name");
    }

    #[test]
    fn untyped_ports_are_always_compatible() {
        let strict = SuggestionOptions {
            normalize: true,
            strict_types: true,
        };
        let typed = PortSpec::parse("v:int");
        let untyped = PortSpec::parse("v");
        assert!(types_compatible(&typed, &untyped, &strict));
        assert!(!types_compatible(&typed, &PortSpec::parse("v:Int"), &strict));
    }
}
