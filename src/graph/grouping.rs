use super::{Graph, Node, NodeId};
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

/// Padding around member nodes when computing a group's bounding box.
const GROUP_PADDING: f64 = 48.0;

/// What to cluster nodes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// `meta.group`, then label keywords, then shape.
    #[default]
    Group,
    /// Label keywords only; everything else is `ungrouped`.
    Label,
    Shape,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A cluster of nodes sharing a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroup {
    pub id: String,
    pub title: String,
    pub node_ids: Vec<NodeId>,
    pub bbox: BoundingBox,
}

/// Clusters the nodes of `graph`. Groups appear in the order their key was first seen.
pub fn group_nodes(graph: &Graph, by: GroupBy) -> Vec<NodeGroup> {
    let mut buckets: Vec<(String, Vec<&Node>)> = Vec::new();
    for node in graph.nodes() {
        let key = group_key(node, by);
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(node),
            None => buckets.push((key, vec![node])),
        }
    }

    buckets
        .into_iter()
        .map(|(key, members)| NodeGroup {
            id: format!("g-{}", key),
            bbox: bounding_box(&members),
            node_ids: members.iter().map(|n| n.id).collect(),
            title: key,
        })
        .collect()
}

fn group_key(node: &Node, by: GroupBy) -> String {
    let explicit = match by {
        GroupBy::Group => node.meta.group.clone().filter(|g| !g.is_empty()),
        GroupBy::Label | GroupBy::Shape => None,
    };
    let heuristic = || match by {
        GroupBy::Shape => None,
        GroupBy::Group | GroupBy::Label => label_heuristic(node.label.as_deref().unwrap_or("")),
    };
    let by_shape = || match by {
        GroupBy::Label => None,
        GroupBy::Group | GroupBy::Shape => Some(node.shape.to_string()),
    };

    explicit
        .or_else(heuristic)
        .or_else(by_shape)
        .unwrap_or_else(|| "ungrouped".to_string())
}

fn label_heuristic(label: &str) -> Option<String> {
    let label = label.to_lowercase();
    let key = if label.contains("loop") {
        "loops"
    } else if label.contains("if") || label.contains("cond") {
        "conditionals"
    } else if label.contains("func") {
        "functions"
    } else {
        return None;
    };
    Some(key.to_string())
}

fn bounding_box(members: &[&Node]) -> BoundingBox {
    let (min_x, max_x) = min_max(members.iter().map(|n| n.position.x));
    let (min_y, max_y) = min_max(members.iter().map(|n| n.position.y));
    BoundingBox {
        x: min_x - GROUP_PADDING,
        y: min_y - GROUP_PADDING,
        w: (max_x - min_x) + 2.0 * GROUP_PADDING,
        h: (max_y - min_y) + 2.0 * GROUP_PADDING,
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => (0.0, 0.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(min, max) => (min, max),
    }
}
