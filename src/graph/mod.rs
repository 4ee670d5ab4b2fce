//! The flowchart data model: nodes, edges and the operations on them.

pub mod document;
pub mod grouping;
pub mod model;
pub mod ports;

pub use document::{DOCUMENT_VERSION, FlowchartDocument};
pub use grouping::{BoundingBox, GroupBy, NodeGroup, group_nodes};
pub use model::*;
pub use ports::{PortSpec, parse_port_list};
