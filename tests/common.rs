//! Common test utilities for building flowcharts and sessions.
use nagare::prelude::*;

/// Node ids of the branching fixture.
#[allow(dead_code)]
pub struct Branching {
    pub check: NodeId,
    pub positive: NodeId,
    pub negative: NodeId,
}

/// A decision node labeled `x > 0` with a `true` and a `false` branch.
///
/// Logic: `x > 0` -> positive, otherwise -> negative. Both branches are terminal.
#[allow(dead_code)]
pub fn create_branching_session(context_json: &str) -> (Session, Branching) {
    let mut session = Session::builder().with_context_json(context_json).build();
    let check = session.add_node(Position::new(0.0, 0.0), Shape::Square);
    let positive = session.add_node(Position::new(200.0, -80.0), Shape::Parallelogram);
    let negative = session.add_node(Position::new(200.0, 80.0), Shape::Parallelogram);
    session.set_label(check, Some("x > 0".into())).unwrap();
    session.set_label(positive, Some("\"positive\"".into())).unwrap();
    session.set_label(negative, Some("\"negative\"".into())).unwrap();
    session.add_edge(check, positive, Some("true".into())).unwrap();
    session.add_edge(check, negative, Some("false".into())).unwrap();
    (
        session,
        Branching {
            check,
            positive,
            negative,
        },
    )
}

/// A straight chain of `len` unlabeled circles, each linked to the next.
#[allow(dead_code)]
pub fn create_chain_session(len: usize) -> (Session, Vec<NodeId>) {
    let mut session = Session::new();
    let ids: Vec<NodeId> = (0..len)
        .map(|i| session.add_node(Position::new(i as f64 * 120.0, 0.0), Shape::Circle))
        .collect();
    for pair in ids.windows(2) {
        session.add_edge(pair[0], pair[1], None).unwrap();
    }
    (session, ids)
}

/// Two nodes whose ports line up: `producer` outputs `value:int`,
/// `consumer` takes `Value:Int`.
#[allow(dead_code)]
pub fn create_port_session(options: SuggestionOptions) -> (Session, NodeId, NodeId) {
    let config = EngineConfig {
        suggestions: options,
        ..EngineConfig::default()
    };
    let mut session = Session::builder().with_config(config).build();
    let producer = session.add_node(Position::new(0.0, 0.0), Shape::Triangle);
    let consumer = session.add_node(Position::new(200.0, 0.0), Shape::Diamond);
    session
        .set_meta(producer, NodeMetaPatch::default().outputs(["value:int"]))
        .unwrap();
    session
        .set_meta(consumer, NodeMetaPatch::default().inputs(["Value:Int"]))
        .unwrap();
    (session, producer, consumer)
}

/// A context built from `(name, number)` pairs.
#[allow(dead_code)]
pub fn context_of(pairs: &[(&str, f64)]) -> Context {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), Value::Number(*value)))
        .collect()
}
