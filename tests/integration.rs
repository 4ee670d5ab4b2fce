//! End-to-end tests for execution, cascading deletes and port wiring.
mod common;
use common::*;
use nagare::prelude::*;

#[test]
fn test_true_branch_is_followed() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    assert_eq!(session.step(), StepOutcome::Entered(ids.check));
    assert_eq!(
        session.step(),
        StepOutcome::Advanced {
            from: ids.check,
            to: ids.positive,
            edge: 0,
            choice: EdgeChoice::MatchesResult(true),
        }
    );
}

#[test]
fn test_false_branch_is_followed() {
    let (mut session, ids) = create_branching_session(r#"{"x": -1}"#);
    session.step();
    session.step();
    assert_eq!(session.current(), Some(ids.negative));
}

#[test]
fn test_branch_labels_are_case_insensitive() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    session.set_edge_label(0, Some("TRUE".into())).unwrap();
    session.step();
    session.step();
    assert_eq!(session.current(), Some(ids.positive));
}

#[test]
fn test_context_changes_apply_to_next_step() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    session.step();
    session.set_context_json(r#"{"x": 0}"#);
    session.step();
    assert_eq!(session.current(), Some(ids.negative));
}

#[test]
fn test_malformed_context_behaves_as_empty() {
    let (mut session, ids) = create_branching_session("{oops");
    session.step();
    session.step();
    assert_eq!(session.current(), Some(ids.negative));
}

#[test]
fn test_unlabeled_edge_is_the_fallback() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    // Only a false branch and an unlabeled edge remain.
    session.delete_edge(0).unwrap();
    session.add_edge(ids.check, ids.positive, None).unwrap();
    session.step();
    assert_eq!(
        session.step(),
        StepOutcome::Advanced {
            from: ids.check,
            to: ids.positive,
            edge: 1,
            choice: EdgeChoice::UnlabeledFallback,
        }
    );
}

#[test]
fn test_first_edge_when_nothing_matches() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    session.set_edge_label(0, Some("yes".into())).unwrap();
    session.set_edge_label(1, Some("no".into())).unwrap();
    session.step();
    let outcome = session.step();
    assert!(matches!(
        outcome,
        StepOutcome::Advanced {
            to,
            choice: EdgeChoice::DefaultPath,
            ..
        } if to == ids.positive
    ));
}

#[test]
fn test_unparsable_predicate_takes_false_branch() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    session.set_label(ids.check, Some("((x".into())).unwrap();
    session.step();
    session.step();
    assert_eq!(session.current(), Some(ids.negative));
}

#[test]
fn test_terminal_node_halts_and_returns_to_idle() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    session.step();
    session.step();
    assert_eq!(session.step(), StepOutcome::Halted { at: ids.positive });
    assert_eq!(session.state(), ExecutionState::Idle);
    // Stepping from idle starts over.
    assert_eq!(session.step(), StepOutcome::Entered(ids.check));
}

#[test]
fn test_empty_graph_cannot_step_or_run() {
    let mut session = Session::new();
    assert_eq!(session.step(), StepOutcome::EmptyGraph);
    assert_eq!(session.state(), ExecutionState::Idle);
    assert!(!session.is_running());
}

#[test]
fn test_reset_returns_to_idle() {
    let (mut session, ids) = create_chain_session(3);
    session.step();
    session.step();
    assert_eq!(session.current(), Some(ids[1]));
    session.reset();
    assert_eq!(session.cursor(), Cursor::default());
}

#[test]
fn test_cascading_delete_of_current_node() {
    let (mut session, ids) = create_chain_session(3);
    session.step();
    session.step();
    assert_eq!(session.state(), ExecutionState::Positioned(ids[1]));

    let removed = session.delete_node(ids[1]).unwrap();
    assert_eq!(removed.edges.len(), 2);
    assert!(session.graph().edges().is_empty());
    assert_eq!(session.state(), ExecutionState::Idle);
    assert_eq!(session.step(), StepOutcome::Entered(ids[0]));
}

#[test]
fn test_session_never_runs_without_playback() {
    let (session, ids) = create_chain_session(3);
    let playback = Playback::new(session);
    // A closure over the session can step it but cannot start a run.
    playback.with_session(|s| {
        s.step();
        s.step();
    });
    assert_eq!(
        playback.cursor(),
        Cursor {
            current: Some(ids[1]),
            running: false
        }
    );
    assert!(!playback.is_running());
}

#[test]
fn test_delete_unknown_node_is_an_error() {
    let (mut session, _) = create_chain_session(2);
    assert_eq!(session.delete_node(42), Err(GraphError::NodeNotFound(42)));
    assert_eq!(session.graph().nodes().len(), 2);
}

#[test]
fn test_node_ids_are_never_reused() {
    let (mut session, ids) = create_chain_session(2);
    session.delete_node(ids[1]).unwrap();
    let fresh = session.add_node(Position::default(), Shape::Hexagon);
    assert!(fresh > ids[1]);
}

#[test]
fn test_candidate_edges_for_selection() {
    let (mut session, ids) = create_branching_session(r#"{"x": 5}"#);
    session.select(Some(ids.check)).unwrap();
    let candidates = session.candidate_edges();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].to, ids.positive);
    assert_eq!(candidates[0].choice, EdgeChoice::MatchesResult(true));

    session.delete_node(ids.check).unwrap();
    assert_eq!(session.selected(), None);
}

#[test]
fn test_suggestions_respect_normalization() {
    let (mut session, producer, consumer) = create_port_session(SuggestionOptions::default());
    let suggestions = session.compute_suggestions();
    assert_eq!(suggestions.len(), 1);
    let suggestion = &suggestions[0];
    assert_eq!((suggestion.from, suggestion.to), (producer, consumer));
    assert_eq!(suggestion.port_name, "value");
    assert_eq!(suggestion.from_type.as_deref(), Some("int"));
    assert_eq!(suggestion.to_type.as_deref(), Some("Int"));
    assert!(suggestion.selected);
}

#[test]
fn test_strict_types_compare_case_sensitively() {
    let (mut session, _, _) = create_port_session(SuggestionOptions {
        normalize: true,
        strict_types: true,
    });
    assert!(session.compute_suggestions().is_empty());
}

#[test]
fn test_raw_names_must_match_exactly() {
    let (mut session, _, _) = create_port_session(SuggestionOptions {
        normalize: false,
        strict_types: false,
    });
    assert!(session.compute_suggestions().is_empty());
}

#[test]
fn test_suggestions_are_idempotent_and_read_only() {
    let (mut session, _, _) = create_port_session(SuggestionOptions::default());
    let first: Vec<_> = session
        .compute_suggestions()
        .iter()
        .map(|s| (s.from, s.to, s.port_name.clone()))
        .collect();
    let second: Vec<_> = session
        .compute_suggestions()
        .iter()
        .map(|s| (s.from, s.to, s.port_name.clone()))
        .collect();
    assert_eq!(first, second);
    assert!(session.graph().edges().is_empty());
}

#[test]
fn test_applied_suggestions_are_not_proposed_again() {
    let (mut session, producer, consumer) = create_port_session(SuggestionOptions::default());
    session.compute_suggestions();
    assert_eq!(session.apply_suggestions(ApplyScope::All), 1);
    assert!(session.suggestions().is_empty());

    let edge = &session.graph().edges()[0];
    assert_eq!((edge.from, edge.to), (producer, consumer));
    assert_eq!(edge.label.as_deref(), Some("value"));

    assert!(session.compute_suggestions().is_empty());
}

#[test]
fn test_apply_selected_only() {
    let (mut session, producer, _) = create_port_session(SuggestionOptions::default());
    let other = session.add_node(Position::new(0.0, 200.0), Shape::Diamond);
    session
        .set_meta(other, NodeMetaPatch::default().inputs(["value"]))
        .unwrap();

    let ids: Vec<SuggestionId> = session.compute_suggestions().iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(session.toggle_suggestion(ids[1]), Some(false));

    assert_eq!(session.apply_suggestions(ApplyScope::Selected), 1);
    assert_eq!(session.suggestions().len(), 1);
    assert!(!session.suggestions()[0].selected);
    assert_eq!(session.graph().edges()[0].from, producer);
}

#[test]
fn test_deleting_node_drops_its_suggestions() {
    let (mut session, _, consumer) = create_port_session(SuggestionOptions::default());
    session.compute_suggestions();
    session.delete_node(consumer).unwrap();
    assert!(session.suggestions().is_empty());
    assert_eq!(session.apply_suggestions(ApplyScope::All), 0);
}

#[test]
fn test_duplicate_ports_are_reported_once() {
    let (mut session, producer, consumer) = create_port_session(SuggestionOptions::default());
    session
        .set_meta(producer, NodeMetaPatch::default().outputs(["value:int", "value:int"]))
        .unwrap();
    session
        .set_meta(consumer, NodeMetaPatch::default().inputs(["value", "VALUE"]))
        .unwrap();
    assert_eq!(session.compute_suggestions().len(), 1);
}
