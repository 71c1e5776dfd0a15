//! Unit tests for state graph validation
//! Tests dangling transitions, reserved labels, reachability and strict mode

mod common;

use common::{CallLog, RecordingStore, ScriptedHandler, Trail};
use journey_core::{
    EngineConfiguration, ErrorKind, FsmEngine, FsmState, GraphValidator, StateGraph,
};

/// Helper to create a state with a silent handler
fn state(name: &str) -> FsmState<Trail> {
    FsmState::new(name, ScriptedHandler::new(name, &CallLog::default()))
}

#[test]
fn test_validate_simple_valid_graph() {
    let graph = StateGraph::build(
        state("start").on("go", "middle"),
        vec![
            state("middle").on("go", "end").on("back", "start"),
            state("end"),
        ],
    )
    .unwrap();

    let result = GraphValidator::validate(&graph);
    assert!(result.is_valid(), "errors: {}", result.error_summary());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn test_dangling_transition_is_error() {
    let graph = StateGraph::build(
        state("start").on("go", "middle"),
        vec![state("middle").on("go", "missing"), state("end")],
    )
    .unwrap();

    let result = GraphValidator::validate(&graph);
    assert!(!result.is_valid());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "states.middle.events.go");
    assert!(result.errors[0].message.contains("'missing' not found"));
}

#[test]
fn test_initial_name_collision_is_error() {
    let graph = StateGraph::build(
        state("start").on("go", "end"),
        vec![state("start").on("loop", "start"), state("end")],
    )
    .unwrap();

    assert!(graph.initial_state_shadows_other());
    let result = GraphValidator::validate(&graph);
    assert!(!result.is_valid());
    assert!(result.errors[0].message.contains("shares its name"));
    // The initial definition wins
    assert!(graph.state("start").unwrap().transition_for("go").is_some());
}

#[test]
fn test_reserved_labels_warn() {
    let graph = StateGraph::build(
        state("start")
            .on("go", "end")
            .on("resume", "end")
            .on("transition_complete", "end"),
        vec![state("end")],
    )
    .unwrap();

    let result = GraphValidator::validate(&graph);
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 2);
    assert!(result
        .warnings
        .iter()
        .all(|w| w.contains("reserved event")));
}

#[test]
fn test_back_label_is_allowed() {
    let graph = StateGraph::build(
        state("start").on("go", "form"),
        vec![state("form").on("back", "start").on("go", "end"), state("end")],
    )
    .unwrap();

    let result = GraphValidator::validate(&graph);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn test_duplicate_label_warns() {
    let graph = StateGraph::build(
        state("start").on("go", "a").on("go", "end"),
        vec![state("a").on("go", "end"), state("end")],
    )
    .unwrap();

    let result = GraphValidator::validate(&graph);
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("declares event 'go' more than once")));
}

#[test]
fn test_detect_unreachable_states() {
    let graph = StateGraph::build(
        state("start").on("go", "middle"),
        vec![
            state("middle").on("go", "middle"),
            state("orphan").on("go", "end"),
            state("end"),
        ],
    )
    .unwrap();

    let result = GraphValidator::validate(&graph);
    assert!(result.is_valid());
    assert_eq!(
        result.warnings,
        vec![
            "Final state 'end' is unreachable from initial state 'start'".to_string(),
            "State 'orphan' is unreachable from initial state 'start'".to_string(),
        ]
    );
}

#[test]
fn test_strict_validation_rejects_invalid_graph() {
    let build = || {
        StateGraph::build(
            state("start").on("go", "nowhere"),
            vec![state("end")],
        )
        .unwrap()
    };
    let store = RecordingStore::new();

    let strict = EngineConfiguration {
        strict_validation: true,
        ..EngineConfiguration::default()
    };
    let err = FsmEngine::with_config(build(), store.clone(), strict)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("invalid state graph"));

    // Lenient mode only logs the findings
    assert!(FsmEngine::new(build(), store.clone()).is_ok());
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let graph = StateGraph::build(state("start").on("go", "end"), vec![state("end")]).unwrap();
    let config = EngineConfiguration {
        max_transitions: 0,
        ..EngineConfiguration::default()
    };

    let err = FsmEngine::with_config(graph, RecordingStore::new(), config)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("max_transitions"));
}

#[test]
fn test_engine_reports_graph_names() {
    let engine = FsmEngine::from_states(
        state("start").on("go", "end"),
        vec![state("end")],
        RecordingStore::new(),
    )
    .unwrap();

    assert_eq!(engine.initial_state_name(), "start");
    assert_eq!(engine.final_state_name(), "end");
    assert!(engine.is_terminal("end"));
    assert!(!engine.is_terminal("start"));
    assert_eq!(engine.graph().len(), 2);
}
