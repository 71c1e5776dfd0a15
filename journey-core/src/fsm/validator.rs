//! State graph validation logic

use crate::fsm::graph::StateGraph;
use crate::models::ReservedEvent;
use std::collections::{HashSet, VecDeque};

/// Validation error type
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: String, message: String) {
        self.errors.push(ValidationError { field, message });
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// All error messages joined for a single diagnostic line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// State graph validator
///
/// Checks structure that `StateGraph::build` does not enforce. Errors describe
/// graphs that will fail at runtime; warnings describe graphs that probably do
/// not behave as their author intended.
pub struct GraphValidator;

impl GraphValidator {
    /// Validate a built state graph
    pub fn validate<T>(graph: &StateGraph<T>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if graph.initial_state_shadows_other() {
            result.add_error(
                format!("states.{}", graph.initial_state_name()),
                format!(
                    "Initial state '{}' shares its name with another declared state",
                    graph.initial_state_name()
                ),
            );
        }

        for state in graph.states() {
            let mut seen = HashSet::new();

            for transition in &state.next_available_events {
                if !graph.contains(&transition.destination_state_name) {
                    result.add_error(
                        format!("states.{}.events.{}", state.name, transition.event),
                        format!(
                            "Transition target state '{}' not found",
                            transition.destination_state_name
                        ),
                    );
                }

                if !seen.insert(transition.event.as_str()) {
                    result.add_warning(format!(
                        "State '{}' declares event '{}' more than once; only the first is used",
                        state.name, transition.event
                    ));
                }

                if let Ok(reserved) = transition.event.parse::<ReservedEvent>() {
                    if reserved != ReservedEvent::Back {
                        result.add_warning(format!(
                            "State '{}' uses reserved event '{}' as a transition label",
                            state.name, reserved
                        ));
                    }
                }
            }
        }

        let reachable = Self::reachable_states(graph);
        let mut unreachable: Vec<_> = graph
            .states()
            .map(|state| state.name.as_str())
            .filter(|name| !reachable.contains(*name))
            .collect();
        unreachable.sort_unstable();

        for state_name in unreachable {
            if state_name == graph.final_state_name() {
                result.add_warning(format!(
                    "Final state '{}' is unreachable from initial state '{}'",
                    state_name,
                    graph.initial_state_name()
                ));
            } else {
                result.add_warning(format!(
                    "State '{}' is unreachable from initial state '{}'",
                    state_name,
                    graph.initial_state_name()
                ));
            }
        }

        result
    }

    /// Find states reachable from the initial state using BFS
    fn reachable_states<T>(graph: &StateGraph<T>) -> HashSet<String> {
        let mut reachable = HashSet::new();
        let mut queue = VecDeque::new();

        queue.push_back(graph.initial_state_name().to_string());
        reachable.insert(graph.initial_state_name().to_string());

        while let Some(state_name) = queue.pop_front() {
            if let Ok(state) = graph.state(&state_name) {
                for transition in &state.next_available_events {
                    if reachable.insert(transition.destination_state_name.clone()) {
                        queue.push_back(transition.destination_state_name.clone());
                    }
                }
            }
        }

        reachable
    }
}
