//! Immutable, validated state graph

use crate::error::FsmError;
use crate::models::state::FsmState;
use std::collections::HashMap;

/// Name-keyed mapping of every state a journey can occupy
pub struct StateGraph<T> {
    states: HashMap<String, FsmState<T>>,
    initial_state_name: String,
    final_state_name: String,
    initial_shadows_other: bool,
}

impl<T> StateGraph<T> {
    /// Build the graph from its initial state and the remaining states
    ///
    /// Exactly one of `other_states` must have no outgoing transitions; it becomes
    /// the terminal state. The initial state is merged in afterwards under its own
    /// name and does not count toward that check.
    pub fn build(
        initial_state: FsmState<T>,
        other_states: Vec<FsmState<T>>,
    ) -> Result<Self, FsmError> {
        let mut states = HashMap::with_capacity(other_states.len() + 1);
        let mut final_state_name: Option<String> = None;

        for state in other_states {
            if state.is_terminal() {
                if final_state_name.is_some() {
                    return Err(FsmError::internal("multiple final states found"));
                }
                final_state_name = Some(state.name.clone());
            }
            states.insert(state.name.clone(), state);
        }

        let final_state_name =
            final_state_name.ok_or_else(|| FsmError::internal("no final state found"))?;

        let initial_state_name = initial_state.name.clone();
        let initial_shadows_other = states.contains_key(&initial_state_name);
        if initial_shadows_other {
            tracing::warn!(
                "Initial state '{}' replaces a state declared with the same name",
                initial_state_name
            );
        }
        states.insert(initial_state_name.clone(), initial_state);

        Ok(Self {
            states,
            initial_state_name,
            final_state_name,
            initial_shadows_other,
        })
    }

    pub fn initial_state_name(&self) -> &str {
        &self.initial_state_name
    }

    pub fn final_state_name(&self) -> &str {
        &self.final_state_name
    }

    /// Resolve a state by name; unknown names mean corrupt or misconfigured data
    pub fn state(&self, name: &str) -> Result<&FsmState<T>, FsmError> {
        self.states
            .get(name)
            .ok_or_else(|| FsmError::internal(format!("cannot find state '{}'", name)))
    }

    pub fn initial_state(&self) -> Result<&FsmState<T>, FsmError> {
        self.state(&self.initial_state_name)
    }

    /// Follow the transition labeled `event` out of `current`
    pub fn next_state(&self, current: &FsmState<T>, event: &str) -> Result<&FsmState<T>, FsmError> {
        match current.transition_for(event) {
            Some(transition) => self.state(&transition.destination_state_name),
            None => Err(FsmError::bypass(format!(
                "invalid event {} for state {}",
                event, current.name
            ))),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn states(&self) -> impl Iterator<Item = &FsmState<T>> {
        self.states.values()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Whether the initial state overwrote another state of the same name at build time
    pub fn initial_state_shadows_other(&self) -> bool {
        self.initial_shadows_other
    }
}
