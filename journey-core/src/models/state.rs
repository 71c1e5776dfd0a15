//! State definitions making up a journey graph

use crate::fsm::handler::StateHandler;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Labeled edge leaving a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTransition {
    /// Event label matched against the pending event
    pub event: String,
    /// State entered when the label matches
    pub destination_state_name: String,
}

impl EventTransition {
    pub fn new(event: impl Into<String>, destination_state_name: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            destination_state_name: destination_state_name.into(),
        }
    }
}

/// One node of the journey graph
pub struct FsmState<T> {
    /// Unique state name
    pub name: String,
    /// Outgoing transitions, searched in order; empty only for the terminal state
    pub next_available_events: Vec<EventTransition>,
    /// Domain logic run on visit and revisit
    pub handler: Box<dyn StateHandler<T>>,
    /// Whether a later "resume" may land on this state
    pub is_checkpoint: bool,
    /// Presentation hint returned to the caller
    pub next_screen: String,
    /// Presentation metadata returned to the caller
    pub meta_data: serde_json::Value,
}

impl<T> FsmState<T> {
    pub fn new(name: impl Into<String>, handler: impl StateHandler<T> + 'static) -> Self {
        Self {
            name: name.into(),
            next_available_events: Vec::new(),
            handler: Box::new(handler),
            is_checkpoint: false,
            next_screen: String::new(),
            meta_data: serde_json::Value::Null,
        }
    }

    /// Add an outgoing transition
    pub fn on(mut self, event: impl Into<String>, destination: impl Into<String>) -> Self {
        self.next_available_events
            .push(EventTransition::new(event, destination));
        self
    }

    pub fn checkpoint(mut self) -> Self {
        self.is_checkpoint = true;
        self
    }

    pub fn screen(mut self, next_screen: impl Into<String>) -> Self {
        self.next_screen = next_screen.into();
        self
    }

    pub fn meta(mut self, meta_data: serde_json::Value) -> Self {
        self.meta_data = meta_data;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.next_available_events.is_empty()
    }

    /// First transition labeled `event`, if any
    pub fn transition_for(&self, event: &str) -> Option<&EventTransition> {
        self.next_available_events
            .iter()
            .find(|transition| transition.event == event)
    }
}

impl<T> fmt::Debug for FsmState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsmState")
            .field("name", &self.name)
            .field("next_available_events", &self.next_available_events)
            .field("is_checkpoint", &self.is_checkpoint)
            .field("next_screen", &self.next_screen)
            .field("meta_data", &self.meta_data)
            .finish_non_exhaustive()
    }
}
