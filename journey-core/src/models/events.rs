//! Reserved control events understood by the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event names with engine-level meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedEvent {
    /// Begin a new journey at the initial state
    Start,
    /// Re-enter the state declared by the current state's "back" transition
    Back,
    /// Re-render the journey's last checkpoint
    Resume,
    /// Emitted by a handler to end the transition loop
    TransitionComplete,
}

impl ReservedEvent {
    pub const ALL: [ReservedEvent; 4] = [
        ReservedEvent::Start,
        ReservedEvent::Back,
        ReservedEvent::Resume,
        ReservedEvent::TransitionComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedEvent::Start => "start",
            ReservedEvent::Back => "back",
            ReservedEvent::Resume => "resume",
            ReservedEvent::TransitionComplete => "transition_complete",
        }
    }

    /// Whether `event` names this reserved event
    pub fn matches(&self, event: &str) -> bool {
        self.as_str() == event
    }
}

impl fmt::Display for ReservedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservedEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.matches(s))
            .ok_or_else(|| format!("'{}' is not a reserved event", s))
    }
}
