//! # Journey Core Library
//!
//! Finite-state-machine engine for long-lived, resumable journeys. A journey is
//! driven through a graph of named states connected by named events; progress is
//! persisted through a [`store::JourneyStore`] between requests, and callers can
//! resume from the last checkpoint or step back along declared "back" edges.

pub mod error;
pub mod fsm;
pub mod models;
pub mod services;
pub mod store;

pub use error::{ErrorKind, FsmError};
pub use fsm::{
    ExecutionContext, FsmEngine, FsmService, GraphValidator, Revisit, StateGraph, StateHandler,
    Visit,
};
pub use models::{
    EngineConfiguration, EventTransition, FsmRequest, FsmResponse, FsmState, Journey, LogLevel,
    ReservedEvent,
};
pub use store::{InMemoryJourneyStore, JourneyStore, JsonFileJourneyStore};
