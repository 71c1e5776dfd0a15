//! Journey execution engine

use crate::error::{ErrorKind, FsmError};
use crate::fsm::context::ExecutionContext;
use crate::fsm::graph::StateGraph;
use crate::fsm::validator::GraphValidator;
use crate::models::configuration::EngineConfiguration;
use crate::models::events::ReservedEvent;
use crate::models::journey::{FsmRequest, FsmResponse, Journey};
use crate::models::state::FsmState;
use crate::services::logging::{log_internal_fault, log_rejection, log_transition};
use crate::store::JourneyStore;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Type-erased entry point for transport layers
#[async_trait]
pub trait FsmService: Send + Sync {
    /// Route one request through the journey graph
    async fn execute(
        &self,
        ctx: &ExecutionContext,
        request: FsmRequest,
    ) -> Result<FsmResponse, FsmError>;
}

/// Drives journeys through a state graph
pub struct FsmEngine<T> {
    /// Immutable state graph
    graph: StateGraph<T>,
    /// Persistence layer
    store: Arc<dyn JourneyStore<T>>,
    /// Engine configuration
    config: EngineConfiguration,
}

/// Where the transition loop left a journey
struct LoopOutcome<'g, T> {
    journey: Journey<T>,
    last_state: &'g FsmState<T>,
    response: serde_json::Value,
}

impl<T> FsmEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create engine with default configuration
    pub fn new(graph: StateGraph<T>, store: Arc<dyn JourneyStore<T>>) -> Result<Self, FsmError> {
        Self::with_config(graph, store, EngineConfiguration::default())
    }

    /// Build the graph and the engine in one step
    pub fn from_states(
        initial_state: FsmState<T>,
        other_states: Vec<FsmState<T>>,
        store: Arc<dyn JourneyStore<T>>,
    ) -> Result<Self, FsmError> {
        Self::new(StateGraph::build(initial_state, other_states)?, store)
    }

    /// Create engine, validating the graph and configuration
    pub fn with_config(
        graph: StateGraph<T>,
        store: Arc<dyn JourneyStore<T>>,
        config: EngineConfiguration,
    ) -> Result<Self, FsmError> {
        if let Err(errors) = config.validate() {
            return Err(FsmError::internal(format!(
                "invalid engine configuration: {}",
                errors.join("; ")
            )));
        }

        let report = GraphValidator::validate(&graph);
        for warning in &report.warnings {
            tracing::warn!("State graph: {}", warning);
        }
        if !report.is_valid() {
            if config.strict_validation {
                return Err(FsmError::internal(format!(
                    "invalid state graph: {}",
                    report.error_summary()
                )));
            }
            for error in &report.errors {
                tracing::warn!("State graph {}: {}", error.field, error.message);
            }
        }

        Ok(Self {
            graph,
            store,
            config,
        })
    }

    pub fn graph(&self) -> &StateGraph<T> {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfiguration {
        &self.config
    }

    pub fn initial_state_name(&self) -> &str {
        self.graph.initial_state_name()
    }

    pub fn final_state_name(&self) -> &str {
        self.graph.final_state_name()
    }

    /// Check if state is terminal
    pub fn is_terminal(&self, state: &str) -> bool {
        state == self.graph.final_state_name()
    }

    /// Route a request to the start, resume, back or continue flow
    pub async fn execute(
        &self,
        ctx: &ExecutionContext,
        request: FsmRequest,
    ) -> Result<FsmResponse, FsmError> {
        let jid = request.jid;
        let event = request.event.clone();

        let result = self.dispatch(ctx, request).await;
        match &result {
            Ok(response) => tracing::info!(
                request_id = %ctx.request_id(),
                "Journey {} handled event '{}' and now shows '{}'",
                response.jid,
                event,
                response.next_screen
            ),
            Err(err) => match err.kind() {
                ErrorKind::Bypass => log_rejection(jid, &event, &err.to_string()),
                ErrorKind::Internal => log_internal_fault(jid, &err.to_string()),
                _ => tracing::debug!(
                    request_id = %ctx.request_id(),
                    "Request for event '{}' failed: {}",
                    event,
                    err
                ),
            },
        }

        result
    }

    async fn dispatch(
        &self,
        ctx: &ExecutionContext,
        request: FsmRequest,
    ) -> Result<FsmResponse, FsmError> {
        let Some(jid) = request.jid else {
            return self.start_journey(ctx, request).await;
        };

        let journey = self.store.get(ctx, jid).await?;
        if ReservedEvent::Resume.matches(&request.event) {
            self.resume_journey(ctx, journey).await
        } else if ReservedEvent::Back.matches(&request.event) {
            self.back_journey(ctx, journey).await
        } else {
            self.continue_journey(ctx, journey, request).await
        }
    }

    /// Start flow: create the journey, visit the initial state, then keep transitioning
    async fn start_journey(
        &self,
        ctx: &ExecutionContext,
        request: FsmRequest,
    ) -> Result<FsmResponse, FsmError> {
        if !ReservedEvent::Start.matches(&request.event) {
            return Err(FsmError::bypass("invalid journey error: wrong event"));
        }
        let initial_state = self.graph.initial_state()?;

        let mut journey = self.store.create(ctx).await?;
        let jid = journey.jid;
        journey.last_checkpoint_stage = initial_state.name.clone();
        tracing::info!("Starting journey {} at '{}'", jid, initial_state.name);

        // Every failure after creation removes the record again
        let result = self
            .run_new_journey(ctx, journey, initial_state, request.data)
            .await;
        if result.is_err() {
            tracing::warn!("Rolling back journey {} after failed start", jid);
            // Rollback runs even when the request itself was cancelled
            let _ = self.store.delete(&ctx.detached(), jid).await;
        }
        result
    }

    async fn run_new_journey(
        &self,
        ctx: &ExecutionContext,
        journey: Journey<T>,
        initial_state: &FsmState<T>,
        input: serde_json::Value,
    ) -> Result<FsmResponse, FsmError> {
        let (journey, response, next_event) =
            self.visit_state(ctx, initial_state, journey, input).await?;

        let outcome = LoopOutcome {
            journey,
            last_state: initial_state,
            response,
        };
        let outcome = if ReservedEvent::TransitionComplete.matches(&next_event) {
            outcome
        } else {
            self.transition_loop(ctx, outcome, next_event).await?
        };
        self.save_and_respond(ctx, outcome).await
    }

    /// Continue flow: treat the caller's event as the first transition
    async fn continue_journey(
        &self,
        ctx: &ExecutionContext,
        journey: Journey<T>,
        request: FsmRequest,
    ) -> Result<FsmResponse, FsmError> {
        let current_state = self.graph.state(&journey.current_stage)?;
        let outcome = LoopOutcome {
            journey,
            last_state: current_state,
            response: request.data,
        };
        let outcome = self.transition_loop(ctx, outcome, request.event).await?;
        self.save_and_respond(ctx, outcome).await
    }

    /// Resume flow: re-render the last checkpoint without advancing
    async fn resume_journey(
        &self,
        ctx: &ExecutionContext,
        journey: Journey<T>,
    ) -> Result<FsmResponse, FsmError> {
        let checkpoint = self.graph.state(&journey.last_checkpoint_stage)?;
        tracing::info!(
            "Resuming journey {} at checkpoint '{}'",
            journey.jid,
            checkpoint.name
        );
        self.revisit_and_save(ctx, journey, checkpoint).await
    }

    /// Back flow: follow the current state's declared "back" edge
    async fn back_journey(
        &self,
        ctx: &ExecutionContext,
        journey: Journey<T>,
    ) -> Result<FsmResponse, FsmError> {
        let current_state = self.graph.state(&journey.current_stage)?;
        let previous_state = self
            .graph
            .next_state(current_state, ReservedEvent::Back.as_str())?;
        log_transition(
            journey.jid,
            &current_state.name,
            ReservedEvent::Back.as_str(),
            &previous_state.name,
        );
        self.revisit_and_save(ctx, journey, previous_state).await
    }

    /// Walk the graph until a handler emits "transition_complete"
    ///
    /// `next_event` is always attempted as a transition first. The response of each
    /// visit is handed to the next visited state as its input. Nothing is persisted
    /// here, so on error the stored journey stays at its last saved transition.
    async fn transition_loop<'g>(
        &'g self,
        ctx: &ExecutionContext,
        mut outcome: LoopOutcome<'g, T>,
        mut next_event: String,
    ) -> Result<LoopOutcome<'g, T>, FsmError> {
        let mut transitions: u32 = 0;

        loop {
            if transitions >= self.config.max_transitions {
                return Err(FsmError::internal(format!(
                    "transition limit of {} exceeded for journey {} at state {}",
                    self.config.max_transitions, outcome.journey.jid, outcome.journey.current_stage
                )));
            }
            transitions += 1;

            let current_state = self.graph.state(&outcome.journey.current_stage)?;
            let next_state = self.graph.next_state(current_state, &next_event)?;
            log_transition(
                outcome.journey.jid,
                &current_state.name,
                &next_event,
                &next_state.name,
            );

            let (journey, response, event) = self
                .visit_state(ctx, next_state, outcome.journey, outcome.response)
                .await?;
            outcome = LoopOutcome {
                journey,
                last_state: next_state,
                response,
            };

            if ReservedEvent::TransitionComplete.matches(&event) {
                return Ok(outcome);
            }
            next_event = event;
        }
    }

    /// Run the state's visit handler and move the journey onto it
    async fn visit_state(
        &self,
        ctx: &ExecutionContext,
        state: &FsmState<T>,
        mut journey: Journey<T>,
        input: serde_json::Value,
    ) -> Result<(Journey<T>, serde_json::Value, String), FsmError> {
        ctx.ensure_active()?;
        let visit = state
            .handler
            .visit(ctx, journey.jid, &journey.data, input)
            .await?;

        journey.data = visit.data;
        enter_state(&mut journey, state);
        Ok((journey, visit.response, visit.next_event))
    }

    async fn revisit_and_save(
        &self,
        ctx: &ExecutionContext,
        mut journey: Journey<T>,
        state: &FsmState<T>,
    ) -> Result<FsmResponse, FsmError> {
        ctx.ensure_active()?;
        let revisit = state.handler.revisit(ctx, journey.jid, &journey.data).await?;

        journey.data = revisit.data;
        enter_state(&mut journey, state);

        let outcome = LoopOutcome {
            journey,
            last_state: state,
            response: revisit.response,
        };
        self.save_and_respond(ctx, outcome).await
    }

    async fn save_and_respond(
        &self,
        ctx: &ExecutionContext,
        outcome: LoopOutcome<'_, T>,
    ) -> Result<FsmResponse, FsmError> {
        ctx.ensure_active()?;
        self.store.save(ctx, &outcome.journey).await?;
        Ok(load_response(
            outcome.journey.jid,
            outcome.last_state,
            outcome.response,
        ))
    }
}

#[async_trait]
impl<T> FsmService for FsmEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn execute(
        &self,
        ctx: &ExecutionContext,
        request: FsmRequest,
    ) -> Result<FsmResponse, FsmError> {
        FsmEngine::execute(self, ctx, request).await
    }
}

/// Record that the journey now occupies `state`
fn enter_state<T>(journey: &mut Journey<T>, state: &FsmState<T>) {
    journey.current_stage = state.name.clone();
    if state.is_checkpoint {
        journey.last_checkpoint_stage = state.name.clone();
    }
}

fn load_response<T>(jid: Uuid, state: &FsmState<T>, data: serde_json::Value) -> FsmResponse {
    FsmResponse {
        jid,
        data,
        next_screen: state.next_screen.clone(),
        meta_data: state.meta_data.clone(),
    }
}
