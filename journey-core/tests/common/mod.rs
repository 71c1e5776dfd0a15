//! Shared fakes for engine integration tests

#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use journey_core::{
    ExecutionContext, FsmError, InMemoryJourneyStore, Journey, JourneyStore, ReservedEvent,
    Revisit, StateHandler, Visit,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Journey payload used by the tests: the states visited so far
pub type Trail = Vec<String>;

/// Ordered record of handler invocations across all states
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Handler that emits a scripted sequence of events, then "transition_complete"
pub struct ScriptedHandler {
    name: String,
    events: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    visit_error: Option<String>,
    revisit_error: Option<String>,
    log: CallLog,
}

impl ScriptedHandler {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            events: Mutex::new(VecDeque::new()),
            repeat: None,
            visit_error: None,
            revisit_error: None,
            log: log.clone(),
        }
    }

    /// Events returned by successive visits
    pub fn emits(self, events: &[&str]) -> Self {
        *self.events.lock().unwrap() = events.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Event returned by every visit
    pub fn always_emits(mut self, event: &str) -> Self {
        self.repeat = Some(event.to_string());
        self
    }

    pub fn failing_visit(mut self, message: &str) -> Self {
        self.visit_error = Some(message.to_string());
        self
    }

    pub fn failing_revisit(mut self, message: &str) -> Self {
        self.revisit_error = Some(message.to_string());
        self
    }
}

#[async_trait]
impl StateHandler<Trail> for ScriptedHandler {
    async fn visit(
        &self,
        _ctx: &ExecutionContext,
        _journey_id: Uuid,
        data: &Trail,
        input: Value,
    ) -> Result<Visit<Trail>, FsmError> {
        self.log.record(format!("visit:{}", self.name));
        if let Some(message) = &self.visit_error {
            return Err(FsmError::handler(anyhow!(message.clone())));
        }

        let next_event = match &self.repeat {
            Some(event) => event.clone(),
            None => self
                .events
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ReservedEvent::TransitionComplete.as_str().to_string()),
        };

        let mut trail = data.clone();
        trail.push(self.name.clone());
        Ok(Visit::new(
            json!({ "state": self.name, "input": input }),
            trail,
            next_event,
        ))
    }

    async fn revisit(
        &self,
        _ctx: &ExecutionContext,
        _journey_id: Uuid,
        data: &Trail,
    ) -> Result<Revisit<Trail>, FsmError> {
        self.log.record(format!("revisit:{}", self.name));
        if let Some(message) = &self.revisit_error {
            return Err(FsmError::handler(anyhow!(message.clone())));
        }

        let mut trail = data.clone();
        trail.push(format!("revisit:{}", self.name));
        Ok(Revisit::new(
            json!({ "state": self.name, "revisited": true }),
            trail,
        ))
    }
}

/// In-memory store that counts calls and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryJourneyStore<Trail>,
    pub create_calls: AtomicUsize,
    pub created: Mutex<Vec<Uuid>>,
    pub get_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub deleted: Mutex<Vec<Uuid>>,
    pub fail_save: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<Uuid> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn journey_count(&self) -> usize {
        self.inner.len()
    }

    /// Read a journey without counting the call
    pub async fn peek(&self, jid: Uuid) -> Journey<Trail> {
        self.inner.get(&ExecutionContext::new(), jid).await.unwrap()
    }

    /// Overwrite a journey without counting the call
    pub async fn put(&self, journey: &Journey<Trail>) {
        self.inner
            .save(&ExecutionContext::new(), journey)
            .await
            .unwrap();
    }
}

#[async_trait]
impl JourneyStore<Trail> for RecordingStore {
    async fn create(&self, ctx: &ExecutionContext) -> Result<Journey<Trail>, FsmError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let journey = self.inner.create(ctx).await?;
        self.created.lock().unwrap().push(journey.jid);
        Ok(journey)
    }

    async fn get(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<Journey<Trail>, FsmError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(ctx, jid).await
    }

    async fn save(&self, ctx: &ExecutionContext, journey: &Journey<Trail>) -> Result<(), FsmError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(FsmError::store(anyhow!("save rejected")));
        }
        self.inner.save(ctx, journey).await
    }

    async fn delete(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<(), FsmError> {
        self.deleted.lock().unwrap().push(jid);
        self.inner.delete(ctx, jid).await
    }
}
