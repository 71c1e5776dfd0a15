//! State handler trait and visit outcomes

use crate::error::FsmError;
use crate::fsm::context::ExecutionContext;
use crate::models::ReservedEvent;
use async_trait::async_trait;
use uuid::Uuid;

/// Outcome of a first-time visit to a state
#[derive(Debug, Clone)]
pub struct Visit<T> {
    /// Output returned to the caller if this is the last executed state
    pub response: serde_json::Value,
    /// Journey payload after the visit
    pub data: T,
    /// Event routed from this state next
    pub next_event: String,
}

impl<T> Visit<T> {
    pub fn new(response: serde_json::Value, data: T, next_event: impl Into<String>) -> Self {
        Self {
            response,
            data,
            next_event: next_event.into(),
        }
    }

    /// Pause here and hand control back to the caller
    pub fn complete(response: serde_json::Value, data: T) -> Self {
        Self::new(response, data, ReservedEvent::TransitionComplete.as_str())
    }

    pub fn is_complete(&self) -> bool {
        ReservedEvent::TransitionComplete.matches(&self.next_event)
    }
}

/// Outcome of re-entering a state on resume or back
#[derive(Debug, Clone)]
pub struct Revisit<T> {
    pub response: serde_json::Value,
    pub data: T,
}

impl<T> Revisit<T> {
    pub fn new(response: serde_json::Value, data: T) -> Self {
        Self { response, data }
    }
}

/// Domain logic attached to a single state
#[async_trait]
pub trait StateHandler<T>: Send + Sync {
    /// Run on entry through the transition loop
    ///
    /// # Arguments
    /// * `ctx` - Request context, carries cancellation
    /// * `journey_id` - Journey being driven
    /// * `data` - Journey payload before the visit
    /// * `input` - Caller input, or the previous handler's response
    async fn visit(
        &self,
        ctx: &ExecutionContext,
        journey_id: Uuid,
        data: &T,
        input: serde_json::Value,
    ) -> Result<Visit<T>, FsmError>;

    /// Run on re-entry through resume or back; takes no caller input
    async fn revisit(
        &self,
        ctx: &ExecutionContext,
        journey_id: Uuid,
        data: &T,
    ) -> Result<Revisit<T>, FsmError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_visit() {
        let visit = Visit::complete(json!({"ok": true}), 3u8);
        assert!(visit.is_complete());
        assert_eq!(visit.next_event, "transition_complete");

        let visit = Visit::new(json!(null), 3u8, "next");
        assert!(!visit.is_complete());
    }
}
