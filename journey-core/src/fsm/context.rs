//! Per-request execution context shared with stores and handlers

use crate::error::FsmError;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Request-scoped context passed to every collaborator call
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Correlation identifier for log records
    request_id: Uuid,
    /// Cancellation signal owned by the caller
    cancel_token: CancellationToken,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Context bound to a caller-owned cancellation token
    pub fn with_cancellation(cancel_token: CancellationToken) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancel_token,
        }
    }

    /// Same request, fresh cancellation token; used for cleanup that must still run
    pub fn detached(&self) -> Self {
        Self {
            request_id: self.request_id,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Fail with [`FsmError::Cancelled`] once the caller has given up
    pub fn ensure_active(&self) -> Result<(), FsmError> {
        if self.is_cancelled() {
            Err(FsmError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
