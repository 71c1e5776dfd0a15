//! Error types shared by the engine and its collaborators

use thiserror::Error;
use uuid::Uuid;

/// Broad classification of an [`FsmError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed graph or corrupted persisted state
    Internal,
    /// Caller asked for something the current journey cannot do
    Bypass,
    /// Journey identifier unknown to the store
    NotFound,
    /// Store rejected a save made against a stale journey
    Conflict,
    /// Execution context was cancelled
    Cancelled,
    /// State handler failure
    Handler,
    /// Journey store failure
    Store,
}

/// Errors produced while executing a journey request
#[derive(Debug, Error)]
pub enum FsmError {
    #[error("internal system error: {0}")]
    Internal(String),

    #[error("invalid operation: {0}")]
    Bypass(String),

    #[error("journey {0} not found")]
    NotFound(Uuid),

    #[error("journey {0} was modified concurrently")]
    Conflict(Uuid),

    #[error("operation cancelled")]
    Cancelled,

    #[error("state handler error: {0:#}")]
    Handler(#[source] anyhow::Error),

    #[error("journey store error: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl FsmError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn bypass(message: impl Into<String>) -> Self {
        Self::Bypass(message.into())
    }

    /// Wrap a domain failure raised inside a state handler
    pub fn handler(err: impl Into<anyhow::Error>) -> Self {
        Self::Handler(err.into())
    }

    /// Wrap a persistence failure raised inside a journey store
    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        Self::Store(err.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Internal(_) => ErrorKind::Internal,
            Self::Bypass(_) => ErrorKind::Bypass,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Handler(_) => ErrorKind::Handler,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Whether the caller can correct the request and try again
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Bypass | ErrorKind::NotFound | ErrorKind::Conflict
        )
    }
}
