//! Journey persistence

pub mod json_file;
pub mod memory;

pub use json_file::*;
pub use memory::*;

use crate::error::FsmError;
use crate::fsm::context::ExecutionContext;
use crate::models::journey::Journey;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for journey records
///
/// The engine performs no locking around a journey identifier. Two requests for
/// the same journey race at the `get`/`save` boundary, so implementations must
/// either serialize access per identifier or reject stale saves with
/// [`FsmError::Conflict`]. Both stores in this module do the latter using
/// [`Journey::version`].
#[async_trait]
pub trait JourneyStore<T>: Send + Sync {
    /// Allocate a new, blank journey record and its identifier
    async fn create(&self, ctx: &ExecutionContext) -> Result<Journey<T>, FsmError>;

    /// Load a journey; fails with [`FsmError::NotFound`] if absent
    async fn get(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<Journey<T>, FsmError>;

    /// Upsert a journey
    async fn save(&self, ctx: &ExecutionContext, journey: &Journey<T>) -> Result<(), FsmError>;

    /// Remove a journey; used by the engine only to compensate a failed start
    async fn delete(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<(), FsmError>;
}

/// Check a save against the stored revision and produce the next revision
pub(crate) fn next_version<T>(
    stored: Option<&Journey<T>>,
    incoming: &Journey<T>,
) -> Result<u64, FsmError> {
    match stored {
        Some(current) if current.version != incoming.version => {
            Err(FsmError::Conflict(incoming.jid))
        }
        _ => Ok(incoming.version + 1),
    }
}
