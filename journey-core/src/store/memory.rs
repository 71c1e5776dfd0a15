//! In-memory journey store

use crate::error::FsmError;
use crate::fsm::context::ExecutionContext;
use crate::models::journey::Journey;
use crate::store::{next_version, JourneyStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

/// Journey store backed by a concurrent map; contents are lost on drop
pub struct InMemoryJourneyStore<T> {
    journeys: DashMap<Uuid, Journey<T>>,
}

impl<T> InMemoryJourneyStore<T> {
    pub fn new() -> Self {
        Self {
            journeys: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.journeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }

    pub fn contains(&self, jid: Uuid) -> bool {
        self.journeys.contains_key(&jid)
    }
}

impl<T> Default for InMemoryJourneyStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> JourneyStore<T> for InMemoryJourneyStore<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    async fn create(&self, ctx: &ExecutionContext) -> Result<Journey<T>, FsmError> {
        ctx.ensure_active()?;
        let journey = Journey::new(Uuid::new_v4());
        self.journeys.insert(journey.jid, journey.clone());
        Ok(journey)
    }

    async fn get(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<Journey<T>, FsmError> {
        ctx.ensure_active()?;
        self.journeys
            .get(&jid)
            .map(|entry| entry.value().clone())
            .ok_or(FsmError::NotFound(jid))
    }

    async fn save(&self, ctx: &ExecutionContext, journey: &Journey<T>) -> Result<(), FsmError> {
        ctx.ensure_active()?;
        // The entry guard holds the shard lock across the version check and the write
        let mut entry = self.journeys.entry(journey.jid).or_insert_with(|| journey.clone());
        let version = next_version(Some(entry.value()), journey)?;

        let mut saved = journey.clone();
        saved.version = version;
        saved.updated_at = Utc::now();
        *entry.value_mut() = saved;
        Ok(())
    }

    async fn delete(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<(), FsmError> {
        ctx.ensure_active()?;
        if self.journeys.remove(&jid).is_none() {
            tracing::warn!("Delete requested for unknown journey {}", jid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_create_and_get_journey() {
        let store: InMemoryJourneyStore<Vec<u32>> = InMemoryJourneyStore::new();
        let ctx = ExecutionContext::new();

        let journey = store.create(&ctx).await.unwrap();
        assert!(store.contains(journey.jid));

        let loaded = store.get(&ctx, journey.jid).await.unwrap();
        assert_eq!(loaded.jid, journey.jid);
        assert_eq!(loaded.version, 0);
    }

    #[tokio::test]
    async fn test_get_unknown_journey() {
        let store: InMemoryJourneyStore<()> = InMemoryJourneyStore::new();
        let jid = Uuid::new_v4();

        let err = store.get(&ExecutionContext::new(), jid).await.unwrap_err();
        assert!(matches!(err, FsmError::NotFound(id) if id == jid));
    }

    #[tokio::test]
    async fn test_save_bumps_version() {
        let store: InMemoryJourneyStore<u32> = InMemoryJourneyStore::new();
        let ctx = ExecutionContext::new();

        let mut journey = store.create(&ctx).await.unwrap();
        journey.current_stage = "details".to_string();
        journey.data = 7;
        store.save(&ctx, &journey).await.unwrap();

        let loaded = store.get(&ctx, journey.jid).await.unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.current_stage, "details");
        assert_eq!(loaded.data, 7);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let store: InMemoryJourneyStore<u32> = InMemoryJourneyStore::new();
        let ctx = ExecutionContext::new();

        let journey = store.create(&ctx).await.unwrap();
        let first = store.get(&ctx, journey.jid).await.unwrap();
        let second = store.get(&ctx, journey.jid).await.unwrap();

        store.save(&ctx, &first).await.unwrap();
        let err = store.save(&ctx, &second).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_delete_is_best_effort() {
        let store: InMemoryJourneyStore<()> = InMemoryJourneyStore::new();
        let ctx = ExecutionContext::new();

        let journey = store.create(&ctx).await.unwrap();
        store.delete(&ctx, journey.jid).await.unwrap();
        assert!(store.is_empty());

        store.delete(&ctx, journey.jid).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_context_is_rejected() {
        let store: InMemoryJourneyStore<()> = InMemoryJourneyStore::new();
        let ctx = ExecutionContext::new();
        ctx.cancellation_token().cancel();

        let err = store.create(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(store.is_empty());
    }
}
