//! Journey persistence using JSON file storage

use crate::error::FsmError;
use crate::fsm::context::ExecutionContext;
use crate::models::configuration::EngineConfiguration;
use crate::models::journey::Journey;
use crate::store::{next_version, JourneyStore};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Root JSON document containing every journey
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: DeserializeOwned"
))]
pub struct JsonJourneyDocument<T> {
    pub journeys: HashMap<Uuid, Journey<T>>,
}

impl<T> Default for JsonJourneyDocument<T> {
    fn default() -> Self {
        Self {
            journeys: HashMap::new(),
        }
    }
}

/// Journey store persisted to a single JSON file
///
/// The file is the only copy of the data. Reads take a shared `fs2` lock; every
/// mutation takes an exclusive lock, re-reads the document, applies the change
/// and rewrites the file before releasing the lock, so any number of stores may
/// share one path. Blocking file I/O runs on the tokio blocking pool.
pub struct JsonFileJourneyStore<T> {
    /// Path to JSON store file
    store_path: PathBuf,
    _journey: PhantomData<fn() -> T>,
}

impl<T> JsonFileJourneyStore<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Open the store, checking that an existing file parses
    pub fn new<P: AsRef<Path>>(store_path: P) -> Result<Self> {
        let store_path = store_path.as_ref().to_path_buf();

        if let Some(parent) = store_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create journey store directory")?;
        }

        load_document::<T>(&store_path)?;

        Ok(Self {
            store_path,
            _journey: PhantomData,
        })
    }

    /// Open the store at the configured path, or the default data location
    pub fn from_config(config: &EngineConfiguration) -> Result<Self> {
        let store_path = match &config.store_path {
            Some(path) => path.clone(),
            None => EngineConfiguration::default_store_path()?,
        };
        Self::new(store_path)
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Run blocking file work off the async runtime
    async fn run_blocking<R, F>(&self, work: F) -> Result<R, FsmError>
    where
        R: Send + 'static,
        F: FnOnce(&Path) -> Result<R, FsmError> + Send + 'static,
    {
        let path = self.store_path.clone();

        tokio::task::spawn_blocking(move || work(&path))
            .await
            .map_err(|e| {
                tracing::warn!("Journey store task failed: {}", e);
                FsmError::store(anyhow!("journey store task failed: {}", e))
            })?
    }

    /// Read the current document from disk
    async fn read(&self) -> Result<JsonJourneyDocument<T>, FsmError> {
        self.run_blocking(|path| load_document(path).map_err(|e| store_failure(path, "read", e)))
            .await
    }

    /// Apply `mutate` to the on-disk document while holding the exclusive lock
    async fn write_with<R, F>(&self, mutate: F) -> Result<R, FsmError>
    where
        R: Send + 'static,
        F: FnOnce(&mut JsonJourneyDocument<T>) -> Result<R, FsmError> + Send + 'static,
    {
        self.run_blocking(move |path| update_document(path, mutate)).await
    }
}

fn store_failure(path: &Path, operation: &str, error: anyhow::Error) -> FsmError {
    tracing::warn!(
        "Journey store {} of {} failed: {:#}",
        operation,
        path.display(),
        error
    );
    FsmError::store(error)
}

/// Load the JSON document from file with a shared lock
///
/// A missing or empty file is an empty store.
fn load_document<T: DeserializeOwned>(path: &Path) -> Result<JsonJourneyDocument<T>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(JsonJourneyDocument::default())
        }
        Err(e) => return Err(e).context("Failed to open journey store file"),
    };

    file.lock_shared()
        .context("Failed to acquire read lock on journey store")?;

    // Lock is released when the file drops
    read_locked(&mut file)
}

/// Read and parse the document from an already locked file
fn read_locked<T: DeserializeOwned>(file: &mut File) -> Result<JsonJourneyDocument<T>> {
    let mut contents = String::new();
    file.seek(SeekFrom::Start(0))
        .context("Failed to seek journey store")?;
    file.read_to_string(&mut contents)
        .context("Failed to read journey store")?;

    if contents.trim().is_empty() {
        return Ok(JsonJourneyDocument::default());
    }

    serde_json::from_str(&contents).context("Failed to parse journey store JSON")
}

/// Replace the contents of an already locked file
fn write_locked<T: Serialize>(file: &mut File, document: &JsonJourneyDocument<T>) -> Result<()> {
    let json =
        serde_json::to_string_pretty(document).context("Failed to serialize journey store")?;

    file.set_len(0).context("Failed to truncate journey store")?;
    file.seek(SeekFrom::Start(0))
        .context("Failed to seek journey store")?;
    file.write_all(json.as_bytes())
        .context("Failed to write journey store")?;
    file.flush()
        .context("Failed to flush journey store to disk")?;

    Ok(())
}

/// Read, mutate and rewrite the document under one exclusive lock
fn update_document<T, R, F>(path: &Path, mutate: F) -> Result<R, FsmError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut JsonJourneyDocument<T>) -> Result<R, FsmError>,
{
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .context("Failed to open journey store file for writing")
        .map_err(|e| store_failure(path, "write", e))?;

    file.lock_exclusive()
        .context("Failed to acquire write lock on journey store")
        .map_err(|e| store_failure(path, "write", e))?;

    let mut document = read_locked(&mut file).map_err(|e| store_failure(path, "read", e))?;
    let outcome = mutate(&mut document)?;
    write_locked(&mut file, &document).map_err(|e| store_failure(path, "write", e))?;

    Ok(outcome)
}

#[async_trait]
impl<T> JourneyStore<T> for JsonFileJourneyStore<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn create(&self, ctx: &ExecutionContext) -> Result<Journey<T>, FsmError> {
        ctx.ensure_active()?;
        let journey = Journey::new(Uuid::new_v4());
        let created = journey.clone();

        self.write_with(move |document| {
            document.journeys.insert(created.jid, created);
            Ok(())
        })
        .await?;

        Ok(journey)
    }

    async fn get(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<Journey<T>, FsmError> {
        ctx.ensure_active()?;
        let mut document = self.read().await?;
        document
            .journeys
            .remove(&jid)
            .ok_or(FsmError::NotFound(jid))
    }

    async fn save(&self, ctx: &ExecutionContext, journey: &Journey<T>) -> Result<(), FsmError> {
        ctx.ensure_active()?;
        let mut saved = journey.clone();

        self.write_with(move |document| {
            saved.version = next_version(document.journeys.get(&saved.jid), &saved)?;
            saved.updated_at = Utc::now();
            document.journeys.insert(saved.jid, saved);
            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &ExecutionContext, jid: Uuid) -> Result<(), FsmError> {
        ctx.ensure_active()?;
        let removed = self
            .write_with(move |document| Ok(document.journeys.remove(&jid).is_some()))
            .await?;

        if !removed {
            tracing::warn!("Delete requested for unknown journey {}", jid);
        }
        Ok(())
    }
}
