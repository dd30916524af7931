use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prep_core::model::{AuthSession, ExamSelection, FeatureFlags, ProgressState};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── KEYS ──────────────────────────────────────────────────────────────────────
//

/// Independently persisted records. Writes to different keys are not grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    ExamSelection,
    Progress,
    Auth,
    FeatureFlags,
}

impl StoreKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::ExamSelection => "exam-storage",
            StoreKey::Progress => "student-progress-storage",
            StoreKey::Auth => "auth-storage",
            StoreKey::FeatureFlags => "feature-flags",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PORT ──────────────────────────────────────────────────────────────────────
//

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError>;

    /// Store or replace the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn put(&self, key: StoreKey, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: StoreKey) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<StoreKey, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn put(&self, key: StoreKey, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

//
// ─── TYPED RECORDS ─────────────────────────────────────────────────────────────
//

/// Current layout version written into every envelope.
pub const RECORD_VERSION: u32 = 0;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope<T> {
    state: T,
}

/// Typed view of one key, stored as `{"state": …, "version": N}` JSON.
pub struct Record<T> {
    store: Arc<dyn KeyValueStore>,
    key: StoreKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> Record<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key: StoreKey) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    /// Load and decode the record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not a valid
    /// envelope for `T`, or other storage errors.
    pub async fn load(&self) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(self.key).await? else {
            return Ok(None);
        };
        let envelope: Envelope<T> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Serialization(format!("{}: {e}", self.key)))?;
        Ok(Some(envelope.state))
    }

    /// Encode and persist the record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save(&self, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&EnvelopeRef {
            state: value,
            version: RECORD_VERSION,
        })
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put(self.key, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(self.key).await
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates the persisted records over one key-value backend.
#[derive(Clone)]
pub struct Storage {
    pub exam_selection: Record<ExamSelection>,
    pub progress: Record<ProgressState>,
    pub auth: Record<AuthSession>,
    pub feature_flags: Record<FeatureFlags>,
}

impl Storage {
    #[must_use]
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            exam_selection: Record::new(Arc::clone(&store), StoreKey::ExamSelection),
            progress: Record::new(Arc::clone(&store), StoreKey::Progress),
            auth: Record::new(Arc::clone(&store), StoreKey::Auth),
            feature_flags: Record::new(store, StoreKey::FeatureFlags),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}
