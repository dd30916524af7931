use std::sync::Arc;

use async_trait::async_trait;
use storage::repository::{KeyValueStore, Storage, StorageError, StoreKey};

/// Reads as empty and refuses every write.
pub struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: StoreKey) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn put(&self, _key: StoreKey, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }

    async fn remove(&self, _key: StoreKey) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}

pub fn read_only_storage() -> Storage {
    Storage::from_store(Arc::new(ReadOnlyStore))
}
