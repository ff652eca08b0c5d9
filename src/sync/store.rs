//! External blob store.
//!
//! The contract storage the registry lives in is modeled as an opaque
//! key → bytes map. Keys are overwritten whole; there is no conditional
//! write.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Byte-oriented key/value store collaborator.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob. A missing key reads as empty.
    async fn read_blob(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Overwrite a blob.
    async fn write_blob(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Whether the store is accepting requests.
    async fn is_available(&self) -> Result<bool, StoreError> {
        Ok(true)
    }

    /// Address of the contract backing this store.
    fn address(&self) -> String;
}

/// In-process store.
pub struct MemoryStore {
    address: String,
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Empty store reporting `address` as its contract address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            blobs: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    /// Take the store offline (or back online).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("{} is offline", self.address)))
        }
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn read_blob(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.ensure_online()?;
        let blobs = self.blobs.read().await;
        Ok(blobs.get(key).cloned().unwrap_or_default())
    }

    async fn write_blob(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.ensure_online()?;
        debug!(key, len = bytes.len(), "blob written");
        let mut blobs = self.blobs.write().await;
        blobs.insert(key.to_string(), bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_available(&self) -> Result<bool, StoreError> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    fn address(&self) -> String {
        self.address.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_reads_empty() {
        let store = MemoryStore::new("0xstore");
        assert!(store.read_blob("pools").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let store = MemoryStore::new("0xstore");
        store.write_blob("pools", b"one".to_vec()).await.unwrap();
        store.write_blob("pools", b"two".to_vec()).await.unwrap();

        assert_eq!(store.read_blob("pools").await.unwrap(), b"two");
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_offline_store() {
        let store = MemoryStore::new("0xstore");
        store.set_available(false);

        assert_eq!(store.is_available().await, Ok(false));
        assert!(matches!(
            store.read_blob("pools").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.write_blob("pools", vec![]).await.is_err());
        assert_eq!(store.write_count(), 0);
    }
}
