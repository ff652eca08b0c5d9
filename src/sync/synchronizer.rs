//! Registry Synchronizer
//!
//! Reconciles the in-memory registry with the blob store by full-snapshot
//! read and full-snapshot overwrite.
//!
//! `commit` is last-writer-wins: two sessions committing from the same base
//! snapshot lose one side's pools. `commit_if_unchanged` narrows that window
//! by comparing snapshot versions first, but the store has no conditional
//! write, so a writer landing between the check and the write still wins.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::registry::Registry;

use super::store::{BlobStore, StoreError};

/// Default store key for the registry snapshot.
pub const POOLS_KEY: &str = "pools";

/// Domain separator for snapshot versions.
const SNAPSHOT_DOMAIN: &[u8] = b"AMMCIPHER_SNAPSHOT_V1";

/// Synchronizer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Store unreachable or refused the request.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Stored blob is not a valid registry snapshot.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// The in-memory registry could not be serialized. Nothing was written.
    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    /// Stored snapshot changed since it was read.
    #[error("snapshot changed: expected {expected}, found {found}")]
    Conflict {
        /// Version the caller based its change on.
        expected: SnapshotVersion,
        /// Version currently stored.
        found: SnapshotVersion,
    },
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => SyncError::StoreUnavailable(msg),
        }
    }
}

/// Content hash of a stored snapshot blob.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotVersion([u8; 32]);

impl SnapshotVersion {
    /// Version of raw blob bytes.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(SNAPSHOT_DOMAIN);
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Hash bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotVersion({})", self)
    }
}

/// A registry together with the version of the blob it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Parsed registry.
    pub registry: Registry,
    /// Version of the stored blob.
    pub version: SnapshotVersion,
}

/// Loads and commits the registry snapshot.
#[derive(Clone)]
pub struct RegistrySynchronizer {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl RegistrySynchronizer {
    /// Synchronizer over `store` using the default key.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_key(store, POOLS_KEY)
    }

    /// Synchronizer over `store` using a custom key.
    pub fn with_key(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Store key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    async fn read_raw(&self) -> Result<Vec<u8>, SyncError> {
        if !self.store.is_available().await? {
            return Err(SyncError::StoreUnavailable(format!(
                "store {} reports unavailable",
                self.store.address()
            )));
        }
        Ok(self.store.read_blob(&self.key).await?)
    }

    fn parse(bytes: &[u8]) -> Result<Registry, SyncError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Registry::new());
        }
        Registry::from_json_bytes(bytes).map_err(|e| SyncError::CorruptSnapshot(e.to_string()))
    }

    /// Strict load: corrupt snapshots are returned as errors.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn try_load(&self) -> Result<Snapshot, SyncError> {
        let bytes = self.read_raw().await?;
        let version = SnapshotVersion::of_bytes(&bytes);
        let registry = Self::parse(&bytes)?;

        debug!(pools = registry.len(), %version, "snapshot loaded");
        Ok(Snapshot { registry, version })
    }

    /// Lenient load: a corrupt snapshot is logged and read as empty.
    pub async fn load(&self) -> Result<Registry, SyncError> {
        self.load_snapshot().await.map(|s| s.registry)
    }

    /// Lenient load that keeps the version.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn load_snapshot(&self) -> Result<Snapshot, SyncError> {
        let bytes = self.read_raw().await?;
        let version = SnapshotVersion::of_bytes(&bytes);

        let registry = match Self::parse(&bytes) {
            Ok(registry) => registry,
            Err(SyncError::CorruptSnapshot(reason)) => {
                warn!(%reason, "ignoring corrupt snapshot");
                Registry::new()
            }
            Err(e) => return Err(e),
        };

        debug!(pools = registry.len(), %version, "snapshot loaded");
        Ok(Snapshot { registry, version })
    }

    /// Overwrite the stored snapshot with `registry`. Last writer wins.
    #[instrument(skip(self, registry), fields(key = %self.key, pools = registry.len()))]
    pub async fn commit(&self, registry: &Registry) -> Result<SnapshotVersion, SyncError> {
        let bytes = registry
            .to_json_bytes()
            .map_err(|e| SyncError::Encode(e.to_string()))?;
        let version = SnapshotVersion::of_bytes(&bytes);

        self.store.write_blob(&self.key, bytes).await?;
        info!(%version, "registry committed");
        Ok(version)
    }

    /// Commit only if the stored snapshot still has version `expected`.
    pub async fn commit_if_unchanged(
        &self,
        registry: &Registry,
        expected: &SnapshotVersion,
    ) -> Result<SnapshotVersion, SyncError> {
        let current = SnapshotVersion::of_bytes(&self.read_raw().await?);
        if current != *expected {
            warn!(key = %self.key, %expected, found = %current, "snapshot changed under us");
            return Err(SyncError::Conflict {
                expected: *expected,
                found: current,
            });
        }
        self.commit(registry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::TaggedBase64Cipher;
    use crate::registry::PoolDraft;
    use crate::sync::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, RegistrySynchronizer) {
        let store = Arc::new(MemoryStore::new("0xstore"));
        let sync = RegistrySynchronizer::new(store.clone());
        (store, sync)
    }

    fn with_pool(registry: &Registry, name: &str) -> Registry {
        let pool = registry
            .create_at(&PoolDraft::new(name, "1", "0.1"), "0xA", &TaggedBase64Cipher, 0)
            .unwrap();
        registry.append(pool)
    }

    #[tokio::test]
    async fn test_empty_store_loads_empty() {
        let (_, sync) = setup();
        assert!(sync.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_blob_loads_empty() {
        let (store, sync) = setup();
        store.write_blob(POOLS_KEY, b"  \n".to_vec()).await.unwrap();
        assert!(sync.try_load().await.unwrap().registry.is_empty());
    }

    #[tokio::test]
    async fn test_commit_then_load() {
        let (_, sync) = setup();
        let registry = with_pool(&Registry::new(), "ETH-USDC");

        sync.commit(&registry).await.unwrap();
        let loaded = sync.load().await.unwrap();
        assert_eq!(loaded, registry);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_degrades() {
        let (store, sync) = setup();
        store.write_blob(POOLS_KEY, b"{broken".to_vec()).await.unwrap();

        assert!(matches!(sync.try_load().await, Err(SyncError::CorruptSnapshot(_))));
        assert!(sync.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let (store, sync) = setup();
        store.set_available(false);
        assert!(matches!(sync.load().await, Err(SyncError::StoreUnavailable(_))));
        assert!(matches!(
            sync.commit(&Registry::new()).await,
            Err(SyncError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let (_, sync) = setup();
        let base = sync.load().await.unwrap();

        // Two sessions start from the same empty base
        let first = with_pool(&base, "first");
        let second = with_pool(&base, "second");

        sync.commit(&first).await.unwrap();
        sync.commit(&second).await.unwrap();

        let loaded = sync.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.pools()[0].name, "second");
    }

    #[tokio::test]
    async fn test_commit_if_unchanged_detects_race() {
        let (_, sync) = setup();
        let base = sync.try_load().await.unwrap();

        let first = with_pool(&base.registry, "first");
        let second = with_pool(&base.registry, "second");

        let v1 = sync.commit_if_unchanged(&first, &base.version).await.unwrap();
        let result = sync.commit_if_unchanged(&second, &base.version).await;
        assert!(matches!(result, Err(SyncError::Conflict { .. })));

        // Retry on the fresh snapshot succeeds
        let fresh = sync.try_load().await.unwrap();
        assert_eq!(fresh.version, v1);
        let merged = with_pool(&fresh.registry, "second");
        sync.commit_if_unchanged(&merged, &fresh.version).await.unwrap();
        assert_eq!(sync.load().await.unwrap().len(), 2);
    }

    /// Serves reads and writes but reports itself unavailable.
    struct DrainingStore(MemoryStore);

    #[async_trait::async_trait]
    impl BlobStore for DrainingStore {
        async fn read_blob(&self, key: &str) -> Result<Vec<u8>, StoreError> {
            self.0.read_blob(key).await
        }

        async fn write_blob(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
            self.0.write_blob(key, bytes).await
        }

        async fn is_available(&self) -> Result<bool, StoreError> {
            Ok(false)
        }

        fn address(&self) -> String {
            self.0.address()
        }
    }

    #[tokio::test]
    async fn test_conditional_commit_honors_availability() {
        let store = Arc::new(DrainingStore(MemoryStore::new("0xstore")));
        let sync = RegistrySynchronizer::new(store.clone());
        let empty = SnapshotVersion::of_bytes(&[]);

        let load = sync.try_load().await;
        let commit = sync
            .commit_if_unchanged(&with_pool(&Registry::new(), "x"), &empty)
            .await;

        assert!(matches!(load, Err(SyncError::StoreUnavailable(_))));
        assert_eq!(commit, load.map(|s| s.version));
        assert_eq!(store.0.write_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_key() {
        let store = Arc::new(MemoryStore::new("0xstore"));
        let sync = RegistrySynchronizer::with_key(store.clone(), "pools-v2");
        sync.commit(&with_pool(&Registry::new(), "x")).await.unwrap();

        assert!(store.read_blob(POOLS_KEY).await.unwrap().is_empty());
        assert!(!store.read_blob("pools-v2").await.unwrap().is_empty());
    }
}
