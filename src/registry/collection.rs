//! Pool Registry
//!
//! Ordered, append-only, copy-on-write collection of confidential pools.
//! `append` hands back a new registry and leaves the receiver untouched, so a
//! reader holding the previous snapshot never sees it change under it.

use std::sync::Arc;

use serde::Deserialize;

use crate::cipher::ValueCipher;

use super::pool::{ConfidentialPool, PoolDraft, RegistryError};

/// Ordered sequence of pools.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    pools: Arc<Vec<ConfidentialPool>>,
}

/// Accepted snapshot layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotForm {
    /// `[ {...}, ... ]` as written by this crate.
    Bare(Vec<ConfidentialPool>),
    /// `{ "pools": [ ... ] }`.
    Wrapped { pools: Vec<ConfidentialPool> },
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `pools` in the given order.
    pub fn from_pools(pools: Vec<ConfidentialPool>) -> Self {
        Self {
            pools: Arc::new(pools),
        }
    }

    /// Number of pools.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether the registry has no pools.
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// All pools in insertion order.
    pub fn pools(&self) -> &[ConfidentialPool] {
        &self.pools
    }

    /// Pool by id.
    pub fn get(&self, id: u64) -> Option<&ConfidentialPool> {
        self.pools.iter().find(|p| p.id == id)
    }

    /// Id the next created pool receives.
    pub fn next_id(&self) -> u64 {
        self.pools.len() as u64 + 1
    }

    /// Build a new pool from user input, stamped with the current time.
    /// The registry itself is not modified; pass the result to [`append`](Self::append).
    pub fn create(
        &self,
        draft: &PoolDraft,
        creator: &str,
        cipher: &dyn ValueCipher,
    ) -> Result<ConfidentialPool, RegistryError> {
        self.create_at(draft, creator, cipher, chrono::Utc::now().timestamp())
    }

    /// [`create`](Self::create) with an explicit creation time.
    pub fn create_at(
        &self,
        draft: &PoolDraft,
        creator: &str,
        cipher: &dyn ValueCipher,
        created_at: i64,
    ) -> Result<ConfidentialPool, RegistryError> {
        draft.seal(self.next_id(), creator, created_at, cipher)
    }

    /// New registry with `pool` appended.
    pub fn append(&self, pool: ConfidentialPool) -> Registry {
        let mut pools = Vec::with_capacity(self.pools.len() + 1);
        pools.extend(self.pools.iter().cloned());
        pools.push(pool);
        Self::from_pools(pools)
    }

    /// Pools whose name or creator contains `text`, ignoring case.
    pub fn filter(&self, text: &str) -> Vec<&ConfidentialPool> {
        let needle = text.to_lowercase();
        self.pools
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .collect()
    }

    /// Serialize to the store's wire format (UTF-8 JSON array).
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&*self.pools)
    }

    /// Parse the store's wire format. Accepts the bare array and the
    /// `{"pools": [...]}` wrapper.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let form: SnapshotForm = serde_json::from_slice(bytes)?;
        let pools = match form {
            SnapshotForm::Bare(pools) => pools,
            SnapshotForm::Wrapped { pools } => pools,
        };
        Ok(Self::from_pools(pools))
    }
}
