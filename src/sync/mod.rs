//! Registry Synchronizer
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  store.rs         - Blob store collaborator, memory store   │
//! │  synchronizer.rs  - Snapshot load / commit                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod store;
pub mod synchronizer;

pub use store::{BlobStore, MemoryStore, StoreError};
pub use synchronizer::{RegistrySynchronizer, Snapshot, SnapshotVersion, SyncError, POOLS_KEY};
