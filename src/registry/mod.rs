//! Pool Registry
//!
//! In-memory model of confidential pools.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  pool.rs        - Pool record, create-pool input            │
//! │  collection.rs  - Copy-on-write registry, filter, wire form │
//! │  stats.rs       - Aggregates over revealed values           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod collection;
pub mod pool;
pub mod stats;

pub use collection::Registry;
pub use pool::{parse_amount, ConfidentialField, ConfidentialPool, PoolDraft, RegistryError};
pub use stats::{PoolReveal, PoolStats, RevealedValues};
