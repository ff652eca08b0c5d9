//! # AmmCipher Core
//!
//! Confidential value lifecycle for an AMM whose pool figures are stored as
//! ciphertext and only revealed to a viewer who signs a decryption challenge.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      AMMCIPHER CORE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  cipher/         - Ciphertext tokens                         │
//! │  └── codec.rs    - Swappable cipher, tagged base64 default   │
//! │                                                              │
//! │  auth/           - Challenge protocol                        │
//! │  ├── challenge.rs- Canonical challenge text and window       │
//! │  ├── wallet.rs   - Wallet / chain collaborators              │
//! │  ├── signature.rs- EIP-191 signer recovery                   │
//! │  └── gate.rs     - Signature-gated decryption                │
//! │                                                              │
//! │  registry/       - Pool registry (pure)                      │
//! │  ├── pool.rs     - Pool record, create-pool input            │
//! │  ├── collection.rs- Copy-on-write registry, wire format      │
//! │  └── stats.rs    - Aggregates over revealed values           │
//! │                                                              │
//! │  sync/           - Registry synchronizer (I/O)               │
//! │  ├── store.rs    - Blob store collaborator                   │
//! │  └── synchronizer.rs - Snapshot load / commit                │
//! │                                                              │
//! │  session/        - Per-user orchestration                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Confidentiality
//!
//! Pool figures are written to the store only as tokens. Plaintext exists
//! only in decode results and the session's reveal cache. The default
//! [`TaggedBase64Cipher`] is a reversible placeholder, not encryption; a real
//! scheme plugs in through [`ValueCipher`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cipher;
pub mod error;
pub mod registry;
pub mod session;
pub mod sync;

// Re-export commonly used types
pub use auth::{build_challenge, DecryptionChallenge, DecryptionGate, Wallet, WalletSignature};
pub use cipher::{CipherToken, TaggedBase64Cipher, ValueCipher};
pub use error::{AmmError, Result};
pub use registry::{ConfidentialField, ConfidentialPool, PoolDraft, PoolStats, Registry};
pub use session::{AmmConfig, ConfidentialAmm, StatusNotice};
pub use sync::{BlobStore, MemoryStore, RegistrySynchronizer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
