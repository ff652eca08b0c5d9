//! Crate-level error taxonomy.
//!
//! Module errors convert into [`AmmError`] so a caller sees one enum with a
//! variant per user-visible failure.

use thiserror::Error;

use crate::auth::ChallengeError;
use crate::cipher::CodecError;
use crate::registry::RegistryError;
use crate::sync::{SnapshotVersion, SyncError};

/// Every failure the core reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    /// No wallet account connected.
    #[error("wallet not connected")]
    WalletNotConnected,

    /// The user declined the signature prompt.
    #[error("user declined signature")]
    UserDeclinedSignature,

    /// Other wallet failure.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Blob store unreachable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Stored snapshot could not be parsed.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Registry could not be serialized for the store.
    #[error("failed to encode snapshot: {0}")]
    SnapshotEncoding(String),

    /// Stored snapshot changed since it was read.
    #[error("snapshot changed: expected {expected}, found {found}")]
    SnapshotConflict {
        /// Version the change was based on.
        expected: SnapshotVersion,
        /// Version found in the store.
        found: SnapshotVersion,
    },

    /// Token does not decode.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Create-pool input rejected.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Signature could not be parsed or does not come from the wallet.
    #[error("signature rejected: {0}")]
    SignatureMismatch(String),

    /// Signature belongs to a superseded challenge.
    #[error("signature is for a superseded challenge")]
    StaleChallenge,

    /// Challenge window does not contain the current time.
    #[error("challenge expired")]
    ChallengeExpired,

    /// No pool with that id.
    #[error("pool {0} not found")]
    PoolNotFound(u64),
}

impl AmmError {
    /// Whether the user simply said no. Such outcomes leave every piece of
    /// state unchanged and are not failures of the system.
    pub fn is_user_declined(&self) -> bool {
        matches!(self, Self::UserDeclinedSignature)
    }
}

impl From<CodecError> for AmmError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedToken(msg) => Self::MalformedToken(msg),
        }
    }
}

impl From<RegistryError> for AmmError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ValidationFailed(msg) => Self::ValidationFailed(msg),
        }
    }
}

impl From<SyncError> for AmmError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
            SyncError::CorruptSnapshot(msg) => Self::CorruptSnapshot(msg),
            SyncError::Encode(msg) => Self::SnapshotEncoding(msg),
            SyncError::Conflict { expected, found } => Self::SnapshotConflict { expected, found },
        }
    }
}

impl From<ChallengeError> for AmmError {
    fn from(err: ChallengeError) -> Self {
        match err {
            ChallengeError::WalletNotConnected => Self::WalletNotConnected,
            ChallengeError::UserDeclined => Self::UserDeclinedSignature,
            ChallengeError::Wallet(msg) => Self::Wallet(msg),
            e @ ChallengeError::InvalidSignature(_) => Self::SignatureMismatch(e.to_string()),
            e @ ChallengeError::SignatureMismatch { .. } => Self::SignatureMismatch(e.to_string()),
            ChallengeError::StaleChallenge => Self::StaleChallenge,
            ChallengeError::Expired { .. } => Self::ChallengeExpired,
            ChallengeError::Codec(codec) => codec.into(),
        }
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, AmmError>;
