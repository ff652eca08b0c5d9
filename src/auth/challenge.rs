//! Decryption Challenge
//!
//! Canonical text a wallet signs to authorize decryption for a time window.
//!
//! ## Wire format
//!
//! ```text
//! publickey:<session public key>
//! contractAddresses:<contract address>
//! contractsChainId:<chain id>
//! startTimestamp:<unix seconds>
//! durationDays:<days>
//! ```
//!
//! Field order and key spelling are fixed; external verifiers rebuild the
//! same text byte for byte. No trailing newline.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::cipher::CodecError;

/// Seconds in one validity day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Random bytes behind a session public key (2000 hex digits).
const PUBLIC_KEY_BYTES: usize = 1000;

/// Domain separator for challenge ids.
const CHALLENGE_DOMAIN: &[u8] = b"AMMCIPHER_CHALLENGE_V1";

/// Errors from the challenge / reveal path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// No wallet account connected.
    #[error("wallet not connected")]
    WalletNotConnected,

    /// The user declined the signature prompt.
    #[error("user declined signature")]
    UserDeclined,

    /// Other wallet failure.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Signature bytes could not be parsed or recovered.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Signature was produced by another key.
    #[error("signature signer {recovered} does not match {expected}")]
    SignatureMismatch {
        /// Address the caller expected.
        expected: String,
        /// Address recovered from the signature.
        recovered: String,
    },

    /// Signed message is not the current challenge.
    #[error("signature is for a superseded challenge")]
    StaleChallenge,

    /// Current time is outside the challenge window.
    #[error("challenge window [{valid_from}, {expires_at}) does not contain {now}")]
    Expired {
        /// Window start.
        valid_from: i64,
        /// Window end (exclusive).
        expires_at: i64,
        /// Time of the check.
        now: i64,
    },

    /// Authorized, but the token itself is malformed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Parameters a decryption authorization is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionChallenge {
    /// Session public key.
    pub public_key: String,
    /// Contract holding the confidential data.
    pub contract_address: String,
    /// Chain the contract lives on.
    pub chain_id: u64,
    /// Window start (Unix seconds).
    pub valid_from: i64,
    /// Window length in days.
    pub duration_days: u32,
}

impl DecryptionChallenge {
    /// Create a challenge.
    pub fn new(
        public_key: impl Into<String>,
        contract_address: impl Into<String>,
        chain_id: u64,
        valid_from: i64,
        duration_days: u32,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            contract_address: contract_address.into(),
            chain_id,
            valid_from,
            duration_days,
        }
    }

    /// Canonical message text.
    pub fn message(&self) -> String {
        build_challenge(
            &self.public_key,
            &self.contract_address,
            self.chain_id,
            self.valid_from,
            self.duration_days,
        )
    }

    /// End of the validity window (exclusive).
    pub fn expires_at(&self) -> i64 {
        self.valid_from
            .saturating_add(i64::from(self.duration_days) * SECONDS_PER_DAY)
    }

    /// Whether `now` falls inside the window.
    pub fn is_valid_at(&self, now: i64) -> bool {
        now >= self.valid_from && now < self.expires_at()
    }

    /// Check the window, with a typed error.
    pub fn check_window(&self, now: i64) -> Result<(), ChallengeError> {
        if self.is_valid_at(now) {
            Ok(())
        } else {
            Err(ChallengeError::Expired {
                valid_from: self.valid_from,
                expires_at: self.expires_at(),
                now,
            })
        }
    }

    /// Short identifier for logs (first 8 bytes of a domain-separated
    /// SHA-256 of the message).
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(CHALLENGE_DOMAIN);
        hasher.update(self.message().as_bytes());
        let hash = hasher.finalize();
        hex::encode(&hash[..8])
    }
}

/// Build the canonical challenge message.
pub fn build_challenge(
    public_key: &str,
    contract_address: &str,
    chain_id: u64,
    valid_from: i64,
    duration_days: u32,
) -> String {
    [
        format!("publickey:{}", public_key),
        format!("contractAddresses:{}", contract_address),
        format!("contractsChainId:{}", chain_id),
        format!("startTimestamp:{}", valid_from),
        format!("durationDays:{}", duration_days),
    ]
    .join("\n")
}

/// Fresh session public key: `0x` followed by 2000 lowercase hex digits.
pub fn generate_public_key() -> String {
    let mut bytes = vec![0u8; PUBLIC_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
