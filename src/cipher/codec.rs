//! Ciphertext Token Codec
//!
//! Converts plaintext figures to opaque tokens and back.
//!
//! ## Token format
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  tagged:    "FHE-" + base64(decimal text)   "FHE-MTA="   │
//! │  untagged:  bare decimal text (legacy)      "10"         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `encode` always emits the tagged form. `decode` accepts both so that pools
//! written by older clients stay readable.
//!
//! The reversible encoding is a placeholder and offers no confidentiality.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix marking a token produced by [`TaggedBase64Cipher`].
pub const TOKEN_TAG: &str = "FHE-";

/// Opaque ciphertext token as stored in the registry.
///
/// Serialized as a plain JSON string so the wire format stays compatible with
/// other readers of the same store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CipherToken(String);

impl CipherToken {
    /// Wrap raw token text without validating it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token carries the [`TOKEN_TAG`] prefix.
    pub fn is_tagged(&self) -> bool {
        self.0.starts_with(TOKEN_TAG)
    }
}

impl fmt::Display for CipherToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Token does not follow the tagging convention or its payload is not a
    /// finite number.
    #[error("malformed token: {0}")]
    MalformedToken(String),
}

/// Strategy for turning plaintext figures into tokens.
///
/// Implementations must be pure and satisfy `decode(&encode(v)) == Ok(v)` for
/// every finite `v`.
pub trait ValueCipher: Send + Sync {
    /// Encode a plaintext value.
    fn encode(&self, value: f64) -> CipherToken;

    /// Decode a token back to its plaintext value.
    fn decode(&self, token: &CipherToken) -> Result<f64, CodecError>;
}

/// Default cipher: tagged base64 of the shortest decimal representation.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaggedBase64Cipher;

impl TaggedBase64Cipher {
    /// Create the cipher.
    pub fn new() -> Self {
        Self
    }
}

impl ValueCipher for TaggedBase64Cipher {
    fn encode(&self, value: f64) -> CipherToken {
        // f64 Display is the shortest text that parses back to the same value
        let payload = STANDARD.encode(value.to_string());
        CipherToken(format!("{}{}", TOKEN_TAG, payload))
    }

    fn decode(&self, token: &CipherToken) -> Result<f64, CodecError> {
        let raw = token.as_str();
        match raw.strip_prefix(TOKEN_TAG) {
            Some(payload) => {
                let bytes = STANDARD
                    .decode(payload)
                    .map_err(|e| CodecError::MalformedToken(format!("invalid base64: {}", e)))?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| CodecError::MalformedToken("payload is not utf-8".into()))?;
                parse_finite(&text)
            }
            None => parse_finite(raw),
        }
    }
}

fn parse_finite(text: &str) -> Result<f64, CodecError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| CodecError::MalformedToken(format!("not a number: {:?}", text)))?;

    if !value.is_finite() {
        return Err(CodecError::MalformedToken(format!("not finite: {:?}", text)));
    }

    Ok(value)
}

// =============================================================================
// TESTS
// =============================================================================
