//! Wallet Signature Verification
//!
//! Wallets sign challenge text with EIP-191 `personal_sign`:
//!
//! ```text
//! digest    = keccak256("\x19Ethereum Signed Message:\n" + len(msg) + msg)
//! signature = r (32) || s (32) || v (1)      v ∈ {0, 1, 27, 28}
//! address   = keccak256(uncompressed_pubkey[1..])[12..]
//! ```

use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use super::challenge::ChallengeError;

/// Raw signature bytes returned by a wallet.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSignature(Vec<u8>);

impl WalletSignature {
    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a `0x`-prefixed (or bare) hex signature.
    pub fn from_hex(text: &str) -> Result<Self, hex::FromHexError> {
        let trimmed = text.strip_prefix("0x").unwrap_or(text);
        hex::decode(trimmed).map(Self)
    }

    /// Signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for WalletSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletSignature({})", self.to_hex())
    }
}

/// Decides whether a signature authorizes a decryption for `expected_signer`.
pub trait SignatureVerifier: Send + Sync {
    /// Check `signature` over `message` against the wallet address.
    fn verify(
        &self,
        message: &str,
        signature: &WalletSignature,
        expected_signer: &str,
    ) -> Result<(), ChallengeError>;
}

/// Accepts any signature the wallet produced.
///
/// Authorization is trusted transitively through the wallet's own approval
/// prompt. Only selected when signature verification is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrustWallet;

impl SignatureVerifier for TrustWallet {
    fn verify(&self, _: &str, _: &WalletSignature, _: &str) -> Result<(), ChallengeError> {
        Ok(())
    }
}

/// Recovers the secp256k1 signer of a `personal_sign` signature and compares
/// it with the expected address.
#[derive(Clone, Copy, Debug, Default)]
pub struct PersonalSignVerifier;

impl SignatureVerifier for PersonalSignVerifier {
    fn verify(
        &self,
        message: &str,
        signature: &WalletSignature,
        expected_signer: &str,
    ) -> Result<(), ChallengeError> {
        let recovered = recover_signer(message, signature)?;
        if addresses_match(&recovered, expected_signer) {
            Ok(())
        } else {
            Err(ChallengeError::SignatureMismatch {
                expected: expected_signer.to_string(),
                recovered,
            })
        }
    }
}

/// EIP-191 digest of a text message.
pub fn personal_sign_digest(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Address (`0x` + 40 lowercase hex) of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_signer(message: &str, signature: &WalletSignature) -> Result<String, ChallengeError> {
    let bytes = signature.as_bytes();
    if bytes.len() != 65 {
        return Err(ChallengeError::InvalidSignature(format!(
            "expected 65 bytes, got {}",
            bytes.len()
        )));
    }

    let sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| ChallengeError::InvalidSignature(e.to_string()))?;

    let v = bytes[64];
    let v = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| ChallengeError::InvalidSignature(format!("bad recovery id {}", bytes[64])))?;

    let digest = personal_sign_digest(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|e| ChallengeError::InvalidSignature(e.to_string()))?;

    Ok(address_of(&key))
}

/// Case-insensitive address comparison (checksummed vs lowercase).
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
