//! Signature-gated decryption.
//!
//! Reveal flow:
//!
//! ```text
//! challenge.message() ──► wallet.sign_message() ──► verify ──► cipher.decode()
//!                          (may be declined)        │
//!                                                   ├─ message == current challenge
//!                                                   ├─ now inside window
//!                                                   └─ signer == wallet address
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cipher::{CipherToken, ValueCipher};

use super::challenge::{ChallengeError, DecryptionChallenge};
use super::signature::{SignatureVerifier, WalletSignature};
use super::wallet::{Wallet, WalletError};

/// Ask the wallet to sign the challenge message.
///
/// A declined prompt maps to [`ChallengeError::UserDeclined`] so callers can
/// tell it apart from other failures.
pub async fn request_authorization(
    wallet: &dyn Wallet,
    message: &str,
) -> Result<WalletSignature, ChallengeError> {
    if wallet.address().is_none() {
        return Err(ChallengeError::WalletNotConnected);
    }

    wallet.sign_message(message).await.map_err(|e| match e {
        WalletError::Rejected => ChallengeError::UserDeclined,
        WalletError::NotConnected => ChallengeError::WalletNotConnected,
        WalletError::Provider(msg) => ChallengeError::Wallet(msg),
    })
}

/// Decrypts tokens for one challenge once a signature is presented.
#[derive(Clone)]
pub struct DecryptionGate {
    challenge: DecryptionChallenge,
    message: String,
    cipher: Arc<dyn ValueCipher>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl DecryptionGate {
    /// Create a gate for `challenge`.
    pub fn new(
        challenge: DecryptionChallenge,
        cipher: Arc<dyn ValueCipher>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        let message = challenge.message();
        Self {
            challenge,
            message,
            cipher,
            verifier,
        }
    }

    /// Challenge this gate authorizes against.
    pub fn challenge(&self) -> &DecryptionChallenge {
        &self.challenge
    }

    /// Message the wallet must sign.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check the authorization, then decode.
    pub fn try_decrypt_field(
        &self,
        token: &CipherToken,
        message: &str,
        signature: &WalletSignature,
        signer: &str,
        now: i64,
    ) -> Result<f64, ChallengeError> {
        if message != self.message {
            return Err(ChallengeError::StaleChallenge);
        }
        self.challenge.check_window(now)?;
        self.verifier.verify(message, signature, signer)?;

        let value = self.cipher.decode(token)?;
        debug!(challenge = %self.challenge.id(), "field decrypted");
        Ok(value)
    }

    /// Like [`try_decrypt_field`](Self::try_decrypt_field) but any failure
    /// becomes `None`.
    pub fn decrypt_field(
        &self,
        token: &CipherToken,
        message: &str,
        signature: &WalletSignature,
        signer: &str,
        now: i64,
    ) -> Option<f64> {
        match self.try_decrypt_field(token, message, signature, signer, now) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "decryption refused");
                None
            }
        }
    }
}
