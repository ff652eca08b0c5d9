//! Wallet and chain collaborators.
//!
//! The core never holds user keys. It asks a [`Wallet`] for its address and
//! for a signature over challenge text, and a [`ChainProvider`] for the chain
//! id that goes into the challenge.

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use rand::RngCore;
use thiserror::Error;
use tracing::debug;

use super::signature::{address_of, personal_sign_digest, WalletSignature};

/// Wallet collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The user declined the signature prompt.
    #[error("signature request rejected by user")]
    Rejected,

    /// No account is connected.
    #[error("wallet not connected")]
    NotConnected,

    /// Any other provider failure.
    #[error("wallet provider error: {0}")]
    Provider(String),
}

impl WalletError {
    /// Classify a provider error message.
    ///
    /// Browser wallets report a declined prompt only through message text.
    pub fn from_provider_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("user rejected") || lower.contains("user denied") {
            Self::Rejected
        } else {
            Self::Provider(message.to_string())
        }
    }
}

/// A connected (or not) signing wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Connected account address, if any.
    fn address(&self) -> Option<String>;

    /// Ask the user to sign `message`. This suspends until the user answers.
    async fn sign_message(&self, message: &str) -> Result<WalletSignature, WalletError>;
}

/// Source of the current chain id.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Current chain id.
    async fn chain_id(&self) -> Result<u64, WalletError>;
}

/// Chain provider pinned to one chain id.
#[derive(Clone, Copy, Debug)]
pub struct FixedChain(pub u64);

#[async_trait]
impl ChainProvider for FixedChain {
    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.0)
    }
}

/// In-process secp256k1 wallet that signs with EIP-191 `personal_sign`.
pub struct LocalWallet {
    key: SigningKey,
    address: String,
    connected: bool,
    declines: bool,
}

impl LocalWallet {
    /// Create a wallet from a 32-byte secret key.
    pub fn from_secret(secret: [u8; 32]) -> Result<Self, WalletError> {
        let key = SigningKey::from_slice(&secret)
            .map_err(|e| WalletError::Provider(format!("invalid secret key: {}", e)))?;
        Ok(Self::from_key(key))
    }

    /// Create a wallet with a fresh random key.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut secret = [0u8; 32];
            rng.fill_bytes(&mut secret);
            // Out-of-range scalars are astronomically rare; draw again
            if let Ok(key) = SigningKey::from_slice(&secret) {
                return Self::from_key(key);
            }
        }
    }

    fn from_key(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self {
            key,
            address,
            connected: true,
            declines: false,
        }
    }

    /// Same wallet, but every signature prompt is declined.
    pub fn declining(mut self) -> Self {
        self.declines = true;
        self
    }

    /// Same wallet, reported as not connected.
    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    fn address(&self) -> Option<String> {
        self.connected.then(|| self.address.clone())
    }

    async fn sign_message(&self, message: &str) -> Result<WalletSignature, WalletError> {
        if !self.connected {
            return Err(WalletError::NotConnected);
        }
        if self.declines {
            return Err(WalletError::Rejected);
        }

        let digest = personal_sign_digest(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| WalletError::Provider(e.to_string()))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);

        debug!(signer = %self.address, "signed challenge");
        Ok(WalletSignature::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_classification() {
        assert_eq!(
            WalletError::from_provider_message("MetaMask: User rejected the request."),
            WalletError::Rejected
        );
        assert_eq!(
            WalletError::from_provider_message("user denied message signature"),
            WalletError::Rejected
        );
        assert!(matches!(
            WalletError::from_provider_message("network timeout"),
            WalletError::Provider(_)
        ));
    }

    #[test]
    fn test_address_format() {
        let wallet = LocalWallet::from_secret([9u8; 32]).unwrap();
        let address = wallet.address().unwrap();
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 42);
    }

    #[test]
    fn test_same_secret_same_address() {
        let a = LocalWallet::from_secret([3u8; 32]).unwrap();
        let b = LocalWallet::from_secret([3u8; 32]).unwrap();
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), LocalWallet::random().address());
    }

    #[test]
    fn test_zero_secret_rejected() {
        assert!(LocalWallet::from_secret([0u8; 32]).is_err());
    }

    #[tokio::test]
    async fn test_declining_wallet() {
        let wallet = LocalWallet::from_secret([1u8; 32]).unwrap().declining();
        assert_eq!(wallet.sign_message("x").await, Err(WalletError::Rejected));
    }

    #[tokio::test]
    async fn test_disconnected_wallet() {
        let wallet = LocalWallet::from_secret([1u8; 32]).unwrap().disconnected();
        assert!(wallet.address().is_none());
        assert_eq!(wallet.sign_message("x").await, Err(WalletError::NotConnected));
    }

    #[tokio::test]
    async fn test_signature_shape() {
        let wallet = LocalWallet::from_secret([1u8; 32]).unwrap();
        let sig = wallet.sign_message("x").await.unwrap();
        assert_eq!(sig.as_bytes().len(), 65);
        assert!(sig.as_bytes()[64] == 27 || sig.as_bytes()[64] == 28);
    }

    #[tokio::test]
    async fn test_fixed_chain() {
        assert_eq!(FixedChain(11155111).chain_id().await, Ok(11155111));
    }
}
