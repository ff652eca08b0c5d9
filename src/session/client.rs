//! Confidential AMM client.
//!
//! One client per user session. It sequences the core components:
//!
//! ```text
//! create:  draft ─► Registry::create ─► append ─► commit ─► load
//! reveal:  challenge ─► wallet signs ─► delay ─► gate checks ─► decode
//! ```
//!
//! Operations within a session run strictly in order (each awaits the
//! previous store call), so a pool created here is visible to the next
//! `refresh`. Nothing orders two sessions against each other.
//!
//! Locks are always taken in the order gate, registry, revealed.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{
    generate_public_key, request_authorization, ChainProvider, DecryptionChallenge,
    DecryptionGate, PersonalSignVerifier, SignatureVerifier, TrustWallet, Wallet,
};
use crate::cipher::{CipherToken, TaggedBase64Cipher, ValueCipher};
use crate::error::{AmmError, Result};
use crate::registry::{
    ConfidentialField, ConfidentialPool, PoolDraft, PoolStats, Registry, RevealedValues,
};
use crate::sync::{BlobStore, RegistrySynchronizer};

use super::config::AmmConfig;
use super::notice::StatusNotice;

/// Client facade over the confidential pool lifecycle.
pub struct ConfidentialAmm {
    id: Uuid,
    config: AmmConfig,
    sync: RegistrySynchronizer,
    wallet: Arc<dyn Wallet>,
    chain: Arc<dyn ChainProvider>,
    cipher: Arc<dyn ValueCipher>,
    verifier: Arc<dyn SignatureVerifier>,
    registry: RwLock<Registry>,
    gate: RwLock<DecryptionGate>,
    revealed: RwLock<RevealedValues>,
}

impl ConfidentialAmm {
    /// Start a session: build the first challenge and load the registry.
    ///
    /// A failed initial load is logged and leaves the registry empty; call
    /// [`refresh`](Self::refresh) to retry.
    #[instrument(skip_all)]
    pub async fn connect(
        store: Arc<dyn BlobStore>,
        wallet: Arc<dyn Wallet>,
        chain: Arc<dyn ChainProvider>,
        config: AmmConfig,
    ) -> Result<Self> {
        let cipher: Arc<dyn ValueCipher> = Arc::new(TaggedBase64Cipher);
        let verifier: Arc<dyn SignatureVerifier> = if config.verify_signatures {
            Arc::new(PersonalSignVerifier)
        } else {
            warn!("signature verification disabled, trusting wallet approval");
            Arc::new(TrustWallet)
        };

        let sync = RegistrySynchronizer::with_key(store, config.store_key.clone());
        let challenge = new_challenge(&sync, chain.as_ref(), config.validity_days).await?;
        let gate = DecryptionGate::new(challenge, cipher.clone(), verifier.clone());

        let client = Self {
            id: Uuid::new_v4(),
            config,
            sync,
            wallet,
            chain,
            cipher,
            verifier,
            registry: RwLock::new(Registry::new()),
            gate: RwLock::new(gate),
            revealed: RwLock::new(RevealedValues::new()),
        };

        let challenge_id = client.gate.read().await.challenge().id();
        info!(session = %client.id, challenge = %challenge_id, "session started");

        if let Err(e) = client.refresh().await {
            warn!(session = %client.id, error = %e, "initial load failed");
        }

        Ok(client)
    }

    /// Replace the cipher strategy. Clears reveals made with the old one.
    pub fn with_cipher(mut self, cipher: Arc<dyn ValueCipher>) -> Self {
        let challenge = self.gate.get_mut().challenge().clone();
        *self.gate.get_mut() = DecryptionGate::new(challenge, cipher.clone(), self.verifier.clone());
        self.cipher = cipher;
        self.revealed.get_mut().clear();
        self
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Active configuration.
    pub fn config(&self) -> &AmmConfig {
        &self.config
    }

    /// Reload the registry from the store.
    ///
    /// Reveals for pools whose record changed under the same id are dropped.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn refresh(&self) -> Result<Registry> {
        let registry = self.sync.load().await?;
        debug!(pools = registry.len(), "registry refreshed");

        let mut current = self.registry.write().await;
        *current = registry.clone();
        let dropped = self.revealed.write().await.retain_current(&current);
        if dropped > 0 {
            warn!(dropped, "pools replaced in store, cached reveals dropped");
        }
        Ok(registry)
    }

    /// Current registry snapshot.
    pub async fn pools(&self) -> Registry {
        self.registry.read().await.clone()
    }

    /// Pools whose name or creator contains `text`, ignoring case.
    pub async fn search(&self, text: &str) -> Vec<ConfidentialPool> {
        self.registry
            .read()
            .await
            .filter(text)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Encrypt and publish a new pool owned by the connected wallet.
    #[instrument(skip(self, draft), fields(session = %self.id, name = %draft.name))]
    pub async fn create_pool(&self, draft: &PoolDraft) -> Result<ConfidentialPool> {
        let creator = self.wallet.address().ok_or(AmmError::WalletNotConnected)?;

        let base = self.registry.read().await.clone();
        let pool = base.create(draft, &creator, self.cipher.as_ref())?;
        let next = base.append(pool.clone());

        self.sync.commit(&next).await?;
        info!(pool = pool.id, "pool created");

        *self.registry.write().await = next;
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "reload after create failed");
        }

        Ok(pool)
    }

    /// Decrypt one field of a pool after a wallet signature.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn reveal(&self, pool_id: u64, field: ConfidentialField) -> Result<f64> {
        let pool = self
            .registry
            .read()
            .await
            .get(pool_id)
            .cloned()
            .ok_or(AmmError::PoolNotFound(pool_id))?;

        // The gate guard is held until the value is cached, so a rotation
        // cannot clear the cache in between
        let (value, _gate) = self.decrypt_with_signature(pool.token(field)).await?;

        let registry = self.registry.read().await;
        if registry.get(pool_id) == Some(&pool) {
            self.revealed.write().await.insert(&pool, field, value);
            debug!(pool = pool_id, field = field.as_str(), "field revealed");
        } else {
            warn!(pool = pool_id, "pool replaced during reveal, value not cached");
        }
        Ok(value)
    }

    /// Reveal a field, or hide it if it is already revealed.
    ///
    /// Hiding needs no signature. Returns the newly revealed value, or
    /// `None` when the field was hidden.
    pub async fn toggle_reveal(&self, pool_id: u64, field: ConfidentialField) -> Result<Option<f64>> {
        if self.hide(pool_id, field).await {
            return Ok(None);
        }
        self.reveal(pool_id, field).await.map(Some)
    }

    /// Forget a revealed value. Returns whether it was revealed.
    pub async fn hide(&self, pool_id: u64, field: ConfidentialField) -> bool {
        self.revealed.write().await.hide(pool_id, field)
    }

    /// Full signature-gated decryption of an arbitrary token.
    /// Any failure yields `None`.
    pub async fn decrypt_token(&self, token: &CipherToken) -> Option<f64> {
        match self.decrypt_with_signature(token).await {
            Ok((value, _)) => Some(value),
            Err(e) => {
                warn!(session = %self.id, error = %e, "decryption failed");
                None
            }
        }
    }

    /// Returns the value with the gate it was checked against still locked.
    async fn decrypt_with_signature(
        &self,
        token: &CipherToken,
    ) -> Result<(f64, RwLockReadGuard<'_, DecryptionGate>)> {
        let signer = self.wallet.address().ok_or(AmmError::WalletNotConnected)?;
        let message = self.gate.read().await.message().to_string();

        let signature = request_authorization(self.wallet.as_ref(), &message).await?;

        if !self.config.decrypt_delay.is_zero() {
            tokio::time::sleep(self.config.decrypt_delay).await;
        }

        // Checked against the challenge current after the wait; a rotation
        // in between invalidates this signature.
        let now = chrono::Utc::now().timestamp();
        let gate = self.gate.read().await;
        let value = gate.try_decrypt_field(token, &message, &signature, &signer, now)?;
        Ok((value, gate))
    }

    /// Start a new challenge window with a fresh public key.
    ///
    /// Signatures over the previous challenge stop working and all reveals
    /// are forgotten.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn rotate_challenge(&self) -> Result<DecryptionChallenge> {
        let challenge =
            new_challenge(&self.sync, self.chain.as_ref(), self.config.validity_days).await?;
        let gate = DecryptionGate::new(challenge.clone(), self.cipher.clone(), self.verifier.clone());

        let mut current = self.gate.write().await;
        *current = gate;
        self.revealed.write().await.clear();
        drop(current);

        info!(challenge = %challenge.id(), "challenge rotated");
        Ok(challenge)
    }

    /// Current challenge.
    pub async fn challenge(&self) -> DecryptionChallenge {
        self.gate.read().await.challenge().clone()
    }

    /// Values revealed in this session.
    pub async fn revealed(&self) -> RevealedValues {
        self.revealed.read().await.clone()
    }

    /// Dashboard figures over every pool revealed in this session.
    pub async fn stats_revealed(&self) -> PoolStats {
        let registry = self.registry.read().await;
        let revealed = self.revealed.read().await;
        registry.aggregate_revealed(&revealed)
    }

    /// Dashboard figures reflecting only the opened pool.
    pub async fn stats_open_pool(&self, open_pool: Option<u64>) -> PoolStats {
        let registry = self.registry.read().await;
        let revealed = self.revealed.read().await;
        let reveal = open_pool
            .and_then(|id| registry.get(id))
            .and_then(|pool| revealed.reveal_for(pool));
        registry.aggregate_open_pool(reveal)
    }

    /// User-facing notice for an error.
    pub fn notice_for(&self, err: &AmmError) -> StatusNotice {
        StatusNotice::from_error(err, &self.config)
    }
}

async fn new_challenge(
    sync: &RegistrySynchronizer,
    chain: &dyn ChainProvider,
    validity_days: u32,
) -> Result<DecryptionChallenge> {
    let chain_id = chain
        .chain_id()
        .await
        .map_err(|e| AmmError::Wallet(e.to_string()))?;

    Ok(DecryptionChallenge::new(
        generate_public_key(),
        sync.store().address(),
        chain_id,
        chrono::Utc::now().timestamp(),
        validity_days,
    ))
}
