//! AmmCipher Demo
//!
//! Runs one session against an in-memory store: creates a pool, reveals
//! its figures through a signed challenge, and computes the aggregates.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ammcipher::{
    auth::{FixedChain, LocalWallet},
    registry::ConfidentialField,
    AmmConfig, BlobStore, ConfidentialAmm, MemoryStore, PoolDraft, VERSION,
};

/// Sepolia, the network the demo challenge is bound to.
const DEMO_CHAIN_ID: u64 = 11_155_111;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("AmmCipher v{}", VERSION);

    let config = AmmConfig::from_env();
    info!(
        store_key = %config.store_key,
        validity_days = config.validity_days,
        verify_signatures = config.verify_signatures,
        "configuration loaded"
    );

    demo_session(config).await
}

/// Demo session over an in-memory store.
async fn demo_session(config: AmmConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo Session ===");

    let store = Arc::new(MemoryStore::new("0x0000000000000000000000000000000000a11ce5"));
    let wallet = Arc::new(LocalWallet::random());
    let chain = Arc::new(FixedChain(DEMO_CHAIN_ID));

    let amm = ConfidentialAmm::connect(store.clone(), wallet, chain, config)
        .await
        .context("failed to start session")?;

    let challenge = amm.challenge().await;
    info!(
        challenge = %challenge.id(),
        expires_at = challenge.expires_at(),
        "decryption challenge ready"
    );

    let drafts = [
        PoolDraft::new("ETH-USDC", "1000", "0.3"),
        PoolDraft::new("WBTC-ETH", "250", "0.05"),
    ];
    for draft in &drafts {
        match amm.create_pool(draft).await {
            Ok(pool) => info!(pool = pool.id, name = %pool.name, "pool created"),
            Err(e) => warn!(notice = %amm.notice_for(&e).message, "pool creation failed"),
        }
    }

    let stored = store.read_blob(&amm.config().store_key).await?;
    info!(bytes = stored.len(), writes = store.write_count(), "snapshot written");

    let registry = amm.pools().await;
    for pool in registry.pools() {
        for field in [ConfidentialField::Liquidity, ConfidentialField::Fees] {
            if let Err(e) = amm.reveal(pool.id, field).await {
                let notice = amm.notice_for(&e);
                warn!(pool = pool.id, field = field.as_str(), notice = %notice.message, "reveal failed");
            }
        }
    }

    // Figures stay out of the log; only counts are reported
    let stats = amm.stats_revealed().await;
    let revealed = amm.revealed().await;
    info!(
        pools = stats.count,
        revealed_pools = revealed.len(),
        "revealed aggregates computed"
    );

    let matches = amm.search("eth").await;
    info!(matches = matches.len(), "search for \"eth\"");

    info!("=== Demo Session Complete ===");
    Ok(())
}
