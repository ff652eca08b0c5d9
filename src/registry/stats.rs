//! Dashboard aggregates over decrypted figures.
//!
//! Aggregation never decodes tokens. It works only from values the viewer
//! already revealed through a signed challenge, so one viewer's reveal cannot
//! leak other pools' figures. Two readings are offered:
//!
//! - [`Registry::aggregate_revealed`]: every pool the viewer revealed.
//! - [`Registry::aggregate_open_pool`]: only the pool currently opened.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::collection::Registry;
use super::pool::{ConfidentialField, ConfidentialPool};

/// Plaintext figures revealed for one pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolReveal {
    /// Revealed liquidity.
    pub liquidity: Option<f64>,
    /// Revealed volume.
    pub volume: Option<f64>,
    /// Revealed fee rate.
    pub fees: Option<f64>,
}

impl PoolReveal {
    /// Value of one field, if revealed.
    pub fn get(&self, field: ConfidentialField) -> Option<f64> {
        match field {
            ConfidentialField::Liquidity => self.liquidity,
            ConfidentialField::Volume => self.volume,
            ConfidentialField::Fees => self.fees,
        }
    }

    fn slot(&mut self, field: ConfidentialField) -> &mut Option<f64> {
        match field {
            ConfidentialField::Liquidity => &mut self.liquidity,
            ConfidentialField::Volume => &mut self.volume,
            ConfidentialField::Fees => &mut self.fees,
        }
    }

    /// Whether nothing is revealed.
    pub fn is_empty(&self) -> bool {
        self.liquidity.is_none() && self.volume.is_none() && self.fees.is_none()
    }
}

/// Revealed figures together with the record they were decrypted from.
#[derive(Clone, Debug, PartialEq)]
struct RevealEntry {
    pool: ConfidentialPool,
    reveal: PoolReveal,
}

/// Session-local cache of revealed plaintext, keyed by pool id.
///
/// Each entry remembers the pool record it was decrypted from. Ids are
/// positional, so after a reload the same id can name another pool; such
/// entries stop counting and are dropped by [`retain_current`](Self::retain_current).
/// Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevealedValues {
    by_pool: BTreeMap<u64, RevealEntry>,
}

impl RevealedValues {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveals for one pool id.
    pub fn pool(&self, id: u64) -> Option<&PoolReveal> {
        self.by_pool.get(&id).map(|e| &e.reveal)
    }

    /// Reveals for `pool`, only if they were decrypted from this exact record.
    pub fn reveal_for(&self, pool: &ConfidentialPool) -> Option<&PoolReveal> {
        self.by_pool
            .get(&pool.id)
            .filter(|e| e.pool == *pool)
            .map(|e| &e.reveal)
    }

    /// One revealed value.
    pub fn get(&self, id: u64, field: ConfidentialField) -> Option<f64> {
        self.pool(id).and_then(|r| r.get(field))
    }

    /// Record a value decrypted from `pool`. Values cached for an older
    /// record under the same id are discarded.
    pub fn insert(&mut self, pool: &ConfidentialPool, field: ConfidentialField, value: f64) {
        let entry = self.by_pool.entry(pool.id).or_insert_with(|| RevealEntry {
            pool: pool.clone(),
            reveal: PoolReveal::default(),
        });
        if entry.pool != *pool {
            entry.pool = pool.clone();
            entry.reveal = PoolReveal::default();
        }
        *entry.reveal.slot(field) = Some(value);
    }

    /// Forget a revealed value. Returns whether it was present.
    pub fn hide(&mut self, id: u64, field: ConfidentialField) -> bool {
        let Some(entry) = self.by_pool.get_mut(&id) else {
            return false;
        };
        let was_set = entry.reveal.slot(field).take().is_some();
        if entry.reveal.is_empty() {
            self.by_pool.remove(&id);
        }
        was_set
    }

    /// Drop reveals whose pool is gone from `registry` or now holds a
    /// different record. Returns how many pools were dropped.
    pub fn retain_current(&mut self, registry: &Registry) -> usize {
        let before = self.by_pool.len();
        self.by_pool.retain(|id, entry| registry.get(*id) == Some(&entry.pool));
        before - self.by_pool.len()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.by_pool.clear();
    }

    /// Number of pools with at least one revealed value.
    pub fn len(&self) -> usize {
        self.by_pool.len()
    }

    /// Whether nothing is revealed.
    pub fn is_empty(&self) -> bool {
        self.by_pool.is_empty()
    }
}

/// Dashboard figures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Sum of revealed liquidity.
    pub total_liquidity: f64,
    /// Mean of revealed fee rates.
    pub average_fee: f64,
    /// Pools in the registry.
    pub count: usize,
}

impl Registry {
    /// Aggregate over the pools the viewer revealed.
    ///
    /// Unrevealed pools contribute nothing; `average_fee` averages only over
    /// pools whose fee was revealed. Reveals made from a record this registry
    /// no longer holds are ignored.
    pub fn aggregate_revealed(&self, revealed: &RevealedValues) -> PoolStats {
        let mut total_liquidity = 0.0;
        let mut fee_sum = 0.0;
        let mut fee_count = 0usize;

        for pool in self.pools() {
            let Some(reveal) = revealed.reveal_for(pool) else {
                continue;
            };
            if let Some(liquidity) = reveal.liquidity {
                total_liquidity += liquidity;
            }
            if let Some(fee) = reveal.fees {
                fee_sum += fee;
                fee_count += 1;
            }
        }

        PoolStats {
            total_liquidity,
            average_fee: if fee_count > 0 { fee_sum / fee_count as f64 } else { 0.0 },
            count: self.len(),
        }
    }

    /// Aggregate reflecting only the currently opened pool's reveals.
    pub fn aggregate_open_pool(&self, open: Option<&PoolReveal>) -> PoolStats {
        let reveal = open.copied().unwrap_or_default();
        PoolStats {
            total_liquidity: reveal.liquidity.unwrap_or(0.0),
            average_fee: reveal.fees.unwrap_or(0.0),
            count: self.len(),
        }
    }
}
