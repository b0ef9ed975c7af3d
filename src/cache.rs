//! In-memory read-through cache for validated pairs

use crate::types::TradingPair;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Cache key: `(chain_id, pair_id)`
type PairKey = (String, String);

#[derive(Debug, Clone)]
struct CachedPair {
    pair: TradingPair,
    fetched_at: Instant,
}

/// Short-lived cache of successfully fetched pairs
///
/// Only successes are stored, so a failed fetch is never masked by an older
/// value: callers either get a pair younger than the TTL or go upstream.
pub struct PairCache {
    ttl: Duration,
    entries: RwLock<HashMap<PairKey, CachedPair>>,
}

impl PairCache {
    /// Creates a new cache whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Gets a pair if one was stored less than `ttl` ago
    pub async fn get(&self, chain_id: &str, pair_id: &str) -> Option<TradingPair> {
        let entries = self.entries.read().await;
        let entry = entries.get(&(chain_id.to_string(), pair_id.to_string()))?;

        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.pair.clone())
        } else {
            None
        }
    }

    /// Stores a freshly fetched pair, dropping any entries that have expired
    pub async fn insert(&self, chain_id: &str, pair_id: &str, pair: TradingPair) {
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        entries.insert(
            (chain_id.to_string(), pair_id.to_string()),
            CachedPair {
                pair,
                fetched_at: Instant::now(),
            },
        );
        tracing::debug!(chain_id = chain_id, pair_id = pair_id, "Cached pair");
    }

    /// Drops expired entries
    pub async fn purge_expired(&self) {
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    }

    /// Drops every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
