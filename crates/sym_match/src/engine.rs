//! Shard scanning and scoring.

use std::sync::Arc;

use async_trait::async_trait;
use sym_index::ShardStore;
use tracing::debug;

use crate::types::{MatchError, MatchScore, ScoredEntry};

/// Trait for a matching engine.
#[async_trait]
pub trait Matcher: Send + Sync {
    /// Run one normalized key against the index and return scored entries
    /// in the engine's total order (score, label length, id).
    async fn search(&self, key: &str) -> Result<Vec<ScoredEntry>, MatchError>;
}

/// Production matcher over the per-letter shard store.
///
/// Because shards partition the index strictly by leading character and a
/// normalized key can only match labels sharing its first character, each
/// query scans exactly one shard: O(shard size), never O(index size).
pub struct ShardMatcher {
    store: Arc<ShardStore>,
}

impl ShardMatcher {
    pub fn new(store: Arc<ShardStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<ShardStore> {
        &self.store
    }
}

#[async_trait]
impl Matcher for ShardMatcher {
    async fn search(&self, key: &str) -> Result<Vec<ScoredEntry>, MatchError> {
        let Some(first) = key.chars().next() else {
            return Ok(Vec::new());
        };

        let shard = match self.store.get_shard(first).await {
            Ok(shard) => shard,
            // Punctuation, digits the generator never bucketed, etc.
            // Zero results, not a failure.
            Err(err) if err.is_not_found() => {
                debug!(key, "no shard for leading character");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut scored: Vec<ScoredEntry> = shard
            .entries()
            .iter()
            .filter_map(|entry| {
                MatchScore::classify(entry.search_key(), key).map(|score| ScoredEntry {
                    entry: entry.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by_key(ScoredEntry::sort_key);

        debug!(key, hits = scored.len(), shard = %shard.key(), "shard scan complete");
        Ok(scored)
    }
}
