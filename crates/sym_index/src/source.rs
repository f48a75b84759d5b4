//! Pluggable shard retrieval.
//!
//! A [`ShardSource`] answers "give me the shard for this leading
//! character". Deployment decides what that means: a directory of files
//! written by the documentation generator ([`FsShardSource`]), or a table
//! handed over by an embedder that already holds the index in memory
//! ([`InMemoryShardSource`]).
//!
//! [`FsShardSource`]: crate::FsShardSource

pub(crate) mod doxygen;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{Entry, IndexError, Shard};

/// Asynchronous shard retrieval seam.
///
/// Implementations must be cheap to call for missing shards: a request
/// for a character the generator never emitted returns
/// [`IndexError::ShardNotFound`], which callers treat as zero results.
#[async_trait]
pub trait ShardSource: Send + Sync {
    /// Load the shard for `key`. `key` is already lowercased by the store.
    async fn load(&self, key: char) -> Result<Shard, IndexError>;

    /// Short human-readable description used in load-lifecycle logs.
    fn describe(&self) -> String;
}

/// Shard source backed by a pre-built in-memory table.
///
/// Entry validation and ordering still run through [`Shard::new`], so an
/// embedder may hand over raw generator output unsorted.
pub struct InMemoryShardSource {
    shards: HashMap<char, Vec<Entry>>,
}

impl InMemoryShardSource {
    pub fn new(shards: Vec<(char, Vec<Entry>)>) -> Self {
        let shards = shards
            .into_iter()
            .map(|(key, entries)| (key.to_lowercase().next().unwrap_or(key), entries))
            .collect();
        Self { shards }
    }
}

#[async_trait]
impl ShardSource for InMemoryShardSource {
    async fn load(&self, key: char) -> Result<Shard, IndexError> {
        match self.shards.get(&key) {
            Some(entries) => Ok(Shard::new(key, entries.clone())),
            None => Err(IndexError::ShardNotFound { key }),
        }
    }

    fn describe(&self) -> String {
        format!("in-memory ({} shards)", self.shards.len())
    }
}
