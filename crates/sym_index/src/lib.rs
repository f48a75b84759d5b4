//! # Symbol Index (`sym_index`)
//!
//! This crate provides the read-only data model for a symbol-search index
//! that is partitioned into per-letter *shards*, together with a lazy,
//! caching [`ShardStore`] that loads shards on demand through a pluggable
//! [`ShardSource`].
//!
//! ## Core Concepts
//!
//! - [`Entry`]: one documentable symbol occurrence, a display label, a
//!   build-local numeric id, and one or more [`LinkTarget`]s (an overload
//!   set yields several targets under one label).
//! - [`Shard`]: the ordered entries whose labels begin with one leading
//!   character. Shards are produced by an external documentation generator
//!   and are immutable at query time.
//! - [`ShardSource`]: abstraction over where shards come from, either a local
//!   directory of generated files ([`FsShardSource`]) or a pre-built
//!   in-memory table ([`InMemoryShardSource`]).
//! - [`ShardStore`]: caches shards for the life of the process and
//!   coalesces concurrent loads of the same shard into a single in-flight
//!   operation.
//!
//! ## Example Usage
//!
//! ```
//! use sym_index::{Entry, InMemoryShardSource, LinkTarget, ShardStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let source = InMemoryShardSource::new(vec![(
//!     'm',
//!     vec![Entry::new(
//!         "Mesh",
//!         394,
//!         vec![LinkTarget::new("lf::mesh::Mesh", "classlf_1_1mesh_1_1_mesh.html")],
//!     )],
//! )]);
//!
//! let store = ShardStore::new(Box::new(source));
//! let shard = store.get_shard('M').await.unwrap();
//! assert_eq!(shard.key(), 'm');
//! assert_eq!(shard.entries()[0].label, "Mesh");
//! # });
//! ```

mod source;

pub use crate::source::doxygen::{FsShardSource, ShardFormat};
pub use crate::source::{InMemoryShardSource, ShardSource};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// One documentation location a label resolves to.
///
/// The `anchor` is an opaque locator (page path plus in-page fragment).
/// It is resolved by the documentation viewer and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub title: String,
    pub anchor: String,
}

impl LinkTarget {
    pub fn new<T: Into<String>, A: Into<String>>(title: T, anchor: A) -> Self {
        Self {
            title: title.into(),
            anchor: anchor.into(),
        }
    }
}

/// One indexed symbol occurrence.
///
/// `id` is assigned by the generator and is stable only within a single
/// index build; it is used as a deterministic tie-break, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub id: u64,
    pub targets: Vec<LinkTarget>,
    /// Lowercased label, computed once at load time so query-time
    /// comparisons never re-allocate.
    #[serde(skip)]
    search_key: String,
}

impl Entry {
    pub fn new<L: Into<String>>(label: L, id: u64, targets: Vec<LinkTarget>) -> Self {
        let label = label.into();
        let search_key = label.to_lowercase();
        Self {
            label,
            id,
            targets,
            search_key,
        }
    }

    /// Lowercased form of the label used for case-insensitive matching.
    /// Deserialized entries get theirs rebuilt during [`Shard`] construction.
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    fn rekey(&mut self) {
        self.search_key = self.label.to_lowercase();
    }

    /// Number of characters in the label; the ordering tie-break, so
    /// non-ASCII labels sort by visible length rather than byte count.
    pub fn label_len(&self) -> usize {
        self.label.chars().count()
    }
}

/// Ordered entries for one leading character.
///
/// Construction validates and repairs generator output rather than
/// rejecting it: entries with an empty label or no targets are skipped
/// with a warning, entries bucketed under the wrong leading character are
/// skipped, and the remainder is sorted by (case-insensitive label, id).
#[derive(Debug, Clone)]
pub struct Shard {
    key: char,
    entries: Vec<Entry>,
}

impl Shard {
    pub fn new(key: char, entries: Vec<Entry>) -> Self {
        let key = key.to_lowercase().next().unwrap_or(key);
        let mut kept: Vec<Entry> = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.rekey();
            if entry.label.is_empty() {
                warn!(shard = %key, id = entry.id, "skipping entry with empty label");
                continue;
            }
            if entry.targets.is_empty() {
                warn!(shard = %key, label = %entry.label, "skipping entry with no targets");
                continue;
            }
            if entry.search_key.chars().next() != Some(key) {
                warn!(
                    shard = %key,
                    label = %entry.label,
                    "skipping entry bucketed under the wrong leading character"
                );
                continue;
            }
            kept.push(entry);
        }
        kept.sort_by(|a, b| {
            a.search_key
                .cmp(&b.search_key)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { key, entries: kept }
    }

    /// Leading character this shard covers, always lowercase.
    pub fn key(&self) -> char {
        self.key
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors produced while locating, loading, or parsing shards.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No shard exists for the requested leading character. Callers treat
    /// this as "zero results", not as a failure.
    #[error("no shard for leading character {key:?}")]
    ShardNotFound { key: char },

    /// The shard exists but could not be read.
    #[error("failed to load shard {key:?}: {message}")]
    Load { key: char, message: String },

    /// The shard was read but its contents could not be decoded.
    #[error("failed to parse shard {key:?}: {message}")]
    Parse { key: char, message: String },
}

impl IndexError {
    pub fn load<E: std::fmt::Display>(key: char, err: E) -> Self {
        IndexError::Load {
            key,
            message: err.to_string(),
        }
    }

    pub fn parse<E: std::fmt::Display>(key: char, err: E) -> Self {
        IndexError::Parse {
            key,
            message: err.to_string(),
        }
    }

    /// True when the error means "this shard simply does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, IndexError::ShardNotFound { .. })
    }
}

/// Lazy, caching shard store.
///
/// Shards are immutable and comparatively small, so caching is unbounded
/// for the life of the store. Loads are single-flight: concurrent requests
/// for the same uncached shard share one in-flight load through a per-key
/// [`OnceCell`]. A failed load leaves the cell empty, so the next request
/// retries the source.
pub struct ShardStore {
    source: Box<dyn ShardSource>,
    cells: Mutex<HashMap<char, Arc<OnceCell<Arc<Shard>>>>>,
}

impl ShardStore {
    pub fn new(source: Box<dyn ShardSource>) -> Self {
        Self {
            source,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the shard for `first_char`, loading and caching it on first
    /// request. The key is normalized to lowercase before lookup.
    pub async fn get_shard(&self, first_char: char) -> Result<Arc<Shard>, IndexError> {
        let key = first_char.to_lowercase().next().unwrap_or(first_char);

        let cell = {
            let mut cells = self
                .cells
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cells.entry(key).or_default().clone()
        };

        let shard = cell
            .get_or_try_init(|| async {
                debug!(shard = %key, source = %self.source.describe(), "loading shard");
                let shard = self.source.load(key).await?;
                debug!(shard = %key, entries = shard.len(), "shard loaded");
                Ok::<_, IndexError>(Arc::new(shard))
            })
            .await?;

        Ok(Arc::clone(shard))
    }

    /// Number of shards currently resident in the cache. Diagnostics
    /// hook; not part of the query surface.
    #[doc(hidden)]
    pub fn cached_shards(&self) -> usize {
        let cells = self
            .cells
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cells.values().filter(|cell| cell.initialized()).count()
    }
}
