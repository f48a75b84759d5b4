//! # Symbol Match (`sym_match`)
//!
//! ## Purpose
//!
//! `sym_match` sits on top of the shard layer (`sym_index`). It turns a raw
//! user query into a normalized comparison key, scans the one shard that
//! can contain matches, scores every entry, and shapes the ordered results
//! into presentation rows bounded by a configurable limit.
//!
//! ## Core Types
//!
//! - [`MatchScore`]: verdict for one entry. `Exact` beats `Prefix` beats
//!   `Substring`; non-matches are excluded outright.
//! - [`MatchConfig`]: per-deployment tuning knobs, currently the result
//!   limit (`max_results`).
//! - [`ScoredEntry`]: an index entry plus its verdict, already in the
//!   engine's total order.
//! - [`ResultRow`]: presentation shape, a `Direct` row when the label has
//!   exactly one documentation target, a `Menu` row for overload sets.
//! - [`ShardMatcher`]: production implementation of the [`Matcher`] trait
//!   over a shared [`ShardStore`](sym_index::ShardStore).
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use sym_index::{Entry, InMemoryShardSource, LinkTarget, ShardStore};
//! use sym_match::{aggregate, normalize, Matcher, ShardMatcher};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = ShardStore::new(Box::new(InMemoryShardSource::new(vec![(
//!     'm',
//!     vec![Entry::new("Mesh", 394, vec![LinkTarget::new("lf::mesh::Mesh", "mesh.html")])],
//! )])));
//!
//! let matcher = ShardMatcher::new(Arc::new(store));
//! let key = normalize("  Mesh ");
//! let scored = matcher.search(&key).await.unwrap();
//! let rows = aggregate(scored, 20);
//! assert_eq!(rows.len(), 1);
//! # });
//! ```

pub mod aggregate;
pub mod engine;
pub mod query;
pub mod types;

pub use crate::aggregate::aggregate;
pub use crate::engine::{Matcher, ShardMatcher};
pub use crate::query::normalize;
pub use crate::types::{MatchConfig, MatchError, MatchScore, ResultRow, ScoredEntry};
