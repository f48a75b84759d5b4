//! Umbrella crate for the symsearch engine.
//!
//! This crate stitches together the shard layer (`sym_index`) and the
//! match layer (`sym_match`) so consumers can run the whole query
//! pipeline (normalize, scan one shard, score, aggregate) through a
//! single entry point, and adds the interactive [`SearchSession`] that
//! debounces keystrokes and guarantees "last keystroke wins" delivery.
//!
//! Three levels of API, outermost first:
//!
//! - [`SearchSession`]: keystroke-driven, debounced, cancellation-aware.
//!   This is what a documentation viewer's search box talks to.
//! - [`run_query`]: one-shot pipeline for embedders that do their own
//!   scheduling.
//! - The re-exported building blocks (`ShardStore`, `ShardMatcher`,
//!   `aggregate`, ...) for anything more bespoke.

pub mod config;
pub mod session;

pub use sym_index::{
    Entry, FsShardSource, IndexError, InMemoryShardSource, LinkTarget, Shard, ShardFormat,
    ShardSource, ShardStore,
};
pub use sym_match::{
    MatchConfig, MatchError, MatchScore, Matcher, ResultRow, ScoredEntry, ShardMatcher, aggregate,
    normalize,
};

pub use crate::config::{ConfigLoadError, SymsearchConfig};
pub use crate::session::{SearchSession, SessionConfig};

/// Run the full query pipeline once: normalize, search, aggregate.
///
/// A raw query that normalizes to the empty string short-circuits to an
/// empty row list without touching any shard.
pub async fn run_query(
    matcher: &dyn Matcher,
    raw: &str,
    config: &MatchConfig,
) -> Result<Vec<ResultRow>, MatchError> {
    let key = normalize(raw);
    if key.is_empty() {
        return Ok(Vec::new());
    }
    let scored = matcher.search(&key).await?;
    Ok(aggregate(scored, config.max_results))
}
