use serde::{Deserialize, Serialize};
use sym_index::{Entry, IndexError, LinkTarget};
use thiserror::Error;

/// Match verdict for one entry, strongest first.
///
/// The numeric rank is the primary sort key, so the discriminant order
/// here is load-bearing: exact before prefix before substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchScore {
    /// Label equals the key case-insensitively.
    Exact,
    /// Label starts with the key.
    Prefix,
    /// Key occurs somewhere inside the label.
    Substring,
}

impl MatchScore {
    /// Classify `candidate` (already lowercased) against `key` (already
    /// normalized). `None` means the entry is excluded.
    pub fn classify(candidate: &str, key: &str) -> Option<Self> {
        if candidate == key {
            Some(MatchScore::Exact)
        } else if candidate.starts_with(key) {
            Some(MatchScore::Prefix)
        } else if candidate.contains(key) {
            Some(MatchScore::Substring)
        } else {
            None
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            MatchScore::Exact => 0,
            MatchScore::Prefix => 1,
            MatchScore::Substring => 2,
        }
    }
}

/// One matched entry with its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub entry: Entry,
    pub score: MatchScore,
}

impl ScoredEntry {
    /// Total-order sort key: score rank, then label length in characters,
    /// then id. Ties cannot survive the id component, which is what makes
    /// repeated identical queries byte-identical.
    pub fn sort_key(&self) -> (u8, usize, u64) {
        (self.score.rank(), self.entry.label_len(), self.entry.id)
    }
}

/// Presentation-ready result row.
///
/// A label with a single documentation target becomes a `Direct` row; an
/// overload set keeps its targets together under one `Menu` row, in the
/// generator's stable target order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultRow {
    Direct { label: String, target: LinkTarget },
    Menu { label: String, targets: Vec<LinkTarget> },
}

impl ResultRow {
    pub fn label(&self) -> &str {
        match self {
            ResultRow::Direct { label, .. } | ResultRow::Menu { label, .. } => label,
        }
    }
}

/// Configuration for match-time behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Maximum number of result rows surfaced to the consumer. Bounds UI
    /// rendering cost, not the shard scan.
    #[serde(default = "MatchConfig::default_max_results")]
    pub max_results: usize,
}

impl MatchConfig {
    pub(crate) fn default_max_results() -> usize {
        20
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_results == 0 {
            return Err(MatchError::InvalidConfig(
                "max_results must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_results: Self::default_max_results(),
        }
    }
}

/// Errors produced by the match layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Shard retrieval failed. `ShardNotFound` never reaches this variant;
    /// the engine folds it into an empty result set.
    #[error("index failure: {0}")]
    Index(#[from] IndexError),

    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),
}
