//! Result aggregation.

use crate::types::{ResultRow, ScoredEntry};

/// Shape scored entries into presentation rows.
///
/// The input is already in the engine's total order; aggregation preserves
/// it, truncates to `limit`, and flattens each entry's targets: one target
/// becomes a [`ResultRow::Direct`], an overload set keeps its targets
/// together under a [`ResultRow::Menu`]. Pure and idempotent: applying it
/// twice with the same limit yields the same rows.
pub fn aggregate(scored: Vec<ScoredEntry>, limit: usize) -> Vec<ResultRow> {
    scored
        .into_iter()
        .take(limit)
        .map(|hit| {
            let entry = hit.entry;
            let mut targets = entry.targets;
            if targets.len() == 1 {
                ResultRow::Direct {
                    label: entry.label,
                    target: targets.remove(0),
                }
            } else {
                ResultRow::Menu {
                    label: entry.label,
                    targets,
                }
            }
        })
        .collect()
}
