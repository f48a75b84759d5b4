//! Interactive query sessions.
//!
//! A [`SearchSession`] owns one search box's query lifecycle. Every
//! keystroke allocates a monotonically increasing sequence number and
//! spawns a task that sleeps out the debounce window, runs the pipeline,
//! and then passes a delivery checkpoint. The checkpoint enforces the
//! session invariants:
//!
//! - the consumer callback fires at most once per sequence number;
//! - observed sequence numbers are strictly increasing, so a slow early
//!   query can never overwrite the answer to a later keystroke;
//! - after [`SearchSession::close`], nothing is delivered at all.
//!
//! Cancellation is cooperative. A superseded query's task may still run
//! its (cheap, single-shard) work to completion in the background, but its
//! result is dropped at the checkpoint and never surfaced.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{trace, warn};

use sym_match::{MatchConfig, Matcher, ResultRow};

use crate::run_query;

/// Callback the session delivers results through.
pub type ResultConsumer = Arc<dyn Fn(u64, Vec<ResultRow>) + Send + Sync>;

/// Configuration for session behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Delay between the last keystroke and query dispatch, in
    /// milliseconds. Keystrokes inside the window supersede one another
    /// and only the final one reaches the match engine.
    #[serde(default = "SessionConfig::default_debounce_ms")]
    pub debounce_ms: u64,
}

impl SessionConfig {
    pub(crate) fn default_debounce_ms() -> u64 {
        200
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
        }
    }
}

/// Internal signal: a query finished after its sequence number stopped
/// being the newest. Consumed by the delivery checkpoint, never surfaced.
#[derive(Debug)]
pub(crate) struct StaleResultDiscarded {
    pub(crate) seq: u64,
}

/// One search box's query lifecycle: debounce, supersession, delivery.
pub struct SearchSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    matcher: Arc<dyn Matcher>,
    match_config: MatchConfig,
    config: SessionConfig,
    consumer: ResultConsumer,
    /// Newest sequence number handed out; a task whose number no longer
    /// equals it has been superseded.
    seq: AtomicU64,
    /// Highest sequence number already delivered, guarded so the check
    /// and the consumer call are one atomic step.
    delivered: Mutex<u64>,
    closed: AtomicBool,
}

impl SearchSession {
    pub fn new(
        matcher: Arc<dyn Matcher>,
        match_config: MatchConfig,
        config: SessionConfig,
        consumer: ResultConsumer,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                matcher,
                match_config,
                config,
                consumer,
                seq: AtomicU64::new(0),
                delivered: Mutex::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Handle a keystroke: allocate the next sequence number and schedule
    /// the query behind the debounce window. Returns the sequence number
    /// so callers can correlate deliveries.
    ///
    /// Outside a tokio runtime the sequence number is still allocated but
    /// nothing is scheduled, so the keystroke is dropped with a warning
    /// instead of a panic.
    pub fn on_query_changed(&self, raw: &str) -> u64 {
        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(seq, "no tokio runtime available, dropping keystroke");
            return seq;
        };

        let inner = Arc::clone(&self.inner);
        let raw = raw.to_string();

        handle.spawn(async move {
            sleep(inner.config.debounce()).await;

            // Superseded during the debounce window: the keystroke never
            // becomes a dispatch.
            if inner.is_stale(seq) {
                trace!(seq, "debounced keystroke superseded before dispatch");
                return;
            }

            let rows = match run_query(inner.matcher.as_ref(), &raw, &inner.match_config).await {
                Ok(rows) => rows,
                Err(err) => {
                    // Worst visible outcome is an empty list; the next
                    // keystroke retries the shard load.
                    warn!(seq, error = %err, "query failed, delivering empty results");
                    Vec::new()
                }
            };

            if let Err(StaleResultDiscarded { seq }) = inner.try_deliver(seq, rows) {
                trace!(seq, "stale result discarded at delivery checkpoint");
            }
        });

        seq
    }

    /// Close the session: pending timers and in-flight queries become
    /// discardable and no further delivery happens. Idempotent.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    /// Newest sequence number handed out so far.
    pub fn current_seq(&self) -> u64 {
        self.inner.seq.load(Ordering::SeqCst)
    }
}

impl SessionInner {
    fn is_stale(&self, seq: u64) -> bool {
        self.closed.load(Ordering::SeqCst) || self.seq.load(Ordering::SeqCst) != seq
    }

    /// Delivery checkpoint. Holding the `delivered` lock across the
    /// consumer call is what makes "at most once per sequence number,
    /// strictly increasing" an invariant rather than a likelihood.
    fn try_deliver(&self, seq: u64, rows: Vec<ResultRow>) -> Result<(), StaleResultDiscarded> {
        let mut delivered = self
            .delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.is_stale(seq) || seq <= *delivered {
            return Err(StaleResultDiscarded { seq });
        }

        *delivered = seq;
        (self.consumer)(seq, rows);
        Ok(())
    }
}
