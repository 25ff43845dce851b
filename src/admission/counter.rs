//! Fixed-window request counting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Concurrency-safe per-identity counter over a fixed time window.
///
/// Exactly one table is live at a time. Increments mutate the live table
/// under a single mutex; the reset loop replaces the table wholesale at
/// every window boundary instead of evicting entries one by one.
///
/// This is a hard cutoff, not a sliding window: a burst just before the
/// boundary and another just after both pass, even though they land within
/// seconds of each other. That coarseness is the intended cost tradeoff.
pub struct WindowedCounter {
    table: Mutex<HashMap<String, u64>>,
}

impl WindowedCounter {
    /// Create a counter with a fresh, empty live table.
    ///
    /// The table is ready for counting as soon as this returns; callers
    /// start the reset loop separately via [`spawn_reset_loop`].
    ///
    /// [`spawn_reset_loop`]: WindowedCounter::spawn_reset_loop
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Atomically increment the identity's count and return the new value.
    ///
    /// Increments for one identity are serialized by the mutex, so
    /// concurrent callers never observe the same count. The critical
    /// section covers a single map update and never blocks on I/O.
    pub fn increment_and_get(&self, identity: &str) -> u64 {
        let mut table = self.table.lock().expect("counter mutex poisoned");
        let count = table.entry(identity.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Discard the live table and start a fresh window.
    pub fn reset(&self) {
        let mut table = self.table.lock().expect("counter mutex poisoned");
        *table = HashMap::new();
    }

    /// Spawn the background reset loop.
    ///
    /// Replaces the live table every `window`, starting one full window
    /// after the call. The loop exits when `shutdown` fires.
    pub fn spawn_reset_loop(
        self: Arc<Self>,
        window: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let counter = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(window);
            // The first tick completes immediately; consume it so the
            // first live window gets its full duration.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        counter.reset();
                        tracing::debug!(window_secs = window.as_secs(), "Counter window reset");
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Counter reset loop stopping");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for WindowedCounter {
    fn default() -> Self {
        Self::new()
    }
}
