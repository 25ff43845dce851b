//! Bounded audit queue and background drain loop.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::admission::event::{AdmissionEvent, Outcome};
use crate::audit::store::{AuditStore, ALLOWED_BUCKET, DENIED_BUCKET};
use crate::observability::metrics;

/// Error returned when an event cannot be enqueued.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Queue stayed full past the submit timeout.
    #[error("audit queue full after {0:?}")]
    Busy(Duration),
    /// Drain task is gone; no more events will be persisted.
    #[error("audit pipeline closed")]
    Closed,
}

/// Producer handle for the audit queue. Cheap to clone.
#[derive(Clone)]
pub struct AuditPipeline {
    tx: mpsc::Sender<AdmissionEvent>,
    submit_timeout: Duration,
}

impl AuditPipeline {
    /// Create the bounded queue, returning the producer handle and the
    /// receiver half for an [`AuditWriter`].
    pub fn new(
        capacity: usize,
        submit_timeout: Duration,
    ) -> (Self, mpsc::Receiver<AdmissionEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx, submit_timeout }, rx)
    }

    /// Enqueue an event, waiting for queue space up to the submit timeout.
    ///
    /// A full queue is a backpressure signal: the event is never silently
    /// dropped. Past the timeout the caller gets [`SubmitError::Busy`] and
    /// is expected to answer server-busy instead of blocking further.
    /// Under sustained overload this queue is the bottleneck and the whole
    /// service degrades with it; there is no audit load shedding.
    pub async fn submit(&self, event: AdmissionEvent) -> Result<(), SubmitError> {
        match tokio::time::timeout(self.submit_timeout, self.tx.send(event)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => {
                metrics::record_submit_rejected("closed");
                Err(SubmitError::Closed)
            }
            Err(_) => {
                metrics::record_submit_rejected("busy");
                Err(SubmitError::Busy(self.submit_timeout))
            }
        }
    }
}

/// Background writer draining the queue into the audit store.
pub struct AuditWriter<S: AuditStore> {
    rx: mpsc::Receiver<AdmissionEvent>,
    store: S,
}

impl<S: AuditStore> AuditWriter<S> {
    pub fn new(rx: mpsc::Receiver<AdmissionEvent>, store: S) -> Self {
        Self { rx, store }
    }

    /// Drain events one at a time until the queue closes or shutdown fires.
    ///
    /// A serialization or persistence failure for one event is logged and
    /// the event dropped; the loop carries on with the next event. This is
    /// a best-effort sink with no retry and no dead-letter path.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => self.write_event(event).await,
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::debug!("Audit drain loop stopping");
                    break;
                }
            }
        }
    }

    async fn write_event(&mut self, event: AdmissionEvent) {
        let record = match serde_json::to_string(&event) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    identity = %event.identity,
                    error = %e,
                    "Failed to serialize audit event"
                );
                metrics::record_audit_failure("serialize");
                return;
            }
        };

        let bucket = match event.outcome {
            Outcome::Allowed => ALLOWED_BUCKET,
            Outcome::Denied => DENIED_BUCKET,
        };
        let field = audit_key(&event.identity);

        if let Err(e) = self.store.put(bucket, &field, &record).await {
            tracing::error!(
                identity = %event.identity,
                bucket,
                error = %e,
                "Failed to persist audit event"
            );
            metrics::record_audit_failure("store");
            return;
        }
        metrics::record_audit_write(event.outcome.as_str());
    }
}

/// Composite field key: wall-clock stamp, random token, identity.
///
/// The random token keeps concurrent events for one identity from
/// overwriting each other within the same second.
fn audit_key(identity: &str) -> String {
    format!(
        "{}::{}::{}",
        Utc::now().format("%Y%m%d-%H%M%S"),
        Uuid::new_v4(),
        identity
    )
}
