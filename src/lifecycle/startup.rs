//! Startup orchestration.

use std::sync::Arc;
use std::time::Duration;

use crate::admission::{AdmissionDecider, WindowedCounter};
use crate::audit::pipeline::{AuditPipeline, AuditWriter};
use crate::audit::store::AuditStore;
use crate::config::GateConfig;
use crate::lifecycle::Shutdown;

/// Start the admission core: the windowed counter with its reset loop and
/// the audit pipeline with its drain loop.
///
/// Both loops are running when this returns, so the decider is safe to
/// serve traffic immediately. The caller binds the listener afterwards;
/// traffic only flows once the core is ready.
pub fn start_core<S: AuditStore>(
    config: &GateConfig,
    store: S,
    shutdown: &Shutdown,
) -> Arc<AdmissionDecider> {
    let counter = Arc::new(WindowedCounter::new());
    Arc::clone(&counter).spawn_reset_loop(
        Duration::from_secs(config.throttle.window_secs),
        shutdown.subscribe(),
    );

    let (pipeline, rx) = AuditPipeline::new(
        config.audit.queue_capacity,
        Duration::from_millis(config.audit.submit_timeout_ms),
    );
    let writer = AuditWriter::new(rx, store);
    let writer_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        writer.run(writer_shutdown).await;
    });

    tracing::info!(
        quota = config.throttle.quota_per_window,
        window_secs = config.throttle.window_secs,
        "Admission core started"
    );

    Arc::new(AdmissionDecider::new(
        counter,
        pipeline,
        config.throttle.quota_per_window,
    ))
}
