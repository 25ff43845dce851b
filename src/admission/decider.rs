//! Allow/deny decision against the window quota.

use std::sync::Arc;

use crate::admission::counter::WindowedCounter;
use crate::admission::event::{AdmissionEvent, Outcome};
use crate::audit::pipeline::{AuditPipeline, SubmitError};
use crate::observability::metrics;

/// Result of an admission decision.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub allowed: bool,
    /// The identity's count within the current window, after this request.
    pub count: u64,
}

/// Compares per-identity counts against the configured quota and feeds
/// every decision to the audit pipeline.
pub struct AdmissionDecider {
    counter: Arc<WindowedCounter>,
    pipeline: AuditPipeline,
    quota: u64,
}

impl AdmissionDecider {
    pub fn new(counter: Arc<WindowedCounter>, pipeline: AuditPipeline, quota: u64) -> Self {
        Self {
            counter,
            pipeline,
            quota,
        }
    }

    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Count the event's identity and decide admission.
    ///
    /// Every request increments the counter exactly once, denied requests
    /// included; there is no separate probe path. The event is submitted
    /// to the audit pipeline on every decision, not only on denial. A full
    /// queue surfaces as [`SubmitError::Busy`] so the caller can shed the
    /// request instead of blocking without bound.
    ///
    /// Callers must not pass an event with an empty identity; those bypass
    /// admission entirely.
    pub async fn decide(&self, mut event: AdmissionEvent) -> Result<Decision, SubmitError> {
        debug_assert!(!event.identity.is_empty());

        let count = self.counter.increment_and_get(&event.identity);
        let allowed = count <= self.quota;
        if !allowed {
            event.outcome = Outcome::Denied;
            tracing::warn!(
                identity = %event.identity,
                count,
                quota = self.quota,
                "Quota exceeded"
            );
        }
        metrics::record_admission(event.outcome.as_str());

        self.pipeline.submit(event).await?;

        Ok(Decision { allowed, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn decider(quota: u64, capacity: usize) -> (AdmissionDecider, tokio::sync::mpsc::Receiver<AdmissionEvent>) {
        let (pipeline, rx) = AuditPipeline::new(capacity, Duration::from_millis(50));
        let counter = Arc::new(WindowedCounter::new());
        (AdmissionDecider::new(counter, pipeline, quota), rx)
    }

    fn event(identity: &str) -> AdmissionEvent {
        AdmissionEvent {
            identity: identity.to_string(),
            forwarded_for: String::new(),
            url: "/".to_string(),
            user_agent: String::new(),
            referrer: String::new(),
            tag: String::new(),
            timestamp: String::new(),
            outcome: Outcome::Allowed,
        }
    }

    #[tokio::test]
    async fn test_denies_above_quota_with_increasing_counts() {
        let (decider, _rx) = decider(3, 16);

        for expected in 1..=3 {
            let d = decider.decide(event("1.2.3.4")).await.unwrap();
            assert!(d.allowed);
            assert_eq!(d.count, expected);
        }

        let d = decider.decide(event("1.2.3.4")).await.unwrap();
        assert!(!d.allowed);
        assert_eq!(d.count, 4);
    }

    #[tokio::test]
    async fn test_denied_identity_does_not_affect_others() {
        let (decider, _rx) = decider(2, 16);

        for _ in 0..5 {
            decider.decide(event("1.2.3.4")).await.unwrap();
        }
        let d = decider.decide(event("5.6.7.8")).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.count, 1);
    }

    #[tokio::test]
    async fn test_every_decision_is_audited_with_final_outcome() {
        let (decider, mut rx) = decider(2, 16);

        for _ in 0..3 {
            decider.decide(event("1.2.3.4")).await.unwrap();
        }

        let outcomes: Vec<Outcome> = (0..3).map(|_| rx.try_recv().unwrap().outcome).collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Allowed, Outcome::Allowed, Outcome::Denied]
        );
        assert!(rx.try_recv().is_err(), "exactly one event per decision");
    }

    #[tokio::test]
    async fn test_full_queue_surfaces_as_busy() {
        let (decider, _rx) = decider(10, 1);

        decider.decide(event("1.2.3.4")).await.unwrap();
        match decider.decide(event("1.2.3.4")).await {
            Err(SubmitError::Busy(_)) => {}
            other => panic!("expected Busy, got {:?}", other.map(|d| d.count)),
        }
    }
}
