//! Admission event record.

use serde::Serialize;

/// Outcome of an admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Allowed,
    Denied,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allowed => "allowed",
            Outcome::Denied => "denied",
        }
    }
}

/// Record of a single admission decision and its request context.
///
/// Built by the identity extractor with `Allowed` as a placeholder; the
/// decider stamps the final outcome before the event is handed to the
/// audit pipeline. After that handoff the event is owned by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionEvent {
    /// Resolved client identity (forwarded address or peer address).
    pub identity: String,
    /// Raw `X-Forwarded-For` header value, possibly empty.
    pub forwarded_for: String,
    /// Request URL as received.
    pub url: String,
    pub user_agent: String,
    pub referrer: String,
    /// Auxiliary route parameter, empty for routes without one.
    pub tag: String,
    /// Wall-clock creation time, RFC 3339 with nanoseconds.
    pub timestamp: String,
    pub outcome: Outcome,
}
