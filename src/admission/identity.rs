//! Client identity extraction.
//!
//! # Responsibilities
//! - Resolve a stable identity for the requesting client
//! - Capture request context for the audit record
//!
//! # Design Decisions
//! - A forwarded address takes precedence over the transport peer: behind a
//!   proxy the peer address is the proxy, not the client
//! - Only the first `X-Forwarded-For` hop is used; later hops are proxies
//! - Distinct clients sharing a forwarded address collide on one identity;
//!   accepted as a known limitation

use std::net::SocketAddr;

use axum::http::{HeaderMap, Uri};
use chrono::{SecondsFormat, Utc};

use crate::admission::event::{AdmissionEvent, Outcome};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Build an [`AdmissionEvent`] for an inbound request.
///
/// The outcome is set to `Allowed` as a placeholder; the decider owns the
/// final value. There is no error path: a request whose identity cannot be
/// resolved yields an event with an empty identity, which callers must
/// treat as "do not count, do not deny".
pub fn extract(peer: SocketAddr, headers: &HeaderMap, uri: &Uri, tag: &str) -> AdmissionEvent {
    let forwarded_for = header_value(headers, FORWARDED_FOR);
    let identity = resolve_identity(peer, &forwarded_for);

    AdmissionEvent {
        identity,
        forwarded_for,
        url: uri.to_string(),
        user_agent: header_value(headers, "user-agent"),
        referrer: header_value(headers, "referer"),
        tag: tag.trim().to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        outcome: Outcome::Allowed,
    }
}

/// First non-empty forwarded hop, else the peer address with the port
/// stripped.
fn resolve_identity(peer: SocketAddr, forwarded_for: &str) -> String {
    if let Some(first) = forwarded_for.split(',').next() {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    peer.ip().to_string()
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.1.2.3:54321".parse().unwrap()
    }

    #[test]
    fn test_peer_address_port_stripped() {
        let event = extract(peer(), &HeaderMap::new(), &Uri::from_static("/"), "");
        assert_eq!(event.identity, "10.1.2.3");
        assert_eq!(event.outcome, Outcome::Allowed);
    }

    #[test]
    fn test_forwarded_for_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("9.9.9.9, 10.0.0.1"));

        let event = extract(peer(), &headers, &Uri::from_static("/v1/api/request/x"), "x");
        assert_eq!(event.identity, "9.9.9.9");
        assert_eq!(event.forwarded_for, "9.9.9.9, 10.0.0.1");
    }

    #[test]
    fn test_blank_forwarded_hop_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("  , 10.0.0.1"));

        let event = extract(peer(), &headers, &Uri::from_static("/"), "");
        assert_eq!(event.identity, "10.1.2.3");
    }

    #[test]
    fn test_context_captured() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));
        headers.insert("referer", HeaderValue::from_static("https://example.com/"));

        let event = extract(
            peer(),
            &headers,
            &Uri::from_static("/v1/api/request/ping?x=1"),
            "  ping ",
        );
        assert_eq!(event.user_agent, "curl/8.0");
        assert_eq!(event.referrer, "https://example.com/");
        assert_eq!(event.url, "/v1/api/request/ping?x=1");
        assert_eq!(event.tag, "ping");
        assert!(!event.timestamp.is_empty());
    }
}
