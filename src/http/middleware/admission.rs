//! Admission middleware.
//!
//! Runs after routing so the path parameter is available for the audit
//! record. Every matched request passes through here exactly once.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, RawPathParams, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::admission::identity;
use crate::audit::pipeline::SubmitError;
use crate::http::response::ApiResponse;
use crate::http::server::AppState;

pub async fn admission_middleware(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    params: RawPathParams,
    request: Request,
    next: Next,
) -> Response {
    let tag = params
        .iter()
        .find(|(name, _)| *name == "tag")
        .map(|(_, value)| value)
        .unwrap_or_default();

    let event = identity::extract(peer, request.headers(), request.uri(), tag);

    // An identity that cannot be resolved is never counted: counting an
    // empty key would pool unrelated clients into one bucket. The client
    // gets a distinct "incomplete" response instead of allow/deny.
    if event.identity.is_empty() {
        return ApiResponse::new(StatusCode::PARTIAL_CONTENT, "Partial Content").into_response();
    }

    match state.decider.decide(event).await {
        Ok(decision) if decision.allowed => next.run(request).await,
        Ok(decision) => ApiResponse::new(
            StatusCode::TOO_MANY_REQUESTS,
            format!(
                "Identity is not allowed. Already reached {}/{} for this window.",
                decision.count,
                state.decider.quota()
            ),
        )
        .into_response(),
        Err(SubmitError::Busy(_)) | Err(SubmitError::Closed) => ApiResponse::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service busy, try again later.",
        )
        .into_response(),
    }
}
