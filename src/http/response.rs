//! JSON response envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// Uniform JSON body for every endpoint.
///
/// The embedded code mirrors the HTTP status so clients reading only the
/// body still see the outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub code: u16,
    pub status: String,
}

impl ApiResponse {
    pub fn new(code: StatusCode, status: impl Into<String>) -> Self {
        Self {
            code: code.as_u16(),
            status: status.into(),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
