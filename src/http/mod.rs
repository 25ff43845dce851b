//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routes, timeout/trace layers)
//!     → middleware/admission.rs (identity, quota check, audit handoff)
//!     → handler (JSON envelope)
//!     → response.rs (ApiResponse → status code + body)
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use response::ApiResponse;
pub use server::{AppState, HttpServer};
