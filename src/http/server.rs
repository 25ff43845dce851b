//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (admission, timeout, trace)
//! - Bind server to listener
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admission::AdmissionDecider;
use crate::config::GateConfig;
use crate::http::middleware::admission_middleware;
use crate::http::response::ApiResponse;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub decider: Arc<AdmissionDecider>,
}

/// HTTP server for the admission gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig, decider: Arc<AdmissionDecider>) -> Self {
        let state = AppState { decider };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Admission is a route layer so it runs after routing, with the path
    /// parameter in scope, and skips unmatched paths entirely.
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(index))
            .route(
                "/v1/api/request/{tag}",
                get(request_get)
                    .post(request_post)
                    .put(request_put)
                    .delete(request_delete),
            )
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                admission_middleware,
            ))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

async fn index() -> ApiResponse {
    ApiResponse::new(StatusCode::OK, "Welcome!")
}

async fn request_get() -> ApiResponse {
    ApiResponse::new(StatusCode::OK, "RequestGet::Welcome")
}

async fn request_post() -> ApiResponse {
    ApiResponse::new(StatusCode::OK, "RequestPost::Welcome")
}

async fn request_put() -> ApiResponse {
    ApiResponse::new(StatusCode::OK, "RequestPut::Welcome")
}

async fn request_delete() -> ApiResponse {
    ApiResponse::new(StatusCode::OK, "RequestDelete::Welcome")
}
