//! IP Admission Control Service Library

pub mod admission;
pub mod audit;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
