//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Connect audit store → Start background
//!     loops → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Background loops exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: the counter table and both loops are live before
//!   the listener accepts traffic
//! - The reset loop, the drain loop, and the server all subscribe to one
//!   shutdown broadcast

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
