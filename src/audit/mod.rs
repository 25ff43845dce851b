//! Audit subsystem.
//!
//! # Data Flow
//! ```text
//! AdmissionDecider
//!     → pipeline.rs submit (bounded queue, blocks up to the submit timeout)
//!     → drain loop (one event at a time)
//!     → store.rs put (pipelined HSET into the Allowed or Denied bucket)
//! ```
//!
//! # Design Decisions
//! - Queue-full is backpressure, never a silent drop: audit completeness is
//!   favored over request latency under overload
//! - Best-effort sink: a failed write is logged and the event dropped, with
//!   no retry and no dead-letter path
//! - Audit failures never reach the decision path; isolation comes from the
//!   queue handoff and the separate drain task

pub mod pipeline;
pub mod store;

pub use pipeline::{AuditPipeline, AuditWriter, SubmitError};
pub use store::{AuditStore, MemoryStore, RedisStore, StoreError};
