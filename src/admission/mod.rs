//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → identity.rs (resolve client identity, build event record)
//!     → decider.rs (increment-and-read count, compare to quota)
//!     → counter.rs (per-identity count in the live window table)
//!     → event handed to the audit pipeline, allow/deny returned
//! ```
//!
//! # Design Decisions
//! - Every request increments the counter exactly once, denied ones included
//! - The counter table is owned by `WindowedCounter`; nothing else touches it
//! - An empty identity is never counted: counting an empty key would pool
//!   unrelated clients into one bucket

pub mod counter;
pub mod decider;
pub mod event;
pub mod identity;

pub use counter::WindowedCounter;
pub use decider::{AdmissionDecider, Decision};
pub use event::{AdmissionEvent, Outcome};
