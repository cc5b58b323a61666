//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to provider:
//!     → timeouts.rs (enforce deadline on the whole call)
//!     → On expiry: reported as an upstream transport failure
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: one outbound attempt per inbound request
//! - Client disconnect drops the handler future and the outbound call with it

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineExceeded};
