//! Resilience subsystem.
//!
//! Accept failures that only concern a single connection (aborted
//! handshakes, descriptor exhaustion) are retried after an exponential
//! backoff instead of taking the listener down.

pub mod backoff;

pub use backoff::{calculate_backoff, ACCEPT_BACKOFF_BASE_MS, ACCEPT_BACKOFF_MAX_MS};
