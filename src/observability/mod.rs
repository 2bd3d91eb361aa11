//! Observability subsystem.
//!
//! Diagnostics only: listener lifecycle at info, retries at warn,
//! per-connection and per-request detail at debug. Request records
//! themselves are not log events; see [`crate::http::sink`].

pub mod logging;

pub use logging::init_logging;
