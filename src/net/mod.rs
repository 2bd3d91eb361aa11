//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured address
//!     → listener.rs (bind, accept loop errors)
//!     → deadline.rs (per-request read/write deadlines)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - One listener per configured address, each bound inside its own task
//! - Deadlines live on the stream so they cover header, body and response I/O;
//!   the HTTP layer only marks where each request starts and ends

pub mod deadline;
pub mod listener;

pub use deadline::{DeadlineHandle, DeadlineStream};
pub use listener::{Listener, ListenerError};
