//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Starting:
//!     Validate config → spawn one listener task per address
//!
//! Running:
//!     listeners serve; supervisor suspends on the fatal channel
//!
//! Terminating:
//!     first fatal error → caller prints it and exits
//! ```
//!
//! # Design Decisions
//! - Invalid configuration exits before any socket is bound
//! - One listener failing is fatal to the whole process
//! - Process exit is the only teardown; there is no graceful shutdown

pub mod fatal;
pub mod supervisor;

pub use fatal::{FatalErrors, FatalReporter};
pub use supervisor::{Running, Supervisor};
