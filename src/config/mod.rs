//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line (cli.rs)
//!     → duration.rs (Go-style -rto / -wto values)
//!     → schema.rs (DumpConfig)
//!     → validation.rs (semantic checks)
//!     → shared via Arc to every listener
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no reload
//! - Address syntax is left to the listeners so that a bad address
//!   surfaces as a listener failure

pub mod duration;
pub mod schema;
pub mod validation;

pub use duration::{parse_duration, DurationError};
pub use schema::DumpConfig;
pub use validation::{validate_config, ConfigError};
