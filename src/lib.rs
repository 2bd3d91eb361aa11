//! HTTP request dumper library.
//!
//! Listens on any number of addresses at once and writes a timestamped
//! record of every request it receives to standard output. The first
//! listener to fail takes the whole process down.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::DumpConfig;
pub use http::{DumpServer, RecordSink};
pub use lifecycle::Supervisor;
