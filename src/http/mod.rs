//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection (net layer)
//!     → server.rs (hyper-util connection, Axum router)
//!     → dump.rs (preamble + body capture)
//!     → record.rs (timestamped record)
//!     → sink.rs (shared output stream)
//!     → empty 200 OK to the client
//! ```

pub mod dump;
pub mod record;
pub mod server;
pub mod sink;

pub use dump::DumpState;
pub use record::RequestRecord;
pub use server::DumpServer;
pub use sink::RecordSink;
