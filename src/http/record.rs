//! Request Record rendering.
//!
//! A record is three parts: a `[<timestamp>] <url>` line, the captured
//! bytes (body, optionally preceded by the full-dump preamble) and a blank
//! line separating it from the next record.

use std::io::Write;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

/// One dumped request. Rendered once, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub timestamp: OffsetDateTime,
    pub url: String,
    pub body: Vec<u8>,
}

impl RequestRecord {
    /// Stamp a record with the current time at `offset`.
    pub fn now(offset: UtcOffset, url: String, body: Vec<u8>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc().to_offset(offset),
            url,
            body,
        }
    }

    /// Render the record as written to the output stream.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.url.len() + self.body.len() + 32);
        // writes into a Vec cannot fail
        let _ = writeln!(out, "[{}] {}", format_timestamp(self.timestamp), self.url);
        out.extend_from_slice(&self.body);
        out.extend_from_slice(b"\n\n");
        out
    }
}

/// RFC 3339 with whole seconds, e.g. `2024-05-01T13:37:00+02:00`.
pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let truncated = timestamp.replace_nanosecond(0).unwrap_or(timestamp);
    truncated
        .format(&Rfc3339)
        .unwrap_or_else(|_| truncated.unix_timestamp().to_string())
}

/// Offset of the local time zone, UTC when it cannot be determined.
///
/// Call before any threads are spawned; most platforms refuse to read the
/// local offset from a multi-threaded process.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
