//! Configuration schema definitions.

use std::time::Duration;
use time::UtcOffset;

/// Default per-connection read and write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Root configuration shared read-only by every listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    /// Addresses to listen on, in `host:port` form.
    pub addresses: Vec<String>,

    /// Per-connection read timeout. Zero disables it.
    pub read_timeout: Duration,

    /// Per-connection write timeout. Zero disables it.
    pub write_timeout: Duration,

    /// Dump protocol, method, URI and headers ahead of the body.
    pub full_dump: bool,

    /// Offset applied to record timestamps.
    pub utc_offset: UtcOffset,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            full_dump: false,
            utc_offset: UtcOffset::UTC,
        }
    }
}

impl DumpConfig {
    /// Configuration listening on `addresses` with default timeouts.
    pub fn with_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Read timeout as an option, `None` when disabled.
    pub fn read_deadline(&self) -> Option<Duration> {
        non_zero(self.read_timeout)
    }

    /// Write timeout as an option, `None` when disabled.
    pub fn write_deadline(&self) -> Option<Duration> {
        non_zero(self.write_timeout)
    }
}

fn non_zero(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}
