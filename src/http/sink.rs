//! Shared output stream for request records.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::http::record::RequestRecord;

/// Cloneable handle to the stream every listener writes records to.
///
/// Each record is written whole under a lock, so records from concurrent
/// requests never interleave.
#[derive(Clone)]
pub struct RecordSink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl RecordSink {
    /// Sink writing to an arbitrary writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write one record. Failures are logged and otherwise ignored.
    pub fn emit(&self, record: &RequestRecord) {
        let rendered = record.render();
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = out.write_all(&rendered).and_then(|()| out.flush()) {
            tracing::warn!(error = %err, url = %record.url, "Failed to write request record");
        }
    }
}

impl fmt::Debug for RecordSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSink").finish_non_exhaustive()
    }
}
