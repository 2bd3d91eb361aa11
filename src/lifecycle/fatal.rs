//! Fatal Error Channel.
//!
//! Listeners report unrecoverable failures through a [`FatalReporter`]; the
//! supervisor suspends on the matching [`FatalErrors`] until the first one
//! arrives.

use tokio::sync::mpsc;

use crate::net::ListenerError;

/// Create the channel. Only the first reported error is kept.
pub fn channel() -> (FatalReporter, FatalErrors) {
    let (tx, rx) = mpsc::channel(1);
    (FatalReporter { tx }, FatalErrors { rx })
}

/// Sending half, cloned into every listener task.
#[derive(Debug, Clone)]
pub struct FatalReporter {
    tx: mpsc::Sender<ListenerError>,
}

impl FatalReporter {
    /// Report a fatal error without ever blocking the reporting task.
    pub fn report(&self, err: ListenerError) {
        tracing::debug!(error = %err, "Listener failed");
        if let Err(mpsc::error::TrySendError::Full(dropped)) = self.tx.try_send(err) {
            tracing::debug!(error = %dropped, "Fatal error already pending, dropping");
        }
    }
}

/// Receiving half, owned by the supervisor.
#[derive(Debug)]
pub struct FatalErrors {
    rx: mpsc::Receiver<ListenerError>,
}

impl FatalErrors {
    /// Wait for the first fatal error.
    ///
    /// Resolves with [`ListenerError::Stopped`] if every reporter is gone
    /// without anything having been reported.
    pub async fn wait(&mut self) -> ListenerError {
        self.rx.recv().await.unwrap_or(ListenerError::Stopped)
    }
}
