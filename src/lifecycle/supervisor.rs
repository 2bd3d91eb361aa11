//! Listener Supervisor.
//!
//! # Responsibilities
//! - Refuse to start without at least one address
//! - Start one listener task per configured address
//! - Wait for the first fatal error from any of them
//!
//! # Design Decisions
//! - Each listener binds inside its own task, so bind failures travel the
//!   same path as runtime failures
//! - No listener is stopped when another fails; the caller ends the process

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::config::{validate_config, ConfigError, DumpConfig};
use crate::http::{DumpServer, RecordSink};
use crate::lifecycle::fatal::{self, FatalErrors, FatalReporter};
use crate::net::{Listener, ListenerError};

/// Owns the configuration and the server shared by all listeners.
pub struct Supervisor {
    config: Arc<DumpConfig>,
    server: DumpServer,
}

impl Supervisor {
    /// Create a supervisor writing records to `sink`.
    pub fn new(config: DumpConfig, sink: RecordSink) -> Self {
        let server = DumpServer::new(&config, sink);
        Self {
            config: Arc::new(config),
            server,
        }
    }

    /// Validate the configuration and spawn every listener.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> Result<Running, ConfigError> {
        validate_config(&self.config)?;

        let (reporter, errors) = fatal::channel();
        let mut bound = Vec::with_capacity(self.config.addresses.len());

        for address in &self.config.addresses {
            let (ready_tx, ready_rx) = oneshot::channel();
            bound.push(ready_rx);

            let task = ListenerTask {
                address: address.clone(),
                config: Arc::clone(&self.config),
                server: self.server.clone(),
                reporter: reporter.clone(),
            };
            tokio::spawn(task.run(ready_tx));
        }

        tracing::info!(listeners = bound.len(), "Listeners started");
        Ok(Running {
            errors,
            bound,
            bound_addrs: Vec::new(),
        })
    }
}

struct ListenerTask {
    address: String,
    config: Arc<DumpConfig>,
    server: DumpServer,
    reporter: FatalReporter,
}

impl ListenerTask {
    async fn run(self, ready: oneshot::Sender<SocketAddr>) {
        match Self::listen(&self.address, &self.config, self.server, ready).await {
            Ok(never) => match never {},
            Err(err) => self.reporter.report(err),
        }
    }

    async fn listen(
        address: &str,
        config: &DumpConfig,
        server: DumpServer,
        ready: oneshot::Sender<SocketAddr>,
    ) -> Result<Infallible, ListenerError> {
        let listener = Listener::bind(address, config).await?;
        // nobody may be waiting for readiness
        let _ = ready.send(listener.local_addr()?);
        server.serve(listener).await
    }
}

/// Handle on the running listeners.
pub struct Running {
    errors: FatalErrors,
    bound: Vec<oneshot::Receiver<SocketAddr>>,
    bound_addrs: Vec<SocketAddr>,
}

impl Running {
    /// Wait until every listener is bound and return their socket addresses
    /// in configuration order.
    ///
    /// If a listener fails to bind, its error is taken from the fatal
    /// channel and returned instead.
    pub async fn bound_addrs(&mut self) -> Result<Vec<SocketAddr>, ListenerError> {
        for ready in std::mem::take(&mut self.bound) {
            match ready.await {
                Ok(addr) => self.bound_addrs.push(addr),
                Err(_) => return Err(self.errors.wait().await),
            }
        }
        Ok(self.bound_addrs.clone())
    }

    /// Suspend until the first fatal error from any listener.
    pub async fn wait(mut self) -> ListenerError {
        self.errors.wait().await
    }
}
