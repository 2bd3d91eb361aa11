//! TCP listener for a single configured address.
//!
//! # Responsibilities
//! - Bind to one configured address
//! - Accept incoming TCP connections
//! - Wrap every accepted stream with the configured read/write deadlines
//! - Classify accept errors as transient or fatal

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use crate::config::DumpConfig;
use crate::net::deadline::DeadlineStream;

/// Error type for listener operations. Every variant is fatal to the process.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("listen tcp {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
    /// Failed to accept connection.
    #[error("accept tcp {address}: {source}")]
    Accept {
        address: String,
        #[source]
        source: io::Error,
    },
    /// Every listener task ended without reporting an error.
    #[error("all listeners stopped")]
    Stopped,
}

impl ListenerError {
    /// Whether this is a per-connection accept failure worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ListenerError::Accept { source, .. } => is_transient_accept_error(source),
            _ => false,
        }
    }
}

#[cfg(unix)]
const FD_EXHAUSTED: [i32; 2] = [23, 24]; // ENFILE, EMFILE
#[cfg(not(unix))]
const FD_EXHAUSTED: [i32; 0] = [];

fn is_transient_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    ) || err
        .raw_os_error()
        .is_some_and(|code| FD_EXHAUSTED.contains(&code))
}

/// `:port` means every interface.
fn bind_target(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

/// A TCP listener bound to one configured address.
#[derive(Debug)]
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Address as given on the command line.
    address: String,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl Listener {
    /// Bind to `address` with the timeouts from `config`.
    pub async fn bind(address: &str, config: &DumpConfig) -> Result<Self, ListenerError> {
        let bind_error = |source| ListenerError::Bind {
            address: address.to_string(),
            source,
        };

        let listener = TcpListener::bind(bind_target(address))
            .await
            .map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        tracing::info!(
            address = %address,
            local_addr = %local_addr,
            read_timeout = ?config.read_timeout,
            write_timeout = ?config.write_timeout,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            address: address.to_string(),
            read_timeout: config.read_deadline(),
            write_timeout: config.write_deadline(),
        })
    }

    /// Accept a new connection, wrapped with the configured deadlines.
    pub async fn accept(&self) -> Result<(DeadlineStream<TcpStream>, SocketAddr), ListenerError> {
        let (stream, peer_addr) = self.inner.accept().await.map_err(|source| ListenerError::Accept {
            address: self.address.clone(),
            source,
        })?;

        tracing::debug!(
            address = %self.address,
            peer_addr = %peer_addr,
            "Connection accepted"
        );

        let stream = DeadlineStream::new(stream, self.read_timeout, self.write_timeout);
        Ok((stream, peer_addr))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        self.inner.local_addr().map_err(|source| ListenerError::Bind {
            address: self.address.clone(),
            source,
        })
    }

    /// The address as configured.
    pub fn address(&self) -> &str {
        &self.address
    }
}
