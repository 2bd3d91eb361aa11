//! HTTP server setup for one listener.
//!
//! # Responsibilities
//! - Create the Axum Router around the dump handler
//! - Accept connections from a bound [`Listener`], retrying transient errors
//! - Serve each connection (HTTP/1.1 or cleartext HTTP/2) on its own task
//! - Mark request boundaries so read and write deadlines restart per request
//! - Return only on a fatal accept error

use axum::{extract::Request, Router};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use std::convert::Infallible;
use tower::Service;
use tower_http::trace::TraceLayer;

use crate::config::DumpConfig;
use crate::http::dump::{dump_handler, DumpState};
use crate::http::sink::RecordSink;
use crate::net::{Listener, ListenerError};
use crate::resilience::{calculate_backoff, ACCEPT_BACKOFF_BASE_MS, ACCEPT_BACKOFF_MAX_MS};

/// HTTP server running the dump handler. Cheap to clone; every listener
/// gets its own clone sharing the same sink.
#[derive(Clone)]
pub struct DumpServer {
    router: Router,
}

impl DumpServer {
    /// Create a new server with the given configuration.
    pub fn new(config: &DumpConfig, sink: RecordSink) -> Self {
        let state = DumpState {
            full_dump: config.full_dump,
            utc_offset: config.utc_offset,
            sink,
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router; every method and path reaches the handler.
    fn build_router(state: DumpState) -> Router {
        Router::new()
            .fallback(dump_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the handler without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve connections from `listener` until accepting fails for good.
    pub async fn serve(self, listener: Listener) -> Result<Infallible, ListenerError> {
        tracing::info!(address = %listener.address(), "HTTP server starting");

        let mut failures: u32 = 0;
        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => {
                    failures = 0;
                    conn
                }
                Err(err) if err.is_transient() => {
                    failures = failures.saturating_add(1);
                    let delay =
                        calculate_backoff(failures, ACCEPT_BACKOFF_BASE_MS, ACCEPT_BACKOFF_MAX_MS);
                    tracing::warn!(error = %err, retry_in = ?delay, "Accept failed, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let tower_service = self.router.clone();
            let deadlines = stream.handle();
            tokio::spawn(async move {
                let hyper_service = hyper::service::service_fn(move |request: Request<Incoming>| {
                    // hyper calls the service once the request headers are parsed
                    deadlines.headers_read();
                    let response = tower_service.clone().call(request);
                    let deadlines = deadlines.clone();
                    async move {
                        let response = response.await;
                        deadlines.request_done();
                        response
                    }
                });

                if let Err(err) = auto::Builder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), hyper_service)
                    .await
                {
                    tracing::debug!(peer_addr = %peer_addr, error = %err, "Connection closed with error");
                }
            });
        }
    }
}
