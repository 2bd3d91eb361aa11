//! Per-connection read and write deadlines.
//!
//! The read deadline is armed by the first read of a request (or of the idle
//! wait before it) and is not pushed back by progress: headers and body must
//! all arrive before it. The write deadline is armed once the request
//! headers have been read and bounds writing the response. Any read or
//! write attempted after its deadline fails with [`io::ErrorKind::TimedOut`].

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::{sleep_until, Instant, Sleep};

#[derive(Debug, Default)]
struct Deadlines {
    read: Option<Instant>,
    write: Option<Instant>,
}

/// Shared control over one connection's deadlines.
///
/// The stream consults it on every operation; the HTTP layer marks request
/// boundaries on it.
#[derive(Debug, Clone)]
pub struct DeadlineHandle {
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    deadlines: Arc<Mutex<Deadlines>>,
}

impl DeadlineHandle {
    fn new(read_timeout: Option<Duration>, write_timeout: Option<Duration>) -> Self {
        Self {
            read_timeout,
            write_timeout,
            deadlines: Arc::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Deadlines> {
        self.deadlines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request headers are in: the response must be written by now + write timeout.
    pub fn headers_read(&self) {
        if let Some(timeout) = self.write_timeout {
            self.lock().write = Some(Instant::now() + timeout);
        }
    }

    /// The response is produced; the next read starts a fresh read deadline.
    pub fn request_done(&self) {
        self.lock().read = None;
    }

    /// Current read deadline, arming it if this is the first read of a request.
    fn read_deadline(&self) -> Option<Instant> {
        let timeout = self.read_timeout?;
        let mut deadlines = self.lock();
        Some(*deadlines.read.get_or_insert_with(|| Instant::now() + timeout))
    }

    fn write_deadline(&self) -> Option<Instant> {
        self.lock().write
    }
}

/// Timer that wakes a pending operation at its deadline.
#[derive(Debug, Default)]
struct Timer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Timer {
    /// Called while the inner operation is pending.
    fn poll_until<T>(
        &mut self,
        deadline: Option<Instant>,
        cx: &mut Context<'_>,
        what: &str,
    ) -> Poll<io::Result<T>> {
        let Some(deadline) = deadline else {
            return Poll::Pending;
        };
        let sleep = self.sleep.get_or_insert_with(|| Box::pin(sleep_until(deadline)));
        if sleep.deadline() != deadline {
            sleep.as_mut().reset(deadline);
        }
        match sleep.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(Err(timed_out(what))),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn timed_out(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{what} deadline exceeded"))
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

/// Stream wrapper enforcing read and write deadlines.
#[derive(Debug)]
pub struct DeadlineStream<S> {
    inner: S,
    handle: DeadlineHandle,
    read_timer: Timer,
    write_timer: Timer,
}

impl<S> DeadlineStream<S> {
    /// Wrap `inner`; `None` disables the corresponding timeout.
    pub fn new(inner: S, read_timeout: Option<Duration>, write_timeout: Option<Duration>) -> Self {
        Self {
            inner,
            handle: DeadlineHandle::new(read_timeout, write_timeout),
            read_timer: Timer::default(),
            write_timer: Timer::default(),
        }
    }

    /// Handle for marking request boundaries on this connection.
    pub fn handle(&self) -> DeadlineHandle {
        self.handle.clone()
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for DeadlineStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let deadline = this.handle.read_deadline();
        if expired(deadline) {
            return Poll::Ready(Err(timed_out("read")));
        }
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => Poll::Ready(result),
            Poll::Pending => this.read_timer.poll_until(deadline, cx, "read"),
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for DeadlineStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let deadline = this.handle.write_deadline();
        if expired(deadline) {
            return Poll::Ready(Err(timed_out("write")));
        }
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(result) => Poll::Ready(result),
            Poll::Pending => this.write_timer.poll_until(deadline, cx, "write"),
        }
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let deadline = this.handle.write_deadline();
        if expired(deadline) {
            return Poll::Ready(Err(timed_out("write")));
        }
        match Pin::new(&mut this.inner).poll_write_vectored(cx, bufs) {
            Poll::Ready(result) => Poll::Ready(result),
            Poll::Pending => this.write_timer.poll_until(deadline, cx, "write"),
        }
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let deadline = this.handle.write_deadline();
        match Pin::new(&mut this.inner).poll_flush(cx) {
            Poll::Ready(result) => Poll::Ready(result),
            Poll::Pending => this.write_timer.poll_until(deadline, cx, "flush"),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
