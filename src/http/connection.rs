use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use crate::config::Config;
use crate::http::parser::{ParseEvent, RequestParser};
use crate::http::request::Request;
use crate::http::responder::Responder;
use crate::http::timer::IdleTimer;
use crate::http::writer::ResponseWriter;
use crate::listing::DirectoryLister;

/// Settings shared by every connection worker.
pub struct ConnectionContext {
    pub responder: Responder,
    pub idle_timeout: Duration,
    pub recv_buffer_size: usize,
    pub max_url_len: usize,
}

impl ConnectionContext {
    pub fn from_config(cfg: &Config, lister: Arc<dyn DirectoryLister>) -> Self {
        Self {
            responder: Responder::new(lister, cfg.server_name.clone()),
            idle_timeout: cfg.idle_timeout(),
            recv_buffer_size: cfg.recv_buffer_size,
            max_url_len: cfg.max_url_len,
        }
    }
}

/// Why a connection's read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer closed its side.
    PeerClosed,
    /// Read failed, including reads unblocked by a forced shutdown.
    ReadError,
    /// A request without keep-alive was answered.
    Completed,
    /// No bytes arrived within the idle window.
    IdleTimeout,
    /// The server is stopping.
    Shutdown,
    /// Writing a response failed; the rest of it was dropped.
    WriteError,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::PeerClosed => "peer closed",
            CloseReason::ReadError => "read error",
            CloseReason::Completed => "completed",
            CloseReason::IdleTimeout => "idle timeout",
            CloseReason::Shutdown => "shutdown",
            CloseReason::WriteError => "write error",
        };
        f.write_str(s)
    }
}

/// One accepted connection and everything its worker owns.
pub struct Connection<S> {
    id: u64,
    stream: S,
    buffer: Vec<u8>,
    parser: RequestParser,
    request: Request,
    timer: IdleTimer,
    context: Arc<ConnectionContext>,
    stopped: watch::Receiver<bool>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        id: u64,
        stream: S,
        context: Arc<ConnectionContext>,
        stopped: watch::Receiver<bool>,
    ) -> Self {
        Self {
            id,
            stream,
            buffer: vec![0; context.recv_buffer_size],
            parser: RequestParser::new(),
            request: Request::new(context.max_url_len),
            timer: IdleTimer::new(context.idle_timeout),
            context,
            stopped,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Serves requests until the connection ends, then shuts the stream down.
    pub async fn run(&mut self) -> CloseReason {
        let limit = self.buffer.len().saturating_sub(1);
        self.timer.rearm();

        let reason = 'serve: loop {
            if *self.stopped.borrow() {
                break CloseReason::Shutdown;
            }

            let read = tokio::select! {
                res = self.stream.read(&mut self.buffer[..limit]) => res,
                _ = self.timer.expired() => break 'serve CloseReason::IdleTimeout,
                Ok(()) = self.stopped.changed() => break 'serve CloseReason::Shutdown,
            };

            let n = match read {
                Ok(0) => break CloseReason::PeerClosed,
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(conn = self.id, error = %e, "Read failed");
                    break CloseReason::ReadError;
                }
            };
            self.timer.rearm();

            for event in self.parser.execute(&self.buffer[..n]) {
                tracing::trace!(conn = self.id, event = ?event, "Parser event");
                match event {
                    ParseEvent::MessageBegin => self.request.reset(),
                    ParseEvent::Url(fragment) => self.request.push_url(&fragment),
                    ParseEvent::HeadersComplete { method } => self.request.set_method(method),
                    ParseEvent::MessageComplete { keep_alive } => {
                        self.request.mark_complete();
                        // A peer that stops reading must not outlive the idle
                        // window or a shutdown.
                        let sent = tokio::select! {
                            res = respond(&self.context, &self.request, &mut self.stream, keep_alive) => res,
                            _ = self.timer.expired() => break 'serve CloseReason::IdleTimeout,
                            Ok(()) = self.stopped.changed() => break 'serve CloseReason::Shutdown,
                        };
                        if let Err(e) = sent {
                            tracing::debug!(conn = self.id, error = %e, "Write failed");
                            break 'serve CloseReason::WriteError;
                        }
                        if !keep_alive {
                            break 'serve CloseReason::Completed;
                        }
                    }
                }
            }

            self.timer.rearm();
            self.buffer.fill(0);
        };

        self.timer.cancel();
        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!(conn = self.id, error = %e, "Stream shutdown failed");
        }

        reason
    }
}

async fn respond<S>(
    context: &ConnectionContext,
    request: &Request,
    stream: &mut S,
    keep_alive: bool,
) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let response = context.responder.respond(request, keep_alive).await;
    ResponseWriter::new(&response).write_to_stream(stream).await
}
