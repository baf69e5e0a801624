use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::files::Dispatcher;
use crate::http::parser::{RequestError, read_request};
use crate::http::reader::LineReader;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Drives one client connection: read a request, answer it, repeat until
/// either side asks to close.
pub struct Connection<S> {
    lines: LineReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    dispatcher: Arc<Dispatcher>,
    max_headers: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitingRequest,
    Parsed(Request),
    Failed(RequestError),
    Responding(Response),
    Closed,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, dispatcher: Arc<Dispatcher>, settings: &ServerConfig) -> Self {
        Self::with_limits(
            stream,
            dispatcher,
            settings.read_timeout(),
            settings.max_line_bytes,
            settings.max_headers,
        )
    }

    /// Like [`Connection::new`], with the per-line read deadline, line
    /// length cap and header count cap given directly.
    pub fn with_limits(
        stream: S,
        dispatcher: Arc<Dispatcher>,
        read_timeout: Duration,
        max_line_bytes: usize,
        max_headers: usize,
    ) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            lines: LineReader::new(reader, read_timeout, max_line_bytes),
            writer,
            dispatcher,
            max_headers,
            state: ConnectionState::AwaitingRequest,
        }
    }

    /// Serves requests until the connection closes.
    ///
    /// Returns an error only when writing a response fails; every other way a
    /// connection can end is a normal close.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::AwaitingRequest => {
                    self.state = match read_request(&mut self.lines, self.max_headers).await {
                        Ok(req) => ConnectionState::Parsed(req),
                        Err(e) => ConnectionState::Failed(e),
                    };
                }

                ConnectionState::Parsed(req) => {
                    debug!(
                        method = %req.method,
                        request_target = %req.target,
                        host = %req.host,
                        "Request received"
                    );
                    let response = self.dispatcher.dispatch(req).await;
                    self.state = ConnectionState::Responding(response);
                }

                ConnectionState::Failed(err) => {
                    self.state = Self::recover(err);
                }

                ConnectionState::Responding(response) => {
                    let mut writer = ResponseWriter::new(&response);
                    if let Err(e) = writer.write_to_stream(&mut self.writer).await {
                        let _ = self.writer.shutdown().await;
                        return Err(e.context("writing response"));
                    }
                    debug!(status = response.status.as_u16(), "Response sent");

                    self.state = if response.closes_connection() {
                        ConnectionState::Closed
                    } else {
                        ConnectionState::AwaitingRequest
                    };
                }

                ConnectionState::Closed => break,
            }
        }

        if let Err(e) = self.writer.shutdown().await {
            debug!(error = %e, "Shutdown after close failed");
        }
        Ok(())
    }

    /// Decides how a failed read ends: silently, or with a 400 first.
    fn recover(err: RequestError) -> ConnectionState {
        match err {
            RequestError::EndOfStream { bytes_received } => {
                if bytes_received {
                    debug!("Client closed mid-request");
                }
                ConnectionState::Closed
            }
            RequestError::Timeout { bytes_received: false } => {
                debug!("Idle connection timed out");
                ConnectionState::Closed
            }
            RequestError::Timeout { bytes_received: true } => {
                warn!("Timed out on a partial request");
                ConnectionState::Responding(Response::bad_request())
            }
            RequestError::Parse(e) => {
                // Every parse error maps to 400, which closes the connection.
                debug!(error = %e, status = e.status().as_u16(), "Malformed request");
                ConnectionState::Responding(Response::bad_request())
            }
            RequestError::Io(e) => {
                debug!(error = %e, "Read failed");
                ConnectionState::Closed
            }
        }
    }
}
