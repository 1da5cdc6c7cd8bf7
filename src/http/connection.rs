use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::DEFAULT_MAX_REQUEST_BYTES;
use crate::http::parser::{parse_http_request_limited, ParseError};
use crate::http::request::Request;
use crate::http::router::Router;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 4096;

/// One accepted socket serving exactly one request.
pub struct Connection<S = TcpStream> {
    stream: S,
    buffer: BytesMut,
    router: Router,
    max_request_bytes: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Routed(Request),
    Writing(ResponseWriter),
    /// Response sent and the outbound side shut down.
    HalfClosed,
    /// An I/O or parse error ended the exchange without a response.
    Abandoned,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Router) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            router,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            state: ConnectionState::Reading,
        }
    }

    pub fn with_max_request_bytes(mut self, max: usize) -> Self {
        self.max_request_bytes = max;
        self
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Drives the connection to a terminal state.
    ///
    /// Any error leaves the connection `Abandoned`; nothing is written to
    /// the peer in that case.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        if result.is_err() {
            self.state = ConnectionState::Abandoned;
        }
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    let req = self.read_request().await?;
                    self.state = ConnectionState::Routed(req);
                }

                ConnectionState::Routed(req) => {
                    tracing::trace!(method = req.method.as_str(), path = %req.path, "routing request");
                    let response = self.router.route(req);
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.stream.shutdown().await?;
                    self.state = ConnectionState::HalfClosed;
                }

                ConnectionState::HalfClosed | ConnectionState::Abandoned => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until one complete request is buffered.
    ///
    /// Bytes after the first request are left unread; a connection never
    /// serves a second request.
    pub async fn read_request(&mut self) -> anyhow::Result<Request> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request_limited(&self.buffer, self.max_request_bytes) {
                Ok((request, _consumed)) => return Ok(request),

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => {
                    return Err(anyhow::anyhow!("HTTP parse error: {:?}", e));
                }
            }

            self.buffer.reserve(READ_CHUNK);
            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                anyhow::bail!(
                    "peer closed connection after {} bytes without a complete request",
                    self.buffer.len()
                );
            }
        }
    }
}
