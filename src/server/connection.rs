//! One connection's keep-alive loop.

use std::sync::Arc;

use log::{debug, error, warn};
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, ReadHalf, WriteHalf};
use tokio::time;

use crate::parser::{self, read_request, ConnReader, Protocol, RequestScratch};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::Handler;
use crate::server::response::{ConnWriter, Response, StatusCode};

/// What to do after a request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    KeepAlive,
    Close,
}

/// Per-connection state: both halves of the socket plus the memory reused by
/// every request on it.
pub(crate) struct Connection<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: BufWriter<WriteHalf<S>>,
    scratch: RequestScratch,
    handler: Arc<dyn Handler>,
    config: ServerConfig,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub(crate) fn new(stream: S, handler: Arc<dyn Handler>, config: ServerConfig) -> Self {
        let (read_half, write_half) = io::split(stream);
        let scratch = RequestScratch::new(config.read_buffer_size, config.arena_capacity, config.max_body_size)
            .with_arena_limit(config.arena_limit);

        Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            scratch,
            handler,
            config,
        }
    }

    /// Serve requests until the peer leaves, a request asks to close, or an
    /// error occurs. The socket is shut down on every exit path.
    pub(crate) async fn run(mut self) -> Result<(), Error> {
        let result = loop {
            let step = self.serve_one().await;
            // per-request memory is released whatever happened
            self.scratch.reset();

            match step {
                Ok(Next::KeepAlive) => continue,
                Ok(Next::Close) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = self.writer.shutdown().await {
            debug!("Error shutting down connection: {e}");
        }

        result
    }

    async fn serve_one(&mut self) -> Result<Next, Error> {
        let Self {
            reader,
            writer,
            scratch,
            handler,
            config,
        } = self;

        let conn_reader: &mut ConnReader = &mut *reader;
        let conn_writer: &mut ConnWriter = &mut *writer;

        let parsed = match config.read_timeout {
            Some(deadline) => match time::timeout(deadline, read_request(conn_reader, scratch)).await {
                Ok(parsed) => parsed,
                Err(_) => {
                    debug!("No request within {deadline:?}, closing idle connection");
                    return Ok(Next::Close);
                }
            },
            None => read_request(conn_reader, scratch).await,
        };

        let request = match parsed {
            Ok(request) => request,
            Err(e) if e.is_disconnect() => {
                debug!("Peer disconnected: {e}");
                return Ok(Next::Close);
            }
            Err(e) => return Err(e.into()),
        };

        let should_close = request.should_close;
        let missing_host = request.protocol == Protocol::Http11 && request.host.is_none();
        debug!("{} {} {}", request.method, request.url.path, request.protocol);

        let mut response = Response::new(conn_writer);
        if should_close {
            response.set_header("Connection", "close");
        }

        if let Err(e) = handler.handle(&mut response, request).await {
            error!("Handler failed, closing connection: {e}");
            return Err(e);
        }

        if missing_host {
            if response.is_flushed() {
                warn!("HTTP/1.1 request without Host was already answered by the handler");
            } else {
                debug!("HTTP/1.1 request without Host, answering 400");
                response.reset(StatusCode::BadRequest);
            }
        }

        if !response.is_flushed() {
            match config.write_timeout {
                Some(deadline) => time::timeout(deadline, response.flush())
                    .await
                    .map_err(|_| Error::Timeout)??,
                None => response.flush().await?,
            }
        }

        if should_close {
            return Ok(Next::Close);
        }

        let unread = scratch.take_unread_body();
        if unread > 0 {
            debug!("Discarding {unread} unread body bytes");
            let conn_reader: &mut ConnReader = &mut *reader;
            match parser::discard(conn_reader, unread).await {
                Ok(true) => {}
                Ok(false) => return Ok(Next::Close),
                Err(e) => {
                    let e = parser::Error::from(e);
                    if e.is_disconnect() {
                        debug!("Peer disconnected while discarding body: {e}");
                        return Ok(Next::Close);
                    }
                    return Err(e.into());
                }
            }
        }

        Ok(Next::KeepAlive)
    }
}
