//! HTTP server implementation.

use std::future::{self, Future};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::{JoinError, JoinSet};

use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::error::Error;
use crate::server::handler::Handler;

/// How long shutdown waits for in-flight connections.
const SHUTDOWN_GRACE: tokio::time::Duration = tokio::time::Duration::from_secs(30);

/// Connections still being served, owned by the accept loop.
///
/// Each connection task owns its socket and scratch memory; both are released
/// when the task finishes, and the table reaps each finished task once.
struct ConnectionTable {
    tasks: JoinSet<(SocketAddr, Result<(), Error>)>,
}

impl ConnectionTable {
    fn new() -> Self {
        Self { tasks: JoinSet::new() }
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn spawn<S>(&mut self, stream: S, peer: SocketAddr, handler: Arc<dyn Handler>, config: ServerConfig)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        self.tasks.spawn(async move {
            let result = Connection::new(stream, handler, config).run().await;
            (peer, result)
        });
    }

    /// Wait for the next connection to finish. `None` when the table is empty.
    async fn next_finished(&mut self) -> Option<Result<(SocketAddr, Result<(), Error>), JoinError>> {
        self.tasks.join_next().await
    }

    fn reap(finished: Result<(SocketAddr, Result<(), Error>), JoinError>) {
        match finished {
            Ok((peer, Ok(()))) => debug!("Connection from {peer} closed"),
            Ok((peer, Err(e))) => warn!("Connection from {peer} closed with error: {e}"),
            Err(e) => error!("Connection task failed: {e}"),
        }
    }

    /// Wait (bounded) for every remaining connection.
    async fn drain(&mut self) {
        info!("Waiting for {len} active connections to complete...", len = self.len());
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(finished) = self.next_finished().await {
                Self::reap(finished);
            }
        })
        .await;

        if drained.is_err() {
            warn!("Aborting {len} connections still open after shutdown grace period", len = self.len());
            self.tasks.abort_all();
        }
    }
}

/// An HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    handler: Arc<dyn Handler>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and handler.
    pub fn new(config: ServerConfig, handler: impl Handler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Bind the configured address and serve until Ctrl+C.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = self.setup_listener().await?;

        let ctrl_c = async {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                    future::pending::<()>().await;
                }
            }
        };

        self.serve_with_shutdown(listener, ctrl_c).await
    }

    /// Serve connections from an already bound listener, forever.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        self.serve_with_shutdown(listener, future::pending()).await
    }

    /// Serve connections until `shutdown` resolves or accepting fails fatally.
    pub async fn serve_with_shutdown(
        &self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let mut connections = ConnectionTable::new();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                // Check for shutdown signal
                _ = &mut shutdown => {
                    info!("Shutting down server...");
                    break Ok(());
                }

                // Reclaim connections that have finished
                Some(finished) = connections.next_finished() => {
                    ConnectionTable::reap(finished);
                }

                // Accept new connections
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, peer)) => {
                            debug!("Accepted connection from {peer}");
                            connections.spawn(socket, peer, self.handler.clone(), self.config.clone());
                        }
                        Err(e) if is_transient(&e) => {
                            warn!("Transient error accepting connection: {e}");
                        }
                        Err(e) => {
                            error!("Critical error accepting connection, shutting down: {e}");
                            break Err(Error::IoError(e));
                        }
                    }
                }
            }
        };

        connections.drain().await;
        info!("Server shutdown complete");

        result
    }

    /// Serve every request on a single connection until it closes.
    pub async fn handle_connection<S>(
        stream: S,
        handler: Arc<dyn Handler>,
        config: ServerConfig,
    ) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        Connection::new(stream, handler, config).run().await
    }
}

/// Accept failures worth retrying.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
    )
}
