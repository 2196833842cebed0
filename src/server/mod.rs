//! HTTP server implementation for minihttp-rs.
//!
//! Accepts TCP connections, runs one task per connection, and on each task
//! repeatedly parses a request, calls the user [`Handler`], and flushes the
//! response until the connection closes.

mod config;
mod connection;
mod error;
mod handler;
mod http_server;
mod response;

// Re-export public items
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{Handler, HandlerFuture};
pub use http_server::HttpServer;
pub use response::{ConnWriter, Response, StatusCode};
