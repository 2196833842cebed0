//! A minimal embeddable HTTP/1.x server.
//!
//! This library accepts TCP connections, parses each request incrementally
//! from the byte stream, hands it to a user handler, and writes back the
//! response, keeping connections alive between requests.
//!
//! # Features
//!
//! - Line-by-line request parsing into a fixed-size scratch buffer; header
//!   values are borrowed from that buffer rather than copied
//! - Precise parse error classification
//! - Content-Length bodies, read whole into per-request memory or piecewise
//!   into a caller buffer
//! - Keep-alive connections, one tokio task per connection
//! - A forced `400 Bad Request` for HTTP/1.1 requests without `Host`
//!
//! Chunked transfer-encoding, pipelining, TLS and HTTP/2 are not supported.
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use minihttp_rs::{read_request, Method, Protocol, RequestScratch};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), minihttp_rs::ParserError> {
//! let mut input: &'static [u8] =
//!     b"POST /submit?draft=1 HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhello";
//! let mut scratch = RequestScratch::default();
//!
//! let mut request = read_request(&mut input, &mut scratch).await?;
//! assert_eq!(request.method, Method::POST);
//! assert_eq!(request.protocol, Protocol::Http11);
//! assert_eq!(request.path(), "/submit");
//! assert_eq!(request.host, Some("example.com"));
//!
//! let body = request.read_body().await?;
//! assert_eq!(&body[..], b"hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a server
//!
//! ```no_run
//! use minihttp_rs::{Handler, HandlerFuture, HttpServer, Request, Response, ServerConfig};
//!
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn handle<'a>(&'a self, res: &'a mut Response<'_>, _req: Request<'a>) -> HandlerFuture<'a> {
//!         Box::pin(async move {
//!             res.set_content_type("text/plain");
//!             res.write("Hello, world!");
//!             Ok(())
//!         })
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), minihttp_rs::ServerError> {
//! HttpServer::new(ServerConfig::default(), Hello).start().await
//! # }
//! ```
//!
//! See the `demos` directory for complete programs.

// Per-request memory
pub mod arena;

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{
    read_request, Body, Error as ParserError, Header, HeaderIter, Method, Protocol, Request,
    RequestScratch, Url,
};
pub use server::{
    Error as ServerError, Handler, HandlerFuture, HttpServer, Response, ServerConfig, StatusCode,
};
