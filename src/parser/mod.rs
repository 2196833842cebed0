//! HTTP parser module.
//!
//! Reads a request head line by line from a buffered stream into a fixed-size
//! scratch buffer, and exposes the body as a bounded read of the same stream.

mod body;
mod error;
mod method;
mod request;
mod state;
mod url;
mod version;
mod tests;

// Re-export public items
pub use body::{Body, BodyReader};
pub use error::Error;
pub use method::Method;
pub use request::{
    ConnReader, Header, HeaderIter, Request, RequestScratch, DEFAULT_ARENA_CAPACITY,
    DEFAULT_ARENA_LIMIT, DEFAULT_HEADER_LIMIT, DEFAULT_MAX_BODY_SIZE,
};
pub use state::{Parsed, Parser, Progress};
pub use url::Url;
pub use version::Protocol;

// Re-export the read_request function
pub use request::read_request;

pub(crate) use body::discard;
