//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::arena::RequestArena;
use crate::parser::body::{Body, BodyReader};
use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::state::{split_header, Parser, Progress};
use crate::parser::url::Url;
use crate::parser::version::Protocol;

/// The read side of a connection, as seen by the parser and body reader.
pub type ConnReader = dyn AsyncBufRead + Unpin + Send;

/// Default bound on status line plus headers.
pub const DEFAULT_HEADER_LIMIT: usize = 8192;

/// Default bound on bodies read with [`Request::read_body`].
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default initial size of the per-request arena region.
pub const DEFAULT_ARENA_CAPACITY: usize = 4096;

/// Default ceiling on arena memory handed out per request.
pub const DEFAULT_ARENA_LIMIT: usize = 4 * 1024 * 1024;

/// Memory reused by every request parsed on one connection.
#[derive(Debug)]
pub struct RequestScratch {
    buf: Vec<u8>,
    limit: usize,
    arena: RequestArena,
    unread_body: u64,
    max_body_size: usize,
}

impl Default for RequestScratch {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_LIMIT, DEFAULT_ARENA_CAPACITY, DEFAULT_MAX_BODY_SIZE)
    }
}

impl RequestScratch {
    /// Create scratch space.
    ///
    /// # Arguments
    ///
    /// * `header_limit` - Fixed bound shared by the status line and all headers
    /// * `arena_capacity` - Initial size of the per-request arena region
    /// * `max_body_size` - Largest body [`Request::read_body`] will allocate
    pub fn new(header_limit: usize, arena_capacity: usize, max_body_size: usize) -> Self {
        Self {
            buf: Vec::with_capacity(header_limit),
            limit: header_limit,
            arena: RequestArena::new(arena_capacity, DEFAULT_ARENA_LIMIT),
            unread_body: 0,
            max_body_size,
        }
    }

    /// Cap the arena memory one request may use. Bodies that pass the
    /// `max_body_size` check but exceed this fail with [`Error::OutOfMemory`].
    pub fn with_arena_limit(mut self, limit: usize) -> Self {
        self.arena.set_limit(limit);
        self
    }

    /// Body bytes of the last request that nobody read.
    pub fn unread_body(&self) -> u64 {
        self.unread_body
    }

    pub(crate) fn take_unread_body(&mut self) -> u64 {
        std::mem::take(&mut self.unread_body)
    }

    /// Bytes currently handed out by the arena.
    pub fn arena_used(&self) -> usize {
        self.arena.used()
    }

    /// Release the previous request's memory.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.arena.reset();
    }
}

/// A single `Key: Value` header, borrowed from the raw header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Iterates the headers in a raw header block.
#[derive(Debug, Clone)]
pub struct HeaderIter<'a> {
    rest: &'a [u8],
}

impl<'a> HeaderIter<'a> {
    /// Iterate a block of `Key: Value\r\n` lines.
    pub fn new(raw: &'a [u8]) -> Self {
        Self { rest: raw }
    }
}

impl<'a> Iterator for HeaderIter<'a> {
    type Item = Header<'a>;

    fn next(&mut self) -> Option<Header<'a>> {
        loop {
            let rest = self.rest;
            if rest.is_empty() {
                return None;
            }

            let (line, tail) = match rest.windows(2).position(|w| w == b"\r\n") {
                Some(i) => (&rest[..i], &rest[i + 2..]),
                None => (rest, &rest[rest.len()..]),
            };
            self.rest = tail;

            let Ok(content) = std::str::from_utf8(line) else {
                continue;
            };
            if let Ok((key, value)) = split_header(content) {
                return Some(Header { key, value });
            }
        }
    }
}

/// A parsed HTTP request.
///
/// Borrows the connection's scratch buffer and read half, so it cannot outlive
/// the request cycle it was parsed for.
pub struct Request<'a> {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The protocol label from the status line
    pub protocol: Protocol,
    /// The request target
    pub url: Url,
    /// Declared body length, 0 when absent
    pub content_length: u64,
    /// Whether the connection must close after this request
    pub should_close: bool,
    /// The first `Host` header value
    pub host: Option<&'a str>,
    raw_header_data: &'a [u8],
    body: BodyReader<'a>,
}

impl<'a> Request<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        method: Method,
        protocol: Protocol,
        url: Url,
        raw_header_data: &'a [u8],
        content_length: u64,
        should_close: bool,
        host: Option<&'a str>,
        body: BodyReader<'a>,
    ) -> Self {
        Self {
            method,
            protocol,
            url,
            content_length,
            should_close,
            host,
            raw_header_data,
            body,
        }
    }

    /// The request path, without the query.
    pub fn path(&self) -> &str {
        &self.url.path
    }

    /// The header lines between the status line and the blank line.
    pub fn raw_header_data(&self) -> &'a [u8] {
        self.raw_header_data
    }

    /// Iterate the headers in the order they were sent.
    pub fn headers(&self) -> HeaderIter<'a> {
        HeaderIter::new(self.raw_header_data)
    }

    /// Get the first value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers()
            .find(|h| h.key.eq_ignore_ascii_case(name))
            .map(|h| h.value)
    }

    /// Check if a header exists (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Copy every header into an owned map. The first occurrence of a key wins.
    pub fn header_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for header in self.headers() {
            map.entry(header.key.to_string())
                .or_insert_with(|| header.value.to_string());
        }
        map
    }

    /// Check if the request declares a JSON body.
    pub fn is_json(&self) -> bool {
        self.header("Content-Type")
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }

    /// Read the whole body into request-scoped memory.
    pub async fn read_body(&mut self) -> Result<Body<'a>, Error> {
        self.body.read_all().await
    }

    /// Read part of the body into `buf`; returns how many bytes arrived.
    pub async fn read_body_into(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.body.read_into(buf).await
    }

    /// Read the body and parse it as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let body = self.read_body().await?;
        let value = serde_json::from_slice(&body)?;
        Ok(value)
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("protocol", &self.protocol)
            .field("url", &self.url)
            .field("content_length", &self.content_length)
            .field("should_close", &self.should_close)
            .field("host", &self.host)
            .field("body", &self.body)
            .finish()
    }
}

/// Read one request head from `reader`.
///
/// Consumes bytes up to and including the blank line that ends the headers
/// and nothing more; the body, if any, stays in `reader` for the returned
/// request to read.
pub async fn read_request<'a>(
    reader: &'a mut ConnReader,
    scratch: &'a mut RequestScratch,
) -> Result<Request<'a>, Error> {
    let RequestScratch {
        buf,
        limit,
        arena,
        unread_body,
        max_body_size,
    } = scratch;

    buf.clear();
    *unread_body = 0;

    let mut parser = Parser::new();
    let parsed = loop {
        let line = read_line(reader, buf, *limit).await?;
        if let Progress::Complete(parsed) = parser.feed(buf, line)? {
            break parsed;
        }
    };

    *unread_body = parsed.content_length;
    let data: &'a Vec<u8> = buf;
    let body = BodyReader::new(reader, arena, unread_body, *max_body_size);
    parsed.into_request(data.as_slice(), body)
}

/// Append one `\n`-terminated line to `buf`, returning its range.
async fn read_line(reader: &mut ConnReader, buf: &mut Vec<u8>, limit: usize) -> Result<Range<usize>, Error> {
    let start = buf.len();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Err(Error::EndOfStream);
        }

        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        if buf.len() + used > limit {
            return Err(Error::HeadersTooLarge);
        }

        buf.extend_from_slice(&available[..used]);
        reader.consume(used);

        if done {
            return Ok(start..buf.len());
        }
    }
}
