//! HTTP response types and utilities.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::server::error::Error;

/// The write side of a connection, as seen by a [`Response`].
pub type ConnWriter = dyn AsyncWrite + Unpin + Send;

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    PayloadTooLarge = 413,
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// The numeric code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// A buffered response bound to one connection's writer.
///
/// Nothing reaches the socket until [`Response::flush`] runs, either called by
/// the handler or by the connection once the handler returns.
pub struct Response<'w> {
    status: StatusCode,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    body: Vec<u8>,
    /// Set once the response has been written out; the connection skips its
    /// own flush when this is true.
    pub is_flushed: bool,
    writer: &'w mut ConnWriter,
}

impl<'w> Response<'w> {
    /// Create an empty `200 OK` response writing to `writer`.
    pub fn new(writer: &'w mut ConnWriter) -> Self {
        Self {
            status: StatusCode::Ok,
            headers: default_headers(),
            body: Vec::new(),
            is_flushed: false,
            writer,
        }
    }

    /// Set the status code.
    pub fn write_header(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Add or replace a header. Names match case-insensitively, so setting
    /// `connection` replaces an earlier `Connection`.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// The value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.set_header("Content-Type", content_type);
    }

    /// The buffered body. `Vec<u8>` implements `std::io::Write`.
    pub fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Append bytes to the body.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }

    /// Replace the body with a JSON value.
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.body = serde_json::to_vec(value)?;
        self.set_content_type("application/json");
        Ok(())
    }

    pub fn is_flushed(&self) -> bool {
        self.is_flushed
    }

    /// Mark the response as already sent (or deliberately suppressed).
    pub fn set_flushed(&mut self, flushed: bool) {
        self.is_flushed = flushed;
    }

    /// Discard everything the handler set and start over with `status`.
    ///
    /// A `Connection: close` header survives the reset.
    pub fn reset(&mut self, status: StatusCode) {
        let close = self.header("Connection").map(str::to_string);
        self.status = status;
        self.headers = default_headers();
        if let Some(close) = close {
            self.headers.insert("Connection".to_string(), close);
        }
        self.body.clear();
    }

    /// Convert the response to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(128 + self.body.len());

        // Add the status line
        let status_line = format!("HTTP/1.1 {}\r\n", self.status);
        bytes.extend_from_slice(status_line.as_bytes());

        // Add the headers; a name written directly into `headers` twice with
        // different case is only sent once
        let mut written: Vec<&str> = Vec::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("Content-Length")
                || written.iter().any(|seen| seen.eq_ignore_ascii_case(name))
            {
                continue;
            }
            written.push(name);
            let header_line = format!("{name}: {value}\r\n");
            bytes.extend_from_slice(header_line.as_bytes());
        }
        let content_length = format!("Content-Length: {}\r\n", self.body.len());
        bytes.extend_from_slice(content_length.as_bytes());

        // Add the empty line that separates headers from body
        bytes.extend_from_slice(b"\r\n");

        // Add the body
        bytes.extend_from_slice(&self.body);

        bytes
    }

    /// Write status line, headers and body to the connection.
    pub async fn flush(&mut self) -> Result<(), Error> {
        let bytes = self.to_bytes();
        self.writer.write_all(&bytes).await?;
        self.writer.flush().await?;
        self.is_flushed = true;
        Ok(())
    }
}

impl fmt::Debug for Response<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("is_flushed", &self.is_flushed)
            .finish()
    }
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Server".to_string(), "minihttp-rs".to_string());
    headers
}
