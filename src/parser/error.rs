//! Error types for the HTTP parser.

use std::io;

use thiserror::Error;

/// Errors that can occur while reading an HTTP request off a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The status line has no method token.
    #[error("Invalid HTTP method")]
    InvalidMethod,

    /// The status line has no request-target token.
    #[error("Invalid request URL")]
    InvalidUrl,

    /// The status line has no protocol token.
    #[error("Invalid HTTP protocol")]
    InvalidProtocol,

    /// A header line has no key.
    #[error("Missing header key")]
    MissingHeaders,

    /// A header line is not of the form `Key: Value`.
    #[error("Incorrect header line")]
    IncorrectHeader,

    /// A numeric header value does not fit in 64 bits.
    #[error("Numeric header value overflows")]
    Overflow,

    /// A numeric header value contains a non-digit, or a line is not valid UTF-8.
    #[error("Invalid character in request")]
    InvalidCharacter,

    /// The peer closed the stream before a complete request (or body) arrived.
    #[error("Unexpected end of stream")]
    EndOfStream,

    /// The declared body is larger than the configured maximum.
    #[error("Request body too long")]
    StreamTooLong,

    /// Status line and headers do not fit in the scratch buffer.
    #[error("Request headers too large")]
    HeadersTooLarge,

    /// A line is not terminated by `\r\n`.
    #[error("Invalid line ending, expected CRLF")]
    InvalidLineEnding,

    /// A body read was attempted with an unusable buffer.
    #[error("Invalid body read")]
    InvalidBody,

    /// The per-request arena ran out of room.
    #[error("Request arena exhausted")]
    OutOfMemory,

    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the peer went away rather than sent garbage.
    ///
    /// A disconnect while waiting for a new request is the normal end of a
    /// keep-alive connection, not a failure.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::EndOfStream => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
