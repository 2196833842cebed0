//! HTTP request methods.

use std::fmt;

/// HTTP request methods as defined in RFC 7231 and common extensions.
///
/// Anything unrecognised becomes [`Method::UNKNOWN`]; an odd method is the
/// handler's problem, not a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method: Requests a representation of the specified resource.
    GET,
    /// HEAD method: Same as GET but only transfers the status line and header section.
    HEAD,
    /// POST method: Submits data to be processed to the identified resource.
    POST,
    /// PUT method: Replaces all current representations of the target resource with the request payload.
    PUT,
    /// DELETE method: Deletes the specified resource.
    DELETE,
    /// CONNECT method: Establishes a tunnel to the server identified by the target resource.
    CONNECT,
    /// OPTIONS method: Describes the communication options for the target resource.
    OPTIONS,
    /// TRACE method: Performs a message loop-back test along the path to the target resource.
    TRACE,
    /// PATCH method: Applies partial modifications to a resource.
    PATCH,
    /// Any method token not listed above.
    UNKNOWN,
}

impl Method {
    /// Classify a method token by its shortest distinguishing prefix: one
    /// byte, two for the `P*` family. The rest of the token is not examined,
    /// so `GETX` is `GET`.
    pub fn classify(token: &str) -> Method {
        match token.as_bytes() {
            [b'G', ..] => Method::GET,
            [b'H', ..] => Method::HEAD,
            [b'P', b'O', ..] => Method::POST,
            [b'P', b'U', ..] => Method::PUT,
            [b'P', b'A', ..] => Method::PATCH,
            [b'D', ..] => Method::DELETE,
            [b'C', ..] => Method::CONNECT,
            [b'O', ..] => Method::OPTIONS,
            [b'T', ..] => Method::TRACE,
            _ => Method::UNKNOWN,
        }
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        Method::classify(token)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
