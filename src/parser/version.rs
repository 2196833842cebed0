//! HTTP protocol versions.

use std::fmt;

/// HTTP protocol versions recognised on the status line.
///
/// `Http20` is a label only; no HTTP/2 framing is spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http09,
    Http10,
    Http11,
    Http20,
}

impl Protocol {
    /// Match a protocol label. Unknown labels are treated as HTTP/1.1.
    pub fn from_label(label: &str) -> Protocol {
        match label {
            "HTTP/0.9" => Protocol::Http09,
            "HTTP/1.0" => Protocol::Http10,
            "HTTP/1.1" => Protocol::Http11,
            "HTTP/2.0" => Protocol::Http20,
            _ => Protocol::Http11,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http09 => write!(f, "HTTP/0.9"),
            Protocol::Http10 => write!(f, "HTTP/1.0"),
            Protocol::Http11 => write!(f, "HTTP/1.1"),
            Protocol::Http20 => write!(f, "HTTP/2.0"),
        }
    }
}
