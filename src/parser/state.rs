//! The status-line / header state machine.
//!
//! [`Parser`] is fed one CRLF-terminated line at a time, by its byte range in
//! the shared scratch buffer. It never looks back at earlier lines; everything
//! it needs later (header block bounds, the `Host` value) is kept as offsets.

use std::ops::Range;

use crate::parser::body::BodyReader;
use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::request::Request;
use crate::parser::url::Url;
use crate::parser::version::Protocol;

/// What the status line told us.
#[derive(Debug)]
struct Head {
    method: Method,
    url: Url,
    protocol: Protocol,
}

#[derive(Debug)]
enum Phase {
    StatusLine,
    Headers(Head),
    Done,
}

/// Outcome of feeding one line.
#[derive(Debug)]
pub enum Progress {
    /// More lines are needed.
    Partial,
    /// The blank line was seen; the request head is complete.
    Complete(Parsed),
}

/// A fully parsed request head, expressed as offsets into the scratch buffer.
#[derive(Debug)]
pub struct Parsed {
    pub method: Method,
    pub url: Url,
    pub protocol: Protocol,
    /// From just after the status line to just before the blank line.
    pub header_block: Range<usize>,
    pub content_length: u64,
    pub should_close: bool,
    pub host: Option<Range<usize>>,
}

impl Parsed {
    /// Attach the buffer the offsets point into, yielding a [`Request`].
    pub(crate) fn into_request<'a>(self, buf: &'a [u8], body: BodyReader<'a>) -> Result<Request<'a>, Error> {
        let host = match self.host {
            Some(range) => Some(std::str::from_utf8(&buf[range]).map_err(|_| Error::InvalidCharacter)?),
            None => None,
        };

        Ok(Request::from_parts(
            self.method,
            self.protocol,
            self.url,
            &buf[self.header_block],
            self.content_length,
            self.should_close,
            host,
            body,
        ))
    }
}

/// Incremental HTTP/1.x request head parser.
#[derive(Debug)]
pub struct Parser {
    phase: Phase,
    header_start: usize,
    content_length: Option<u64>,
    connection_close: bool,
    host: Option<Range<usize>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            phase: Phase::StatusLine,
            header_start: 0,
            content_length: None,
            connection_close: false,
            host: None,
        }
    }

    #[cfg(test)]
    fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Feed the line occupying `buf[line]`, including its `\r\n`.
    ///
    /// Once [`Progress::Complete`] has been returned the event stream is over
    /// and further lines yield [`Error::EndOfStream`]. Any error also ends it.
    pub fn feed(&mut self, buf: &[u8], line: Range<usize>) -> Result<Progress, Error> {
        let content = line_content(&buf[line.clone()])?;

        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::StatusLine => {
                let head = parse_status_line(content)?;
                self.header_start = line.end;
                self.phase = Phase::Headers(head);
                Ok(Progress::Partial)
            }
            Phase::Headers(head) => {
                if content.is_empty() {
                    return Ok(Progress::Complete(self.complete(head, line.start)));
                }
                self.header_line(content, line.start)?;
                self.phase = Phase::Headers(head);
                Ok(Progress::Partial)
            }
            Phase::Done => Err(Error::EndOfStream),
        }
    }

    fn header_line(&mut self, content: &str, line_start: usize) -> Result<(), Error> {
        let (key, value) = split_header(content)?;

        if key.eq_ignore_ascii_case("content-length") {
            if self.content_length.is_none() {
                self.content_length = Some(parse_content_length(value)?);
            }
        } else if key.eq_ignore_ascii_case("connection") {
            if value.eq_ignore_ascii_case("close") {
                self.connection_close = true;
            }
        } else if key.eq_ignore_ascii_case("host") && self.host.is_none() {
            // value is a suffix of content, and content starts the line
            let start = line_start + (content.len() - value.len());
            self.host = Some(start..start + value.len());
        }

        Ok(())
    }

    fn complete(&mut self, head: Head, header_end: usize) -> Parsed {
        Parsed {
            should_close: head.protocol == Protocol::Http10 || self.connection_close,
            method: head.method,
            url: head.url,
            protocol: head.protocol,
            header_block: self.header_start..header_end,
            content_length: self.content_length.unwrap_or(0),
            host: self.host.take(),
        }
    }
}

/// Strip the mandatory `\r\n` and check the rest is text.
fn line_content(line: &[u8]) -> Result<&str, Error> {
    let content = line
        .strip_suffix(b"\n")
        .and_then(|l| l.strip_suffix(b"\r"))
        .ok_or(Error::InvalidLineEnding)?;

    std::str::from_utf8(content).map_err(|_| Error::InvalidCharacter)
}

fn parse_status_line(content: &str) -> Result<Head, Error> {
    let mut tokens = content.split(' ').filter(|t| !t.is_empty());

    let method = tokens.next().ok_or(Error::InvalidMethod)?;
    let path = tokens.next().ok_or(Error::InvalidUrl)?;
    let protocol = tokens.next().ok_or(Error::InvalidProtocol)?;

    Ok(Head {
        method: Method::classify(method),
        url: Url::parse(path),
        protocol: Protocol::from_label(protocol),
    })
}

/// Split `Key: Value` into its parts.
///
/// The first space separates the key token, which must end in `:`, from the
/// value, which is everything after that space.
pub(crate) fn split_header(content: &str) -> Result<(&str, &str), Error> {
    let (key_token, value) = content.split_once(' ').ok_or(Error::IncorrectHeader)?;

    if key_token.is_empty() {
        return Err(Error::MissingHeaders);
    }
    let key = key_token.strip_suffix(':').ok_or(Error::IncorrectHeader)?;
    if key.is_empty() {
        return Err(Error::MissingHeaders);
    }
    if value.is_empty() {
        return Err(Error::IncorrectHeader);
    }

    Ok((key, value))
}

fn parse_content_length(value: &str) -> Result<u64, Error> {
    value.bytes().try_fold(0u64, |acc, b| {
        if !b.is_ascii_digit() {
            return Err(Error::InvalidCharacter);
        }
        acc.checked_mul(10)
            .and_then(|n| n.checked_add(u64::from(b - b'0')))
            .ok_or(Error::Overflow)
    })
}
