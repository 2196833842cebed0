//! Content-Length bounded body access.

use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::ops::Deref;

use tokio::io::AsyncReadExt;

use crate::arena::{ArenaBuf, RequestArena};
use crate::parser::error::Error;
use crate::parser::request::ConnReader;

/// Reads the body of one request from the connection stream.
///
/// Both accessors advance the same stream position. Mixing them, or calling
/// either once the body is consumed, only ever sees what is left of the
/// declared length.
pub struct BodyReader<'a> {
    stream: &'a mut ConnReader,
    arena: &'a mut RequestArena,
    remaining: &'a mut u64,
    max_body_size: usize,
}

impl<'a> BodyReader<'a> {
    pub(crate) fn new(
        stream: &'a mut ConnReader,
        arena: &'a mut RequestArena,
        remaining: &'a mut u64,
        max_body_size: usize,
    ) -> Self {
        Self {
            stream,
            arena,
            remaining,
            max_body_size,
        }
    }

    /// Body bytes not yet read.
    pub fn remaining(&self) -> u64 {
        *self.remaining
    }

    /// Allocate a buffer for the whole body and fill it.
    pub async fn read_all(&mut self) -> Result<Body<'a>, Error> {
        if *self.remaining == 0 {
            return Ok(Body::new(ArenaBuf::empty()));
        }

        let len = usize::try_from(*self.remaining).map_err(|_| Error::Overflow)?;
        if len > self.max_body_size {
            return Err(Error::StreamTooLong);
        }

        let mut buf = self.arena.alloc(len)?;
        let mut filled = 0;
        while filled < len {
            let n = self.stream.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(Error::EndOfStream);
            }
            filled += n;
            *self.remaining -= n as u64;
        }

        Ok(Body::new(buf))
    }

    /// Read at most `min(remaining, buf.len())` bytes with a single read call.
    pub async fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Err(Error::InvalidBody);
        }

        let want = usize::try_from(*self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
        if want == 0 {
            return Ok(0);
        }

        let n = self.stream.read(&mut buf[..want]).await?;
        *self.remaining -= n as u64;
        Ok(n)
    }
}

impl fmt::Debug for BodyReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyReader")
            .field("remaining", &*self.remaining)
            .field("max_body_size", &self.max_body_size)
            .finish()
    }
}

/// A request body held in request-scoped memory.
///
/// Borrow-tied to its request; copy it out with `to_vec` to keep it longer.
pub struct Body<'a> {
    buf: ArenaBuf,
    _request: PhantomData<&'a ()>,
}

impl Body<'_> {
    fn new(buf: ArenaBuf) -> Self {
        Self {
            buf,
            _request: PhantomData,
        }
    }

    /// The body as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, Error> {
        std::str::from_utf8(&self.buf).map_err(|_| Error::InvalidCharacter)
    }
}

impl Deref for Body<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").field("len", &self.buf.len()).finish()
    }
}

/// Skip `len` body bytes the handler left unread.
///
/// Returns `false` if the peer closed before all of them arrived.
pub(crate) async fn discard(stream: &mut ConnReader, len: u64) -> io::Result<bool> {
    let skipped = tokio::io::copy(&mut (&mut *stream).take(len), &mut tokio::io::sink()).await?;
    Ok(skipped == len)
}
