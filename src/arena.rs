//! Per-request memory.
//!
//! Each connection owns one [`RequestArena`]. Buffers handed out during a
//! request are carved from a single `BytesMut` region and the region is reset
//! once the request's response is flushed. Small buffers skip the region
//! entirely and live inline.

use std::ops::{Deref, DerefMut};

use bytes::BytesMut;

use crate::parser::Error;

/// Allocations at or below this size are stored inline instead of in the region.
pub const INLINE_BODY_CAPACITY: usize = 256;

/// A region allocator scoped to one request.
#[derive(Debug)]
pub struct RequestArena {
    region: BytesMut,
    initial_capacity: usize,
    limit: usize,
    used: usize,
}

impl RequestArena {
    /// Create an arena with `initial_capacity` bytes reserved that refuses to
    /// hand out more than `limit` bytes per request.
    pub fn new(initial_capacity: usize, limit: usize) -> Self {
        Self {
            region: BytesMut::with_capacity(initial_capacity),
            initial_capacity,
            limit,
            used: 0,
        }
    }

    /// Allocate a zeroed buffer of exactly `len` bytes.
    pub fn alloc(&mut self, len: usize) -> Result<ArenaBuf, Error> {
        if len <= INLINE_BODY_CAPACITY {
            return Ok(ArenaBuf::Inline {
                bytes: [0; INLINE_BODY_CAPACITY],
                len,
            });
        }

        let total = self.used.checked_add(len).ok_or(Error::OutOfMemory)?;
        if total > self.limit {
            return Err(Error::OutOfMemory);
        }

        self.region.resize(len, 0);
        self.used = total;
        Ok(ArenaBuf::Region(self.region.split_to(len)))
    }

    /// Change the per-request ceiling.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Bytes handed out from the region since the last reset.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Release everything allocated for the current request.
    ///
    /// The region's allocation is reclaimed in place once every buffer split
    /// from it has been dropped.
    pub fn reset(&mut self) {
        self.used = 0;
        self.region.clear();
        self.region.reserve(self.initial_capacity);
    }
}

/// A buffer obtained from a [`RequestArena`].
#[derive(Debug)]
pub enum ArenaBuf {
    Inline {
        bytes: [u8; INLINE_BODY_CAPACITY],
        len: usize,
    },
    Region(BytesMut),
}

impl ArenaBuf {
    /// An empty buffer that touches no memory.
    pub fn empty() -> Self {
        ArenaBuf::Inline {
            bytes: [0; INLINE_BODY_CAPACITY],
            len: 0,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ArenaBuf::Inline { .. })
    }
}

impl Deref for ArenaBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ArenaBuf::Inline { bytes, len } => &bytes[..*len],
            ArenaBuf::Region(buf) => buf,
        }
    }
}

impl DerefMut for ArenaBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            ArenaBuf::Inline { bytes, len } => &mut bytes[..*len],
            ArenaBuf::Region(buf) => buf,
        }
    }
}
