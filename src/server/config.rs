//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::parser::{DEFAULT_ARENA_CAPACITY, DEFAULT_ARENA_LIMIT, DEFAULT_HEADER_LIMIT, DEFAULT_MAX_BODY_SIZE};

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// Fixed bound on the status line plus all headers of one request.
    pub read_buffer_size: usize,
    /// Largest body a handler may read in one allocation.
    pub max_body_size: usize,
    /// Initial size of each connection's per-request arena.
    pub arena_capacity: usize,
    /// Ceiling on arena memory handed out during one request.
    pub arena_limit: usize,
    /// How long to wait for the next request head. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// How long a response flush may take. `None` waits forever.
    pub write_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            read_buffer_size: DEFAULT_HEADER_LIMIT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            arena_limit: DEFAULT_ARENA_LIMIT,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl ServerConfig {
    /// Set the address to bind to.
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set the header scratch buffer size.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the maximum body size.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the initial arena size.
    pub fn with_arena_capacity(mut self, size: usize) -> Self {
        self.arena_capacity = size;
        self
    }

    /// Set the per-request arena ceiling.
    pub fn with_arena_limit(mut self, limit: usize) -> Self {
        self.arena_limit = limit;
        self
    }

    /// Set the read deadline for request heads.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the write deadline for response flushes.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }
}
