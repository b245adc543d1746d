//! Request framing.
//!
//! Accumulates bytes from a stream until a complete request has arrived: the
//! header terminator, plus `Content-Length` body bytes when that header is
//! present. Bodies that contain the terminator before the declared end are
//! not handled specially, so only small uploads frame reliably.

use std::io;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

use crate::http::parser::{find_headers_end, header_value};

/// Default size of each read, matching a small socket buffer.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Returns `true` once `buf` holds a complete request.
///
/// A malformed or not-yet-complete `Content-Length` value counts as
/// incomplete, never as an error.
pub fn is_complete(buf: &[u8]) -> bool {
    let Some(headers_end) = find_headers_end(buf) else {
        return false;
    };

    match header_value(&buf[..headers_end], "Content-Length") {
        None => true,
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(len) => buf.len() - (headers_end + 4) >= len,
            Err(_) => false,
        },
    }
}

/// Incremental request accumulator.
pub struct Framer {
    buffer: BytesMut,
    chunk_size: usize,
    read_timeout: Option<Duration>,
}

impl Framer {
    pub fn new(chunk_size: usize, read_timeout: Option<Duration>) -> Self {
        Self {
            buffer: BytesMut::with_capacity(chunk_size.max(1)),
            chunk_size: chunk_size.max(1),
            read_timeout,
        }
    }

    /// Appends a chunk and reports whether the request is now complete.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        self.buffer.extend_from_slice(chunk);
        is_complete(&self.buffer)
    }

    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Reads from `reader` until the request is complete or the stream ends.
    ///
    /// On end-of-stream whatever was accumulated (possibly nothing) is
    /// returned. Read failures and timeouts are returned as errors and the
    /// partial message is dropped.
    pub async fn read_message<R>(mut self, reader: &mut R) -> io::Result<Bytes>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let n = match self.read_timeout {
                Some(limit) => timeout(limit, reader.read(&mut chunk))
                    .await
                    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "read timed out"))??,
                None => reader.read(&mut chunk).await?,
            };

            if n == 0 {
                tracing::trace!(buffered = self.buffer.len(), "stream ended before framing completed");
                return Ok(self.buffer.freeze());
            }

            if self.push(&chunk[..n]) {
                return Ok(self.buffer.freeze());
            }
        }
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, None)
    }
}
