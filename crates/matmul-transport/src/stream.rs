use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::error::{Result, TransportError};

/// Exact-length I/O over any blocking byte stream.
///
/// Callers either get the whole payload or an error, never a partial
/// result. Short reads and short writes are accumulated internally; an error
/// indication from the stream ends the operation immediately.
#[derive(Debug)]
pub struct Transport<T> {
    inner: T,
}

impl<T> Transport<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Write> Transport<T> {
    /// Write every byte of `buf` (blocking), then flush.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0usize;
        while written < buf.len() {
            match self.inner.write(&buf[written..]) {
                Ok(0) => {
                    return Err(TransportError::WriteZero {
                        expected: buf.len(),
                        written,
                    })
                }
                Ok(n) => written += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T: Read> Transport<T> {
    /// Read exactly `len` bytes (blocking).
    pub fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(len);
        self.read_exact_into(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Fill `buf` completely (blocking).
    ///
    /// Only a positive byte count short of the target is retried. End of
    /// stream and every error other than `Interrupted` are returned as is.
    pub fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut received = 0usize;
        while received < buf.len() {
            match self.inner.read(&mut buf[received..]) {
                Ok(0) => {
                    return Err(TransportError::UnexpectedEof {
                        expected: buf.len(),
                        received,
                    })
                }
                Ok(n) => {
                    received += n;
                    trace!(chunk = n, received, expected = buf.len(), "short read");
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }
}
