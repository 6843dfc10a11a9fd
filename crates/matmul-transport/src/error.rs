use std::path::PathBuf;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device could not be opened.
    #[error("failed to open device {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to bind to the specified address.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the stream. Never retried.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before the expected number of bytes arrived.
    #[error("stream closed after {received} of {expected} bytes")]
    UnexpectedEof { expected: usize, received: usize },

    /// The stream accepted zero bytes before the buffer was fully written.
    #[error("stream stopped accepting data after {written} of {expected} bytes")]
    WriteZero { expected: usize, written: usize },

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

impl TransportError {
    /// True when the peer closed the stream before sending anything.
    ///
    /// Servers use this to tell a clean disconnect at a message boundary
    /// from a connection dropped mid-message.
    pub fn is_clean_eof(&self) -> bool {
        matches!(self, TransportError::UnexpectedEof { received: 0, .. })
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
