/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Writing operands or reading a result failed.
    #[error("transport error: {0}")]
    Transport(#[from] matmul_transport::TransportError),

    /// A payload did not match the fixed record layout.
    #[error("format error: {0}")]
    Format(#[from] matmul_codec::FormatError),

    /// The session configuration is unusable.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    /// A task thread could not be started.
    #[error("failed to spawn {task} task: {source}")]
    Spawn {
        task: &'static str,
        source: std::io::Error,
    },

    /// A task panicked before finishing.
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}

pub type Result<T> = std::result::Result<T, SessionError>;
