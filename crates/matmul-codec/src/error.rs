/// Errors that can occur while building, encoding or decoding matrices.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    /// The buffer is not exactly the fixed length for the expected layout.
    #[error("expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The record's size header disagrees with the session dimension.
    #[error("size header says {found}, expected {expected}")]
    HeaderMismatch { expected: usize, found: u32 },

    /// A matrix does not have the dimension the operation requires.
    #[error("matrix dimension {found} does not match {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    /// The dimension is zero, too large, or disagrees with the element count.
    #[error("invalid dimension {dimension} for {elements} elements (max {max})")]
    InvalidDimension {
        dimension: usize,
        elements: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, FormatError>;
