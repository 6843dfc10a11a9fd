//! Fixed-layout binary records for square matrices.
//!
//! Every matrix travels as one record:
//! - A 4-byte little-endian size header (the dimension N)
//! - N×N 4-byte little-endian elements in row-major order
//!
//! A round's request is two records back to back, its response one record.
//! The dimension is fixed per session, so every length on the wire is
//! known up front and no length prefix is needed.

pub mod codec;
pub mod error;
pub mod generate;
pub mod matrix;

pub use codec::{
    batch_size, decode_batch, decode_matrix, encode_batch, encode_matrix, record_size,
    DEFAULT_DIMENSION, ELEMENT_SIZE, HEADER_SIZE, MAX_DIMENSION, OPERANDS_PER_ROUND,
};
pub use error::{FormatError, Result};
pub use generate::{
    generate_batch, generate_batch_bounded, FixedValues, RandomValues, ValueSource,
    DEFAULT_ELEMENT_BOUND,
};
pub use matrix::Matrix;
