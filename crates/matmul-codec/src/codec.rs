use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FormatError, Result};
use crate::matrix::Matrix;

/// Size header: one little-endian `u32` holding the dimension.
pub const HEADER_SIZE: usize = 4;

/// Each element is one little-endian `u32`.
pub const ELEMENT_SIZE: usize = 4;

/// Operand matrices sent per round (A and B).
pub const OPERANDS_PER_ROUND: usize = 2;

/// Dimension used by the reference remote firmware.
pub const DEFAULT_DIMENSION: usize = 6;

/// Largest accepted dimension: keeps a record under 4 MiB.
pub const MAX_DIMENSION: usize = 1024;

/// Wire length of one matrix record.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────┐
/// │ Size (4B LE) │ Elements: N×N × u32 LE, row-major    │
/// └──────────────┴──────────────────────────────────────┘
/// ```
///
/// Saturates at `usize::MAX` for dimensions no buffer can hold.
pub fn record_size(dimension: usize) -> usize {
    dimension
        .checked_mul(dimension)
        .and_then(|count| count.checked_mul(ELEMENT_SIZE))
        .and_then(|body| body.checked_add(HEADER_SIZE))
        .unwrap_or(usize::MAX)
}

/// Wire length of `count` consecutive records. Saturates like [`record_size`].
pub fn batch_size(count: usize, dimension: usize) -> usize {
    count.saturating_mul(record_size(dimension))
}

/// Append one record to `dst`.
pub fn encode_matrix(matrix: &Matrix, dst: &mut BytesMut) {
    dst.reserve(record_size(matrix.dimension()));
    // MAX_DIMENSION keeps the header within u32.
    dst.put_u32_le(matrix.dimension() as u32);
    for &value in matrix.elements() {
        dst.put_u32_le(value);
    }
}

/// Encode a batch of matrices that all share `dimension`.
///
/// The result is exactly `batch_size(batch.len(), dimension)` bytes.
pub fn encode_batch(batch: &[Matrix], dimension: usize) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(batch_size(batch.len(), dimension));
    for matrix in batch {
        if matrix.dimension() != dimension {
            return Err(FormatError::DimensionMismatch {
                expected: dimension,
                found: matrix.dimension(),
            });
        }
        encode_matrix(matrix, &mut dst);
    }
    Ok(dst.freeze())
}

/// Decode exactly one record of `expected_dimension`.
///
/// The buffer must be exactly `record_size(expected_dimension)` bytes.
pub fn decode_matrix(src: &[u8], expected_dimension: usize) -> Result<Matrix> {
    check_wire_dimension(expected_dimension)?;
    let expected = record_size(expected_dimension);
    if src.len() != expected {
        return Err(FormatError::LengthMismatch {
            expected,
            actual: src.len(),
        });
    }
    decode_record(&mut &src[..], expected_dimension)
}

/// Decode exactly `count` consecutive records of `dimension`.
pub fn decode_batch(src: &[u8], count: usize, dimension: usize) -> Result<Vec<Matrix>> {
    check_wire_dimension(dimension)?;
    let expected = batch_size(count, dimension);
    if src.len() != expected {
        return Err(FormatError::LengthMismatch {
            expected,
            actual: src.len(),
        });
    }

    let mut cursor = src;
    (0..count)
        .map(|_| decode_record(&mut cursor, dimension))
        .collect()
}

fn check_wire_dimension(dimension: usize) -> Result<()> {
    if dimension == 0 || dimension > MAX_DIMENSION {
        return Err(FormatError::InvalidDimension {
            dimension,
            elements: dimension.saturating_mul(dimension),
            max: MAX_DIMENSION,
        });
    }
    Ok(())
}

// Caller guarantees `src` holds at least one full record.
fn decode_record(src: &mut &[u8], dimension: usize) -> Result<Matrix> {
    let found = src.get_u32_le();
    if found as usize != dimension {
        return Err(FormatError::HeaderMismatch {
            expected: dimension,
            found,
        });
    }

    let elements = (0..dimension * dimension).map(|_| src.get_u32_le()).collect();
    Matrix::new(dimension, elements)
}
