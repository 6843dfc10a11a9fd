use crate::codec::MAX_DIMENSION;
use crate::error::{FormatError, Result};

/// A square matrix of unsigned integers, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    dimension: usize,
    elements: Vec<u32>,
}

impl Matrix {
    /// Build a matrix from row-major elements.
    ///
    /// `elements` must hold exactly `dimension * dimension` values and the
    /// dimension must be in `1..=MAX_DIMENSION`.
    pub fn new(dimension: usize, elements: Vec<u32>) -> Result<Self> {
        check_dimension(dimension, elements.len())?;
        Ok(Self {
            dimension,
            elements,
        })
    }

    /// Build a matrix from a list of equally long rows.
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self> {
        let dimension = rows.len();
        let mut elements = Vec::with_capacity(dimension * dimension);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dimension {
                return Err(FormatError::DimensionMismatch {
                    expected: dimension,
                    found: row.len(),
                });
            }
            elements.extend_from_slice(row);
        }
        Self::new(dimension, elements)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Row-major element slice.
    pub fn elements(&self) -> &[u32] {
        &self.elements
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.elements.chunks(self.dimension)
    }

    /// Matrix product `self × other`.
    ///
    /// Arithmetic wraps at `u32`, matching the remote's machine-word math.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.dimension != other.dimension {
            return Err(FormatError::DimensionMismatch {
                expected: self.dimension,
                found: other.dimension,
            });
        }

        let n = self.dimension;
        let mut product = vec![0u32; n * n];
        for i in 0..n {
            for k in 0..n {
                let a = self.elements[i * n + k];
                if a == 0 {
                    continue;
                }
                for j in 0..n {
                    let cell = &mut product[i * n + j];
                    *cell = cell.wrapping_add(a.wrapping_mul(other.elements[k * n + j]));
                }
            }
        }

        Ok(Matrix {
            dimension: n,
            elements: product,
        })
    }
}

fn check_dimension(dimension: usize, elements: usize) -> Result<()> {
    let invalid = FormatError::InvalidDimension {
        dimension,
        elements,
        max: MAX_DIMENSION,
    };
    if dimension == 0 || dimension > MAX_DIMENSION {
        return Err(invalid);
    }
    if dimension * dimension != elements {
        return Err(invalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_of_two_by_two() {
        let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let b = Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap();
        let expected = Matrix::from_rows(&[[19, 22], [43, 50]]).unwrap();
        assert_eq!(a.multiply(&b).unwrap(), expected);
    }

    #[test]
    fn identity_product_is_noop() {
        let identity = Matrix::from_rows(&[[1, 0, 0], [0, 1, 0], [0, 0, 1]]).unwrap();
        let m = Matrix::from_rows(&[[9, 8, 7], [6, 5, 4], [3, 2, 1]]).unwrap();
        assert_eq!(identity.multiply(&m).unwrap(), m);
        assert_eq!(m.multiply(&identity).unwrap(), m);
    }

    #[test]
    fn product_wraps_on_overflow() {
        let a = Matrix::from_rows(&[[u32::MAX]]).unwrap();
        let b = Matrix::from_rows(&[[2]]).unwrap();
        assert_eq!(a.multiply(&b).unwrap().elements(), &[u32::MAX - 1]);
    }

    #[test]
    fn product_rejects_mixed_dimensions() {
        let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let b = Matrix::new(3, vec![0; 9]).unwrap();
        assert_eq!(
            a.multiply(&b),
            Err(FormatError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn new_rejects_wrong_element_count() {
        let err = Matrix::new(2, vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, FormatError::InvalidDimension { .. }));
    }

    #[test]
    fn new_rejects_zero_and_oversized_dimension() {
        assert!(Matrix::new(0, Vec::new()).is_err());
        assert!(Matrix::new(MAX_DIMENSION + 1, Vec::new()).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows: Vec<Vec<u32>> = vec![vec![1, 2], vec![3]];
        assert!(matches!(
            Matrix::from_rows(&rows),
            Err(FormatError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn accessors() {
        let m = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        assert_eq!(m.dimension(), 2);
        let rows: Vec<&[u32]> = m.rows().collect();
        assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..]]);
    }
}
