use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::matrix::Matrix;

/// Exclusive upper bound of generated elements: values fall in 0..=9.
pub const DEFAULT_ELEMENT_BOUND: u32 = 10;

/// Source of matrix element values.
pub trait ValueSource: Send {
    /// Next value, strictly below `bound` (`bound` is at least 1).
    fn next_value(&mut self, bound: u32) -> u32;
}

/// Uniform values from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomValues<R> {
    rng: R,
}

impl<R: Rng + Send> RandomValues<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomValues<StdRng> {
    /// Deterministic values for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Values seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> ValueSource for RandomValues<R> {
    fn next_value(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Values are reduced modulo the bound so generated matrices stay in range.
#[derive(Debug, Clone)]
pub struct FixedValues {
    values: Vec<u32>,
    pos: usize,
}

impl FixedValues {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            pos: 0,
        }
    }
}

impl ValueSource for FixedValues {
    fn next_value(&mut self, bound: u32) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value % bound
    }
}

/// Generate `count` matrices of `dimension` with elements in `0..DEFAULT_ELEMENT_BOUND`.
pub fn generate_batch<S: ValueSource + ?Sized>(
    count: usize,
    dimension: usize,
    source: &mut S,
) -> crate::Result<Vec<Matrix>> {
    generate_batch_bounded(count, dimension, DEFAULT_ELEMENT_BOUND, source)
}

/// Generate `count` matrices of `dimension` with elements in `0..bound`.
///
/// Matrices are filled one after another in row-major order, so a
/// [`FixedValues`] source lays its values out predictably.
pub fn generate_batch_bounded<S: ValueSource + ?Sized>(
    count: usize,
    dimension: usize,
    bound: u32,
    source: &mut S,
) -> crate::Result<Vec<Matrix>> {
    let bound = bound.max(1);
    (0..count)
        .map(|_| {
            let elements = (0..dimension * dimension)
                .map(|_| source.next_value(bound))
                .collect();
            Matrix::new(dimension, elements)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_elements_stay_in_range() {
        let mut source = RandomValues::seeded(42);
        let batch = generate_batch(8, 6, &mut source).unwrap();

        assert_eq!(batch.len(), 8);
        for matrix in &batch {
            assert_eq!(matrix.dimension(), 6);
            assert!(matrix.elements().iter().all(|&v| v < DEFAULT_ELEMENT_BOUND));
        }
    }

    #[test]
    fn custom_bound_is_honored() {
        let mut source = RandomValues::seeded(1);
        let batch = generate_batch_bounded(4, 5, 3, &mut source).unwrap();
        assert!(batch
            .iter()
            .flat_map(|m| m.elements().iter())
            .all(|&v| v < 3));
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let first = generate_batch(2, 6, &mut RandomValues::seeded(7)).unwrap();
        let second = generate_batch(2, 6, &mut RandomValues::seeded(7)).unwrap();
        let other = generate_batch(2, 6, &mut RandomValues::seeded(8)).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn fixed_values_fill_row_major_in_order() {
        let mut source = FixedValues::new(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let batch = generate_batch(2, 2, &mut source).unwrap();
        assert_eq!(batch[0], Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap());
        assert_eq!(batch[1], Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap());
    }

    #[test]
    fn fixed_values_wrap_and_reduce() {
        let mut source = FixedValues::new(vec![12, 3]);
        assert_eq!(source.next_value(10), 2);
        assert_eq!(source.next_value(10), 3);
        assert_eq!(source.next_value(10), 2);
        assert_eq!(FixedValues::new(Vec::<u32>::new()).next_value(10), 0);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut source = RandomValues::seeded(0);
        assert!(generate_batch(1, 0, &mut source).is_err());
        assert!(generate_batch(0, 0, &mut source).unwrap().is_empty());
    }
}
