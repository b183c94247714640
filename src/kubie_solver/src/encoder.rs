//! Perfect hashing of partial arrangements.
//!
//! An arrangement is `k` distinct values out of `0..n` (the positions of the
//! tracked pieces, in tracking order) together with one base-`b` orientation
//! digit per value. The encoder maps every such arrangement onto a unique
//! index in `0..cardinality()` with no gaps.

use crate::FACT_UNTIL_19;
use thiserror::Error;

/// The largest `n` whose place values fit [`FACT_UNTIL_19`].
pub const MAX_PIECE_COUNT: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialPermutationEncoder {
    piece_count: u8,
    tracked_count: u8,
    orientation_count: u8,
    // the last digit is implied by the others when every piece is tracked
    orientation_digits: u8,
    places: Box<[u64]>,
    orientation_states: u64,
    cardinality: u64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncoderError {
    #[error("Cannot track {tracked_count} out of {piece_count} pieces")]
    TooManyTracked { piece_count: u8, tracked_count: u8 },
    #[error("At most {MAX_PIECE_COUNT} pieces are supported but got {0}")]
    TooManyPieces(u8),
    #[error("Orientation count must be at least one")]
    ZeroOrientationCount,
    #[error("The number of encoded states does not fit in a u64")]
    CardinalityOverflow,
}

impl PartialPermutationEncoder {
    /// Create an encoder for `tracked_count` of `piece_count` values with
    /// `orientation_count` orientations each.
    ///
    /// # Errors
    ///
    /// If the parameters are out of range. See `EncoderError`.
    pub fn new(
        piece_count: u8,
        tracked_count: u8,
        orientation_count: u8,
    ) -> Result<Self, EncoderError> {
        if piece_count > MAX_PIECE_COUNT {
            return Err(EncoderError::TooManyPieces(piece_count));
        }
        if tracked_count > piece_count {
            return Err(EncoderError::TooManyTracked {
                piece_count,
                tracked_count,
            });
        }
        if orientation_count == 0 {
            return Err(EncoderError::ZeroOrientationCount);
        }

        let n = usize::from(piece_count);
        let k = usize::from(tracked_count);
        // place[i] = (n - 1 - i)! / (n - k)!
        let places: Box<[u64]> = (0..k)
            .map(|i| FACT_UNTIL_19[n - 1 - i] / FACT_UNTIL_19[n - k])
            .collect();
        let permutation_states = match places.first() {
            Some(&first_place) => first_place * n as u64,
            None => 1,
        };

        let orientation_digits = if tracked_count == piece_count {
            tracked_count.saturating_sub(1)
        } else {
            tracked_count
        };
        let orientation_states = u64::from(orientation_count)
            .checked_pow(u32::from(orientation_digits))
            .ok_or(EncoderError::CardinalityOverflow)?;
        let cardinality = permutation_states
            .checked_mul(orientation_states)
            .ok_or(EncoderError::CardinalityOverflow)?;

        Ok(Self {
            piece_count,
            tracked_count,
            orientation_count,
            orientation_digits,
            places,
            orientation_states,
            cardinality,
        })
    }

    /// The size of the codomain, `(n permute k) * b^k`, or `n! * b^(n - 1)`
    /// when every piece is tracked.
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }

    #[must_use]
    pub fn piece_count(&self) -> u8 {
        self.piece_count
    }

    #[must_use]
    pub fn tracked_count(&self) -> u8 {
        self.tracked_count
    }

    #[must_use]
    pub fn orientation_count(&self) -> u8 {
        self.orientation_count
    }

    /// Encode an arrangement. `positions` must hold `k` distinct values below
    /// `n` and `orientations` the matching `k` digits below `b`.
    #[must_use]
    pub fn encode(&self, positions: &[u8], orientations: &[u8]) -> u64 {
        debug_assert_eq!(positions.len(), usize::from(self.tracked_count));
        debug_assert_eq!(orientations.len(), usize::from(self.tracked_count));

        let mut seen = 0_u32;
        let mut rank = 0;
        for (&position, &place) in positions.iter().zip(&self.places) {
            // Subtract how many smaller values were already used, leaving the
            // position among the values still available
            let used_below = (seen & ((1 << position) - 1)).count_ones();
            seen |= 1 << position;
            rank += u64::from(u32::from(position) - used_below) * place;
        }

        let orientation = orientations[..usize::from(self.orientation_digits)]
            .iter()
            .fold(0, |acc, &digit| {
                acc * u64::from(self.orientation_count) + u64::from(digit)
            });

        rank * self.orientation_states + orientation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::iter::repeat_n;

    fn assert_bijective(n: u8, k: u8, b: u8) {
        let encoder = PartialPermutationEncoder::new(n, k, b).unwrap();
        let mut hit = vec![false; encoder.cardinality() as usize];
        let drop_last = k == n;
        for positions in (0..n).permutations(usize::from(k)) {
            let orientations = repeat_n(0..b, usize::from(k))
                .multi_cartesian_product()
                // the dropped digit is implied, so only enumerate one value
                .filter(|ori| !drop_last || ori.last().is_none_or(|&last| last == 0));
            for orientation in orientations {
                let index = encoder.encode(&positions, &orientation) as usize;
                assert!(!hit[index], "collision at {index} for {positions:?} {orientation:?}");
                hit[index] = true;
            }
        }
        assert!(hit.iter().all(|&x| x), "gap for n={n} k={k} b={b}");
    }

    #[test]
    fn test_bijective() {
        assert_bijective(6, 3, 3);
        assert_bijective(7, 2, 2);
        assert_bijective(5, 5, 3);
        assert_bijective(4, 4, 2);
        assert_bijective(8, 1, 3);
        assert_bijective(5, 4, 1);
    }

    #[test]
    fn test_cardinality() {
        // eight corners, last orientation implied
        assert_eq!(
            PartialPermutationEncoder::new(8, 8, 3).unwrap().cardinality(),
            88_179_840
        );
        // six of twelve edges
        assert_eq!(
            PartialPermutationEncoder::new(12, 6, 2).unwrap().cardinality(),
            42_577_920
        );
        assert_eq!(
            PartialPermutationEncoder::new(19, 4, 3).unwrap().cardinality(),
            93_024 * 81
        );
        assert_eq!(PartialPermutationEncoder::new(3, 0, 3).unwrap().cardinality(), 1);
    }

    #[test]
    fn test_identity_is_zero() {
        let encoder = PartialPermutationEncoder::new(12, 4, 2).unwrap();
        assert_eq!(encoder.encode(&[0, 1, 2, 3], &[0, 0, 0, 0]), 0);
        let encoder = PartialPermutationEncoder::new(8, 8, 3).unwrap();
        assert_eq!(
            encoder.encode(&[7, 6, 5, 4, 3, 2, 1, 0], &[2, 2, 2, 2, 2, 2, 2, 1]),
            encoder.cardinality() - 1
        );
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            PartialPermutationEncoder::new(4, 5, 3),
            Err(EncoderError::TooManyTracked {
                piece_count: 4,
                tracked_count: 5
            })
        );
        assert_eq!(
            PartialPermutationEncoder::new(21, 2, 3),
            Err(EncoderError::TooManyPieces(21))
        );
        assert_eq!(
            PartialPermutationEncoder::new(4, 2, 0),
            Err(EncoderError::ZeroOrientationCount)
        );
    }
}
