//! Conversion between puzzle states and face colorings.
//!
//! A coloring lists, slot by slot, the color seen on each facelet of that
//! slot, in the slot's own face order. Colors are face indices: a solved
//! puzzle shows each piece's home faces.

use crate::puzzle::{PuzzleDef, PuzzleState};
use fxhash::FxHashMap;
use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParityError {
    #[error("Expected colors for {expected} slots but got {actual}")]
    SlotCountMismatch { expected: usize, actual: usize },
    #[error("Slot {slot} has {expected} facelets but got {actual} colors")]
    FaceletCountMismatch {
        slot: usize,
        expected: usize,
        actual: usize,
    },
    #[error("The colors {colors:?} in slot {slot} do not belong to any piece")]
    UnknownPiece { slot: usize, colors: Vec<u8> },
    #[error("Piece {piece} appears in both slot {first_slot} and slot {second_slot}")]
    DuplicatePiece {
        piece: usize,
        first_slot: usize,
        second_slot: usize,
    },
    #[error("The fixed piece in slot {slot} is not in its home position")]
    FixedPieceDisplaced { slot: usize },
    #[error("The orientations of the {orbit} do not sum to a multiple of {orientation_count}")]
    OrientationParity {
        orbit: &'static str,
        orientation_count: u8,
    },
    #[error("The pieces are an odd permutation away from solved")]
    PermutationParity,
}

impl ParityError {
    /// Whether the coloring is made of real pieces but describes a state no
    /// sequence of moves can reach, as opposed to being mislabeled.
    #[must_use]
    pub fn is_parity(&self) -> bool {
        matches!(
            self,
            ParityError::OrientationParity { .. } | ParityError::PermutationParity
        )
    }
}

/// The lexicographically smallest rotation of a facelet cycle.
fn canonical_rotation(colors: &[u8]) -> Vec<u8> {
    (0..colors.len())
        .map(|r| colors[r..].iter().chain(&colors[..r]).copied().collect_vec())
        .min()
        .unwrap_or_default()
}

impl<const N: usize> PuzzleDef<N> {
    /// Reconstruct a state from the colors of every facelet.
    ///
    /// # Errors
    ///
    /// If the coloring is mislabeled or unreachable. See `ParityError`.
    pub fn try_from_coloring(&self, coloring: &[Vec<u8>]) -> Result<PuzzleState<N>, ParityError> {
        if coloring.len() != N {
            return Err(ParityError::SlotCountMismatch {
                expected: N,
                actual: coloring.len(),
            });
        }

        let pieces_by_colors: FxHashMap<Vec<u8>, usize> = (0..N)
            .map(|piece| (canonical_rotation(self.piece_faces(piece)), piece))
            .collect();

        let mut perm = [0; N];
        let mut ori = [0; N];
        let mut home_of_piece = [None; N];
        for (slot, colors) in coloring.iter().enumerate() {
            let expected = self.piece_faces(slot).len();
            if colors.len() != expected {
                return Err(ParityError::FaceletCountMismatch {
                    slot,
                    expected,
                    actual: colors.len(),
                });
            }
            let unknown = || ParityError::UnknownPiece {
                slot,
                colors: colors.clone(),
            };

            let piece = *pieces_by_colors
                .get(&canonical_rotation(colors))
                .filter(|&&piece| self.orbit_index_of_slot(piece) == self.orbit_index_of_slot(slot))
                .ok_or_else(unknown)?;
            let home_faces = self.piece_faces(piece);
            let orientation = (0..expected)
                .find(|&o| {
                    home_faces
                        .iter()
                        .enumerate()
                        .all(|(j, &face)| colors[(o + j) % expected] == face)
                })
                .ok_or_else(unknown)?;

            if let Some(first_slot) = home_of_piece[piece].replace(slot) {
                return Err(ParityError::DuplicatePiece {
                    piece,
                    first_slot,
                    second_slot: slot,
                });
            }
            perm[slot] = piece as u8;
            ori[slot] = orientation as u8;
        }

        for &slot in self.fixed_slots() {
            let slot = usize::from(slot);
            if usize::from(perm[slot]) != slot || ori[slot] != 0 {
                return Err(ParityError::FixedPieceDisplaced { slot });
            }
        }

        for orbit in self.orbits() {
            let sum: u32 = (orbit.start..orbit.start + orbit.len)
                .map(|slot| u32::from(ori[usize::from(slot)]))
                .sum();
            if sum % u32::from(orbit.orientation_count) != 0 {
                return Err(ParityError::OrientationParity {
                    orbit: orbit.name,
                    orientation_count: orbit.orientation_count,
                });
            }
        }

        // a permutation of N elements made of c cycles is N - c transpositions
        let mut visited = [false; N];
        let mut cycle_count = 0;
        for start in 0..N {
            if visited[start] {
                continue;
            }
            cycle_count += 1;
            let mut slot = start;
            while !visited[slot] {
                visited[slot] = true;
                slot = usize::from(perm[slot]);
            }
        }
        if (N - cycle_count) % 2 != 0 {
            return Err(ParityError::PermutationParity);
        }

        Ok(PuzzleState::from_parts(perm, ori))
    }

    /// The colors a state shows. `try_from_coloring` inverts this for every
    /// reachable state.
    #[must_use]
    pub fn to_coloring(&self, puzzle_state: &PuzzleState<N>) -> Vec<Vec<u8>> {
        (0..N)
            .map(|slot| {
                let home_faces = self.piece_faces(usize::from(puzzle_state.piece_at(slot)));
                let orientation = usize::from(puzzle_state.orientation_at(slot));
                let len = home_faces.len();
                (0..len)
                    .map(|i| home_faces[(i + len - orientation) % len])
                    .collect()
            })
            .collect()
    }
}
