use crate::{
    encoder::{EncoderError, PartialPermutationEncoder},
    puzzle::{PuzzleDef, PuzzleState},
    start, success, working,
};
use log::{debug, info};
use std::{fs, io, path::Path, time::Instant};
use thiserror::Error;

/// The table value of an index no search has reached yet.
pub const UNREACHED: u8 = u8::MAX;

/// Tables with more entries than this are built with iterative deepening.
pub const LEVEL_ORDER_MAX_ENTRIES: u64 = 8_000_000;

/// An ordered choice of pieces from one orbit whose positions and
/// orientations are tracked while everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subset<const N: usize> {
    orbit: usize,
    pieces: Box<[u8]>,
    movable_slots: Box<[u8]>,
    // u8::MAX for untracked pieces
    rank_of_piece: [u8; N],
    // u8::MAX for slots without a position, such as fixed slots
    position_of_slot: [u8; N],
    encoder: PartialPermutationEncoder,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubsetError {
    #[error("The puzzle has no orbit {0}")]
    OrbitOutOfRange(usize),
    #[error("Piece {piece} is not part of the {orbit}")]
    PieceNotInOrbit { piece: u8, orbit: &'static str },
    #[error("Piece {0} is fixed and cannot be tracked")]
    FixedPiece(u8),
    #[error("Piece {0} is tracked more than once")]
    DuplicatePiece(u8),
    #[error("Expected a subset of the {expected} but got the {actual}")]
    PuzzleMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    #[error(transparent)]
    Encoder(#[from] EncoderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Breadth first from solved. Fast, but holds a whole depth of full
    /// puzzle states in memory.
    LevelOrder,
    /// Depth first with a growing depth bound. Revisits shallow states on
    /// every pass but only ever holds one path in memory.
    IterativeDeepening,
}

/// A lower bound on the distance to solved for every arrangement of a subset,
/// one byte per arrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDatabase<const N: usize> {
    subset: Subset<N>,
    table: Box<[u8]>,
}

#[derive(Error, Debug)]
pub enum PatternDatabaseError {
    #[error("Expected a table of {expected} bytes but found {actual}")]
    LengthMismatch { expected: u64, actual: u64 },
    #[error("A table of {0} entries does not fit in memory")]
    TooLarge(u64),
    #[error(transparent)]
    Subset(#[from] SubsetError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The result of `PruningTables::estimate_within`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimate {
    /// Every table fits the budget, and this is the exact heuristic value.
    Within(u8),
    /// Some table alone exceeds the budget. This is that table's value, which
    /// may be less than the full heuristic value.
    Exceeds(u8),
}

/// An admissible heuristic for the distance of a state to solved.
pub trait PruningTables<const N: usize> {
    fn admissible_heuristic(&self, puzzle_state: &PuzzleState<N>) -> u8;

    /// Like `admissible_heuristic`, but stop as soon as the estimate is known
    /// to be greater than `budget`.
    fn estimate_within(&self, puzzle_state: &PuzzleState<N>, budget: u8) -> Estimate {
        let heuristic = self.admissible_heuristic(puzzle_state);
        if heuristic > budget {
            Estimate::Exceeds(heuristic)
        } else {
            Estimate::Within(heuristic)
        }
    }
}

/// The trivial heuristic. Turns IDA* into plain iterative deepening.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroTable;

impl<const N: usize> PruningTables<N> for ZeroTable {
    fn admissible_heuristic(&self, _puzzle_state: &PuzzleState<N>) -> u8 {
        0
    }
}

impl<const N: usize> PruningTables<N> for [PatternDatabase<N>] {
    fn admissible_heuristic(&self, puzzle_state: &PuzzleState<N>) -> u8 {
        self.iter()
            .map(|pattern_database| pattern_database.query(puzzle_state))
            .max()
            .unwrap_or(0)
    }

    fn estimate_within(&self, puzzle_state: &PuzzleState<N>, budget: u8) -> Estimate {
        let mut heuristic = 0;
        for pattern_database in self {
            let estimate = pattern_database.query(puzzle_state);
            if estimate > budget {
                return Estimate::Exceeds(estimate);
            }
            heuristic = heuristic.max(estimate);
        }
        Estimate::Within(heuristic)
    }
}

impl<const N: usize> PruningTables<N> for Vec<PatternDatabase<N>> {
    fn admissible_heuristic(&self, puzzle_state: &PuzzleState<N>) -> u8 {
        self.as_slice().admissible_heuristic(puzzle_state)
    }

    fn estimate_within(&self, puzzle_state: &PuzzleState<N>, budget: u8) -> Estimate {
        self.as_slice().estimate_within(puzzle_state, budget)
    }
}

impl<const N: usize, T: PruningTables<N> + ?Sized> PruningTables<N> for &T {
    fn admissible_heuristic(&self, puzzle_state: &PuzzleState<N>) -> u8 {
        (**self).admissible_heuristic(puzzle_state)
    }

    fn estimate_within(&self, puzzle_state: &PuzzleState<N>, budget: u8) -> Estimate {
        (**self).estimate_within(puzzle_state, budget)
    }
}

impl BuildStrategy {
    #[must_use]
    pub fn for_size(cardinality: u64) -> Self {
        if cardinality <= LEVEL_ORDER_MAX_ENTRIES {
            BuildStrategy::LevelOrder
        } else {
            BuildStrategy::IterativeDeepening
        }
    }
}

impl<const N: usize> Subset<N> {
    /// Track `pieces`, in order, out of orbit `orbit` of `puzzle_def`.
    ///
    /// # Errors
    ///
    /// If a piece cannot be tracked or the subset is too large to encode. See
    /// `SubsetError`.
    pub fn new(puzzle_def: &PuzzleDef<N>, orbit: usize, pieces: &[u8]) -> Result<Self, SubsetError> {
        let orbit_def = puzzle_def
            .orbits()
            .get(orbit)
            .ok_or(SubsetError::OrbitOutOfRange(orbit))?;

        let mut rank_of_piece = [u8::MAX; N];
        for (rank, &piece) in pieces.iter().enumerate() {
            if !orbit_def.contains(usize::from(piece)) {
                return Err(SubsetError::PieceNotInOrbit {
                    piece,
                    orbit: orbit_def.name,
                });
            }
            if puzzle_def.fixed_slots().contains(&piece) {
                return Err(SubsetError::FixedPiece(piece));
            }
            if rank_of_piece[usize::from(piece)] != u8::MAX {
                return Err(SubsetError::DuplicatePiece(piece));
            }
            rank_of_piece[usize::from(piece)] = rank as u8;
        }

        let movable_slots = Box::<[u8]>::from(orbit_def.movable_slots());
        let mut position_of_slot = [u8::MAX; N];
        for (position, &slot) in movable_slots.iter().enumerate() {
            position_of_slot[usize::from(slot)] = position as u8;
        }

        let encoder = PartialPermutationEncoder::new(
            u8::try_from(movable_slots.len()).unwrap_or(u8::MAX),
            u8::try_from(pieces.len()).unwrap_or(u8::MAX),
            orbit_def.orientation_count,
        )?;

        Ok(Self {
            orbit,
            pieces: Box::from(pieces),
            movable_slots,
            rank_of_piece,
            position_of_slot,
            encoder,
        })
    }

    #[must_use]
    pub fn orbit(&self) -> usize {
        self.orbit
    }

    #[must_use]
    pub fn pieces(&self) -> &[u8] {
        &self.pieces
    }

    #[must_use]
    pub fn cardinality(&self) -> u64 {
        self.encoder.cardinality()
    }

    /// Project a state onto the subset and encode it.
    #[must_use]
    pub fn index(&self, puzzle_state: &PuzzleState<N>) -> u64 {
        let mut positions = [0; N];
        let mut orientations = [0; N];
        for &slot in &self.movable_slots {
            let slot = usize::from(slot);
            let rank = self.rank_of_piece[usize::from(puzzle_state.piece_at(slot))];
            if rank != u8::MAX {
                positions[usize::from(rank)] = self.position_of_slot[slot];
                orientations[usize::from(rank)] = puzzle_state.orientation_at(slot);
            }
        }
        let k = self.pieces.len();
        self.encoder.encode(&positions[..k], &orientations[..k])
    }
}

impl<const N: usize> PatternDatabase<N> {
    fn empty(subset: Subset<N>) -> Result<Self, PatternDatabaseError> {
        let cardinality = subset.cardinality();
        let len = usize::try_from(cardinality)
            .map_err(|_| PatternDatabaseError::TooLarge(cardinality))?;
        Ok(Self {
            subset,
            table: vec![UNREACHED; len].into_boxed_slice(),
        })
    }

    /// Fill in the table by searching outward from the solved state.
    ///
    /// # Errors
    ///
    /// If the table does not fit in memory.
    pub fn build(
        puzzle_def: &PuzzleDef<N>,
        subset: Subset<N>,
        strategy: BuildStrategy,
    ) -> Result<Self, PatternDatabaseError> {
        let mut pattern_database = Self::empty(subset)?;
        info!(
            start!("Building a {} entry {} table with {:?}"),
            pattern_database.len(),
            puzzle_def.orbits()[pattern_database.subset.orbit].name,
            strategy
        );
        let start = Instant::now();

        let solved = puzzle_def.new_solved_state();
        pattern_database.set_if_better(&solved, 0);
        let filled = 1 + match strategy {
            BuildStrategy::LevelOrder => pattern_database.build_level_order(puzzle_def, solved),
            BuildStrategy::IterativeDeepening => {
                pattern_database.build_iterative_deepening(puzzle_def, solved)
            }
        };

        info!(
            success!("Filled {}/{} entries in {:.3}s"),
            filled,
            pattern_database.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(pattern_database)
    }

    fn build_level_order(&mut self, puzzle_def: &PuzzleDef<N>, solved: PuzzleState<N>) -> u64 {
        let len = self.len();
        let mut filled = 1;
        let mut frontier = vec![(solved, None)];
        let mut depth = 0;
        while !frontier.is_empty() && filled < len && depth + 1 < UNREACHED {
            depth += 1;
            let depth_start = Instant::now();
            let mut next_frontier = vec![];
            for (puzzle_state, previous) in &frontier {
                for move_index in 0..puzzle_def.moves.len() {
                    if puzzle_def.should_skip(move_index, *previous) {
                        continue;
                    }
                    let mut child = *puzzle_state;
                    puzzle_def.apply(&mut child, move_index);
                    if self.set_if_better(&child, depth) {
                        next_frontier.push((child, Some(move_index)));
                    }
                }
            }
            filled += next_frontier.len() as u64;
            debug!(
                working!("Depth {}: {} new entries in {:.3}s"),
                depth,
                next_frontier.len(),
                depth_start.elapsed().as_secs_f64()
            );
            frontier = next_frontier;
        }
        filled - 1
    }

    fn build_iterative_deepening(
        &mut self,
        puzzle_def: &PuzzleDef<N>,
        solved: PuzzleState<N>,
    ) -> u64 {
        let len = self.len();
        let mut filled = 1;
        let mut bound = 1;
        while filled < len && bound < UNREACHED {
            let depth_start = Instant::now();
            let committed = self.deepen(puzzle_def, &solved, None, 0, bound);
            debug!(
                working!("Depth {}: {} new entries in {:.3}s"),
                bound,
                committed,
                depth_start.elapsed().as_secs_f64()
            );
            if committed == 0 {
                break;
            }
            filled += committed;
            bound += 1;
        }
        filled - 1
    }

    /// One depth first pass. Only arrangements exactly `bound` moves away are
    /// written; every shallower one was written by an earlier pass.
    fn deepen(
        &mut self,
        puzzle_def: &PuzzleDef<N>,
        puzzle_state: &PuzzleState<N>,
        previous: Option<usize>,
        depth: u8,
        bound: u8,
    ) -> u64 {
        let child_depth = depth + 1;
        let mut committed = 0;
        for move_index in 0..puzzle_def.moves.len() {
            if puzzle_def.should_skip(move_index, previous) {
                continue;
            }
            let mut child = *puzzle_state;
            puzzle_def.apply(&mut child, move_index);
            // Only a strictly shorter known distance prunes: the arrangements
            // along an optimal path are themselves recorded at exactly their
            // depth, and those paths must stay open
            if self.query(&child) < child_depth {
                continue;
            }
            if child_depth == bound {
                if self.set_if_better(&child, bound) {
                    committed += 1;
                }
            } else {
                committed += self.deepen(puzzle_def, &child, Some(move_index), child_depth, bound);
            }
        }
        committed
    }

    /// Wrap an existing table.
    ///
    /// # Errors
    ///
    /// If the table length is not the subset's cardinality.
    pub fn from_bytes(subset: Subset<N>, bytes: Vec<u8>) -> Result<Self, PatternDatabaseError> {
        let expected = subset.cardinality();
        let actual = bytes.len() as u64;
        if expected != actual {
            return Err(PatternDatabaseError::LengthMismatch { expected, actual });
        }
        Ok(Self {
            subset,
            table: bytes.into_boxed_slice(),
        })
    }

    /// Read a table written by `save`.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or has the wrong length.
    pub fn load(subset: Subset<N>, path: impl AsRef<Path>) -> Result<Self, PatternDatabaseError> {
        let path = path.as_ref();
        info!(start!("Loading {}"), path.display());
        let bytes = fs::read(path)?;
        let pattern_database = Self::from_bytes(subset, bytes)?;
        info!(success!("Loaded {} entries"), pattern_database.len());
        Ok(pattern_database)
    }

    /// Write the table verbatim.
    ///
    /// # Errors
    ///
    /// If the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PatternDatabaseError> {
        let path = path.as_ref();
        fs::write(path, &self.table)?;
        info!(success!("Saved {} bytes to {}"), self.len(), path.display());
        Ok(())
    }

    #[must_use]
    pub fn query(&self, puzzle_state: &PuzzleState<N>) -> u8 {
        self.table[self.subset.index(puzzle_state) as usize]
    }

    /// Record `distance` for the arrangement of `puzzle_state` unless an
    /// equal or shorter one is already known. Returns whether it was written.
    pub fn set_if_better(&mut self, puzzle_state: &PuzzleState<N>, distance: u8) -> bool {
        let entry = &mut self.table[self.subset.index(puzzle_state) as usize];
        if distance < *entry {
            *entry = distance;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn is_saturated(&self) -> bool {
        !self.table.contains(&UNREACHED)
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.table.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[must_use]
    pub fn subset(&self) -> &Subset<N> {
        &self.subset
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }

    /// How many entries hold each distance, indexed by distance. Unreached
    /// entries are not counted.
    #[must_use]
    pub fn distribution(&self) -> Vec<u64> {
        let mut distribution = vec![];
        for &distance in self.table.iter().filter(|&&distance| distance != UNREACHED) {
            let distance = usize::from(distance);
            if distribution.len() <= distance {
                distribution.resize(distance + 1, 0);
            }
            distribution[distance] += 1;
        }
        distribution
    }
}
