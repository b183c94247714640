use itertools::Itertools;
use thiserror::Error;

pub mod cube3;
pub mod kilominx;

pub use cube3::CUBE3;
pub use kilominx::KILOMINX;

/// A static, geometry-level description of a puzzle. `PuzzleDef::new` turns
/// it into the expanded move table used everywhere else.
#[derive(Debug)]
pub struct PuzzleDescription {
    pub name: &'static str,
    pub faces: &'static [&'static str],
    pub orbits: &'static [OrbitDescription],
    /// For every slot, the faces its home piece touches, listed clockwise as
    /// seen from outside the puzzle. The first face is the reference face
    /// that orientation is measured against.
    pub piece_faces: &'static [&'static [u8]],
    /// For every face, the slot cycles of its clockwise base turn. A piece in
    /// `cycle[i]` moves to `cycle[i + 1]`.
    pub turns: &'static [&'static [&'static [u8]]],
    pub turn_order: u8,
    /// Slots whose piece never moves. Faces touching them are not turnable.
    pub fixed_slots: &'static [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitDescription {
    pub name: &'static str,
    pub start: u8,
    pub len: u8,
    pub orientation_count: u8,
}

/// An orbit of the expanded puzzle: a contiguous run of slots whose pieces
/// only ever move among themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbitDef {
    pub name: &'static str,
    pub start: u8,
    pub len: u8,
    pub orientation_count: u8,
    movable_slots: Box<[u8]>,
}

/// One cycle of a move. The piece in `slots[i]` moves to `slots[i + 1]` and
/// has `twists[i]` added to its orientation on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    slots: Box<[u8]>,
    twists: Box<[u8]>,
    orientation_count: u8,
}

#[derive(Debug, Clone)]
pub struct Move {
    pub name: String,
    /// The face this move turns. Moves of the same face form a move class.
    pub face: usize,
    /// How many clockwise base turns this move is equivalent to.
    pub power: u8,
    /// Index of the inverse move in `PuzzleDef::moves`.
    pub inverse: usize,
    cycles: Box<[Cycle]>,
}

#[derive(Debug)]
pub struct PuzzleDef<const N: usize> {
    pub name: &'static str,
    pub moves: Box<[Move]>,
    // indicies into moves
    pub move_classes: Box<[usize]>,
    face_names: &'static [&'static str],
    piece_faces: &'static [&'static [u8]],
    orbits: Box<[OrbitDef]>,
    orbit_of_slot: [u8; N],
    fixed_slots: &'static [u8],
    // bit `b` of `commutes[a]` is set when faces `a` and `b` commute
    commutes: Box<[u64]>,
}

/// The puzzle state: which piece sits in each slot, and how it is twisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PuzzleState<const N: usize> {
    perm: [u8; N],
    ori: [u8; N],
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PuzzleDefError {
    #[error("Expected {expected} slots but the description has {actual}")]
    PieceCountMismatch { expected: usize, actual: usize },
    #[error("Slot {slot} is not covered by exactly one orbit")]
    OrbitCoverage { slot: usize },
    #[error("Slot {slot} has {actual} faces but its orbit has orientation count {expected}")]
    OrientationCountMismatch {
        slot: usize,
        expected: u8,
        actual: usize,
    },
    #[error("Expected a base turn for each of the {expected} faces but got {actual}")]
    TurnCountMismatch { expected: usize, actual: usize },
    #[error("Face index {face} is out of range")]
    FaceOutOfRange { face: usize },
    #[error("Slot {slot} is out of range")]
    SlotOutOfRange { slot: usize },
    #[error("The base turn of face {face} moves slot {slot}, which does not touch that face")]
    SlotNotOnFace { face: &'static str, slot: usize },
    #[error("The base turn of face {face} mixes slots of different orbits")]
    CycleCrossesOrbits { face: &'static str },
    #[error("The base turn of face {face} moves slot {slot} more than once")]
    RepeatedSlot { face: &'static str, slot: usize },
    #[error("The base turn of face {face} does not have order {order}")]
    TurnOrderMismatch { face: &'static str, order: u8 },
    #[error("Too many faces, at most 64 are supported")]
    TooManyFaces,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("Unknown move {0:?}")]
    UnknownMove(String),
}

impl Cycle {
    #[must_use]
    pub fn slots(&self) -> &[u8] {
        &self.slots
    }

    #[must_use]
    pub fn twists(&self) -> &[u8] {
        &self.twists
    }
}

impl Move {
    #[must_use]
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }
}

impl OrbitDef {
    /// The slots of this orbit whose pieces can move, in slot order.
    #[must_use]
    pub fn movable_slots(&self) -> &[u8] {
        &self.movable_slots
    }

    #[must_use]
    pub fn contains(&self, slot: usize) -> bool {
        (usize::from(self.start)..usize::from(self.start) + usize::from(self.len)).contains(&slot)
    }
}

#[inline]
fn add_orientation(a: u8, b: u8, orientation_count: u8) -> u8 {
    (a + b).min((a + b).wrapping_sub(orientation_count))
}

impl<const N: usize> PuzzleState<N> {
    #[must_use]
    pub fn solved() -> Self {
        Self {
            perm: std::array::from_fn(|i| i as u8),
            ori: [0; N],
        }
    }

    pub(crate) fn from_parts(perm: [u8; N], ori: [u8; N]) -> Self {
        Self { perm, ori }
    }

    /// The identity of the piece currently in `slot`.
    #[must_use]
    pub fn piece_at(&self, slot: usize) -> u8 {
        self.perm[slot]
    }

    /// The twist of the piece currently in `slot` relative to its reference
    /// face.
    #[must_use]
    pub fn orientation_at(&self, slot: usize) -> u8 {
        self.ori[slot]
    }

    /// Apply a move in place. Only the slots the move touches are visited.
    pub fn apply(&mut self, move_: &Move) {
        for cycle in &move_.cycles {
            let slots = &cycle.slots;
            let len = slots.len();
            let last = usize::from(slots[len - 1]);
            let (carried_piece, carried_ori) = (self.perm[last], self.ori[last]);
            for i in (1..len).rev() {
                let to = usize::from(slots[i]);
                let from = usize::from(slots[i - 1]);
                self.perm[to] = self.perm[from];
                self.ori[to] =
                    add_orientation(self.ori[from], cycle.twists[i - 1], cycle.orientation_count);
            }
            let first = usize::from(slots[0]);
            self.perm[first] = carried_piece;
            self.ori[first] =
                add_orientation(carried_ori, cycle.twists[len - 1], cycle.orientation_count);
        }
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.perm.iter().enumerate().all(|(i, &piece)| usize::from(piece) == i)
            && self.ori.iter().all(|&ori| ori == 0)
    }
}

impl<const N: usize> Default for PuzzleState<N> {
    fn default() -> Self {
        Self::solved()
    }
}

/// Turn a state reached from solved back into `from -> (to, twist)` cycles.
fn extract_cycles<const N: usize>(
    state: &PuzzleState<N>,
    orbits: &[OrbitDef],
    orbit_of_slot: &[u8; N],
) -> Vec<Cycle> {
    // the piece that started in slot `s` now sits in `destination[s]`
    let mut destination = [0_u8; N];
    for (to, &from) in state.perm.iter().enumerate() {
        destination[usize::from(from)] = to as u8;
    }
    let mut visited = [false; N];
    let mut cycles = vec![];
    for start in 0..N {
        if visited[start]
            || (usize::from(destination[start]) == start
                && state.ori[usize::from(destination[start])] == 0)
        {
            continue;
        }
        let mut slots = vec![];
        let mut twists = vec![];
        let mut slot = start;
        loop {
            visited[slot] = true;
            let to = usize::from(destination[slot]);
            slots.push(slot as u8);
            twists.push(state.ori[to]);
            if to == start {
                break;
            }
            slot = to;
        }
        cycles.push(Cycle {
            slots: slots.into_boxed_slice(),
            twists: twists.into_boxed_slice(),
            orientation_count: orbits[usize::from(orbit_of_slot[start])].orientation_count,
        });
    }
    cycles
}

impl<const N: usize> PuzzleDef<N> {
    /// Expand a static description into a full move table.
    ///
    /// # Errors
    ///
    /// If the description is inconsistent. See `PuzzleDefError`.
    pub fn new(description: &'static PuzzleDescription) -> Result<Self, PuzzleDefError> {
        if description.piece_faces.len() != N {
            return Err(PuzzleDefError::PieceCountMismatch {
                expected: N,
                actual: description.piece_faces.len(),
            });
        }
        if description.faces.len() > u64::BITS as usize {
            return Err(PuzzleDefError::TooManyFaces);
        }
        if description.turns.len() != description.faces.len() {
            return Err(PuzzleDefError::TurnCountMismatch {
                expected: description.faces.len(),
                actual: description.turns.len(),
            });
        }

        let mut orbit_of_slot = [u8::MAX; N];
        for (i, orbit) in description.orbits.iter().enumerate() {
            let range = usize::from(orbit.start)..usize::from(orbit.start) + usize::from(orbit.len);
            for slot in range {
                match orbit_of_slot.get_mut(slot) {
                    Some(entry) if *entry == u8::MAX => *entry = i as u8,
                    Some(_) => return Err(PuzzleDefError::OrbitCoverage { slot }),
                    None => return Err(PuzzleDefError::SlotOutOfRange { slot }),
                }
            }
        }
        if let Some(slot) = orbit_of_slot.iter().position(|&orbit| orbit == u8::MAX) {
            return Err(PuzzleDefError::OrbitCoverage { slot });
        }

        for (slot, faces) in description.piece_faces.iter().enumerate() {
            let orbit = description.orbits[usize::from(orbit_of_slot[slot])];
            if faces.len() != usize::from(orbit.orientation_count) {
                return Err(PuzzleDefError::OrientationCountMismatch {
                    slot,
                    expected: orbit.orientation_count,
                    actual: faces.len(),
                });
            }
            if let Some(&face) = faces
                .iter()
                .find(|&&face| usize::from(face) >= description.faces.len())
            {
                return Err(PuzzleDefError::FaceOutOfRange {
                    face: usize::from(face),
                });
            }
        }
        if let Some(&slot) = description
            .fixed_slots
            .iter()
            .find(|&&slot| usize::from(slot) >= N)
        {
            return Err(PuzzleDefError::SlotOutOfRange {
                slot: usize::from(slot),
            });
        }

        let orbits: Box<[OrbitDef]> = description
            .orbits
            .iter()
            .map(|orbit| OrbitDef {
                name: orbit.name,
                start: orbit.start,
                len: orbit.len,
                orientation_count: orbit.orientation_count,
                movable_slots: (orbit.start..orbit.start + orbit.len)
                    .filter(|slot| !description.fixed_slots.contains(slot))
                    .collect(),
            })
            .collect();

        let mut base_turns: Vec<(usize, Move)> = vec![];
        for (face, turn) in description.turns.iter().enumerate() {
            let face_name = description.faces[face];
            let mut seen = [false; N];
            let mut touches_fixed = false;
            let mut cycles = Vec::with_capacity(turn.len());
            for cycle in *turn {
                if let Some(&slot) = cycle.iter().find(|&&slot| usize::from(slot) >= N) {
                    return Err(PuzzleDefError::SlotOutOfRange {
                        slot: usize::from(slot),
                    });
                }
                let Some(&first) = cycle.first() else {
                    continue;
                };
                let orbit = orbit_of_slot[usize::from(first)];
                let mut twists = Vec::with_capacity(cycle.len());
                for (i, &slot) in cycle.iter().enumerate() {
                    let slot = usize::from(slot);
                    if orbit_of_slot[slot] != orbit {
                        return Err(PuzzleDefError::CycleCrossesOrbits { face: face_name });
                    }
                    if std::mem::replace(&mut seen[slot], true) {
                        return Err(PuzzleDefError::RepeatedSlot {
                            face: face_name,
                            slot,
                        });
                    }
                    touches_fixed |= description.fixed_slots.contains(&(slot as u8));
                    let to = usize::from(cycle[(i + 1) % cycle.len()]);
                    let face_at = |slot: usize| {
                        description.piece_faces[slot]
                            .iter()
                            .position(|&f| usize::from(f) == face)
                            .ok_or(PuzzleDefError::SlotNotOnFace {
                                face: face_name,
                                slot,
                            })
                    };
                    // A rotation about the face keeps the clockwise order of
                    // the faces around the piece, so the whole sticker list
                    // shifts by however far the turning face shifts
                    let orientation_count = description.piece_faces[slot].len();
                    let twist = (orientation_count + face_at(to)? - face_at(slot)?)
                        % orientation_count;
                    twists.push(twist as u8);
                }
                cycles.push(Cycle {
                    slots: Box::from(*cycle),
                    twists: twists.into_boxed_slice(),
                    orientation_count: orbits[usize::from(orbit)].orientation_count,
                });
            }
            if touches_fixed {
                continue;
            }
            base_turns.push((
                face,
                Move {
                    name: face_name.to_owned(),
                    face,
                    power: 1,
                    inverse: 0,
                    cycles: cycles.into_boxed_slice(),
                },
            ));
        }

        let order = description.turn_order;
        let mut moves: Vec<Move> = vec![];
        let mut move_classes = vec![];
        for (face, base_move) in &base_turns {
            let face_name = description.faces[*face];
            let move_class = moves.len();
            move_classes.push(move_class);

            let mut power_state = PuzzleState::<N>::solved();
            for power in 1..order {
                power_state.apply(base_move);
                // same naming as the usual notation: the shorter way around
                // wins, and a tie goes to the clockwise direction
                let mut twist = i16::from(power);
                if i16::from(order) - twist < twist {
                    twist -= i16::from(order);
                }
                let mut name = face_name.to_owned();
                if twist.abs() != 1 {
                    name.push_str(&twist.abs().to_string());
                }
                if twist < 0 {
                    name.push('\'');
                }
                moves.push(Move {
                    name,
                    face: *face,
                    power,
                    inverse: move_class + usize::from(order - power) - 1,
                    cycles: extract_cycles(&power_state, &orbits, &orbit_of_slot)
                        .into_boxed_slice(),
                });
            }
            power_state.apply(base_move);
            if !power_state.is_solved() {
                return Err(PuzzleDefError::TurnOrderMismatch {
                    face: face_name,
                    order,
                });
            }
        }

        let mut commutes = vec![0_u64; description.faces.len()];
        for (face_1, move_1) in &base_turns {
            for (face_2, move_2) in &base_turns {
                let mut result_1 = PuzzleState::<N>::solved();
                let mut result_2 = result_1;
                result_1.apply(move_1);
                result_1.apply(move_2);
                result_2.apply(move_2);
                result_2.apply(move_1);
                if result_1 == result_2 {
                    commutes[*face_1] |= 1 << *face_2;
                }
            }
        }

        Ok(PuzzleDef {
            name: description.name,
            moves: moves.into_boxed_slice(),
            move_classes: move_classes.into_boxed_slice(),
            face_names: description.faces,
            piece_faces: description.piece_faces,
            orbits,
            orbit_of_slot,
            fixed_slots: description.fixed_slots,
            commutes: commutes.into_boxed_slice(),
        })
    }

    #[must_use]
    pub fn new_solved_state(&self) -> PuzzleState<N> {
        PuzzleState::solved()
    }

    #[must_use]
    pub fn find_move(&self, name: &str) -> Option<usize> {
        self.moves.iter().position(|move_| move_.name == name)
    }

    pub fn apply(&self, puzzle_state: &mut PuzzleState<N>, move_index: usize) {
        puzzle_state.apply(&self.moves[move_index]);
    }

    pub fn undo(&self, puzzle_state: &mut PuzzleState<N>, move_index: usize) {
        self.apply(puzzle_state, self.invert(move_index));
    }

    #[must_use]
    pub fn invert(&self, move_index: usize) -> usize {
        self.moves[move_index].inverse
    }

    #[must_use]
    pub fn faces_commute(&self, face_1: usize, face_2: usize) -> bool {
        self.commutes[face_1] & (1 << face_2) != 0
    }

    /// Whether `candidate` is redundant right after `previous`: turning the
    /// same face twice can always be merged into one move, and two commuting
    /// faces only ever need to be searched in ascending face order.
    #[must_use]
    pub fn should_skip(&self, candidate: usize, previous: Option<usize>) -> bool {
        let Some(previous) = previous else {
            return false;
        };
        let candidate_face = self.moves[candidate].face;
        let previous_face = self.moves[previous].face;
        candidate_face == previous_face
            || (candidate_face < previous_face && self.faces_commute(candidate_face, previous_face))
    }

    #[must_use]
    pub fn orbits(&self) -> &[OrbitDef] {
        &self.orbits
    }

    #[must_use]
    pub fn orbit_of_slot(&self, slot: usize) -> &OrbitDef {
        &self.orbits[usize::from(self.orbit_of_slot[slot])]
    }

    #[must_use]
    pub fn orbit_index_of_slot(&self, slot: usize) -> usize {
        usize::from(self.orbit_of_slot[slot])
    }

    #[must_use]
    pub fn face_names(&self) -> &[&'static str] {
        self.face_names
    }

    /// The faces touched by the piece whose home is `slot`, clockwise from
    /// its reference face.
    #[must_use]
    pub fn piece_faces(&self, slot: usize) -> &[u8] {
        self.piece_faces[slot]
    }

    #[must_use]
    pub fn fixed_slots(&self) -> &[u8] {
        self.fixed_slots
    }

    /// Space separated move names, in order.
    #[must_use]
    pub fn format_moves(&self, move_indicies: &[usize]) -> String {
        move_indicies
            .iter()
            .map(|&move_index| &self.moves[move_index].name)
            .join(" ")
    }
}

/// Apply a whitespace separated sequence of move names.
///
/// # Errors
///
/// If a move name is not part of the puzzle's move set.
pub fn apply_moves<const N: usize>(
    puzzle_def: &PuzzleDef<N>,
    puzzle_state: &PuzzleState<N>,
    moves: &str,
) -> Result<PuzzleState<N>, MoveParseError> {
    let mut result = *puzzle_state;
    for name in moves.split_whitespace() {
        let move_index = puzzle_def
            .find_move(name)
            .ok_or_else(|| MoveParseError::UnknownMove(name.to_owned()))?;
        puzzle_def.apply(&mut result, move_index);
    }
    Ok(result)
}

/// Apply `random_move_count` random moves, none of which is redundant with
/// the move before it. Returns the state and the moves applied.
pub fn apply_random_moves<const N: usize>(
    puzzle_def: &PuzzleDef<N>,
    puzzle_state: &PuzzleState<N>,
    random_move_count: usize,
    rng: &mut fastrand::Rng,
) -> (PuzzleState<N>, Vec<usize>) {
    let mut result = *puzzle_state;
    let mut applied = Vec::with_capacity(random_move_count);
    while applied.len() < random_move_count {
        let move_index = rng.usize(..puzzle_def.moves.len());
        if puzzle_def.should_skip(move_index, applied.last().copied()) {
            continue;
        }
        puzzle_def.apply(&mut result, move_index);
        applied.push(move_index);
    }
    (result, applied)
}
