use crate::{
    pruning::{Estimate, PruningTables, UNREACHED},
    puzzle::{Move, PuzzleDef, PuzzleState},
    start, success, working,
};
use log::{Level, debug, info, log_enabled};
use std::time::Instant;
use thiserror::Error;

pub struct Solver<'a, const N: usize, T: PruningTables<N>> {
    puzzle_def: &'a PuzzleDef<N>,
    pruning_tables: T,
    max_solution_length: Option<usize>,
}

/// A child of a search node: its estimate, the move reaching it, and the
/// state itself.
type Child<const N: usize> = (u8, usize, PuzzleState<N>);

struct SolverMutable<const N: usize> {
    solution: Vec<usize>,
    // one buffer of children per depth, kept across iterations
    children: Vec<Vec<Child<N>>>,
    next_bound: u16,
    nodes_visited: u64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SolverError {
    #[error("A pruning table reported an unreached entry. Was it fully built?")]
    UnbuiltTable,
    #[error("The search space was exhausted without finding a solution")]
    SolutionDoesNotExist,
    #[error("Max solution length exceeded")]
    MaxSolutionLengthExceeded,
}

impl<'a, const N: usize, T: PruningTables<N>> Solver<'a, N, T> {
    pub fn new(puzzle_def: &'a PuzzleDef<N>, pruning_tables: T) -> Self {
        Self {
            puzzle_def,
            pruning_tables,
            max_solution_length: None,
        }
    }

    #[must_use]
    pub fn with_max_solution_length(mut self, max_solution_length: usize) -> Self {
        self.max_solution_length = Some(max_solution_length);
        self
    }

    #[must_use]
    pub fn pruning_tables(&self) -> &T {
        &self.pruning_tables
    }

    /// Depth first search of every path of exactly `bound` moves that the
    /// heuristic does not rule out. Returns whether a solution was found, in
    /// which case `mutable.solution` holds it.
    fn search_for_solution(
        &self,
        mutable: &mut SolverMutable<N>,
        puzzle_state: &PuzzleState<N>,
        previous: Option<usize>,
        depth: u8,
        bound: u8,
    ) -> Result<bool, SolverError> {
        if log_enabled!(Level::Debug) {
            mutable.nodes_visited += 1;
        }

        if depth == bound {
            if puzzle_state.is_solved() {
                return Ok(true);
            }
            // The heuristic allowed this node, so it cannot rule out a
            // solution one move further
            mutable.next_bound = mutable.next_bound.min(u16::from(bound) + 1);
            return Ok(false);
        }

        let mut children = std::mem::take(&mut mutable.children[usize::from(depth)]);
        children.clear();
        let budget = bound - depth - 1;
        for move_index in 0..self.puzzle_def.moves.len() {
            if self.puzzle_def.should_skip(move_index, previous) {
                continue;
            }
            let mut child = *puzzle_state;
            self.puzzle_def.apply(&mut child, move_index);
            match self.pruning_tables.estimate_within(&child, budget) {
                Estimate::Within(estimate) => children.push((estimate, move_index, child)),
                Estimate::Exceeds(UNREACHED) => return Err(SolverError::UnbuiltTable),
                Estimate::Exceeds(estimate) => {
                    mutable.next_bound = mutable
                        .next_bound
                        .min(u16::from(depth) + 1 + u16::from(estimate));
                }
            }
        }
        // Stable, so equal estimates keep the move table order
        children.sort_by_key(|&(estimate, ..)| estimate);

        let mut found = false;
        for &(_, move_index, child) in &children {
            mutable.solution.push(move_index);
            if self.search_for_solution(mutable, &child, Some(move_index), depth + 1, bound)? {
                found = true;
                break;
            }
            mutable.solution.pop();
        }
        mutable.children[usize::from(depth)] = children;
        Ok(found)
    }

    /// Find an optimal solution with IDA*.
    ///
    /// # Errors
    ///
    /// If the pruning tables are incomplete, or if no solution exists within
    /// the maximum solution length. See `SolverError`.
    pub fn solve(&self, puzzle_state: &PuzzleState<N>) -> Result<Vec<&'a Move>, SolverError> {
        info!(start!("Solving the {}"), self.puzzle_def.name);
        let start = Instant::now();

        let mut bound = self.pruning_tables.admissible_heuristic(puzzle_state);
        if bound == UNREACHED {
            return Err(SolverError::UnbuiltTable);
        }
        let mut mutable = SolverMutable {
            solution: vec![],
            children: vec![],
            next_bound: u16::MAX,
            nodes_visited: 0,
        };

        loop {
            if let Some(max_solution_length) = self.max_solution_length
                && usize::from(bound) > max_solution_length
            {
                return Err(SolverError::MaxSolutionLengthExceeded);
            }
            debug!(working!("Searching depth {}..."), bound);
            let depth_start = Instant::now();
            mutable.solution.clear();
            mutable.next_bound = u16::MAX;
            mutable.nodes_visited = 0;
            if mutable.children.len() < usize::from(bound) {
                mutable.children.resize_with(usize::from(bound), Vec::new);
            }

            let found = self.search_for_solution(&mut mutable, puzzle_state, None, 0, bound)?;
            debug!(
                working!("Traversed {} nodes in {:.3}s"),
                mutable.nodes_visited,
                depth_start.elapsed().as_secs_f64()
            );
            if found {
                break;
            }
            bound = u8::try_from(mutable.next_bound)
                .ok()
                .filter(|&next_bound| next_bound < UNREACHED)
                .ok_or(SolverError::SolutionDoesNotExist)?;
        }

        info!(
            success!("Found {} in {:.3}s"),
            self.puzzle_def.format_moves(&mutable.solution),
            start.elapsed().as_secs_f64()
        );
        Ok(mutable
            .solution
            .iter()
            .map(|&move_index| &self.puzzle_def.moves[move_index])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pruning::{BuildStrategy, PatternDatabase, Subset, ZeroTable},
        puzzle::{CUBE3, KILOMINX, apply_moves, cube3, kilominx},
    };

    type Cube3Def = PuzzleDef<{ cube3::PIECE_COUNT }>;
    type KilominxDef = PuzzleDef<{ kilominx::PIECE_COUNT }>;

    fn names(solution: &[&Move]) -> Vec<String> {
        solution.iter().map(|move_| move_.name.clone()).collect()
    }

    fn replay<const N: usize>(puzzle_state: &PuzzleState<N>, solution: &[&Move]) -> PuzzleState<N> {
        let mut result = *puzzle_state;
        for move_ in solution {
            result.apply(move_);
        }
        result
    }

    #[test]
    fn test_solved() {
        let cube3_def = Cube3Def::new(&CUBE3).unwrap();
        let solver = Solver::new(&cube3_def, ZeroTable);
        assert!(solver.solve(&cube3_def.new_solved_state()).unwrap().is_empty());
    }

    #[test]
    fn test_single_quarter_turn() {
        let cube3_def = Cube3Def::new(&CUBE3).unwrap();
        let puzzle_state = apply_moves(&cube3_def, &cube3_def.new_solved_state(), "F").unwrap();
        let solver = Solver::new(&cube3_def, ZeroTable);
        assert_eq!(names(&solver.solve(&puzzle_state).unwrap()), ["F'"]);
    }

    #[test]
    fn test_zero_table_is_optimal() {
        let cube3_def = Cube3Def::new(&CUBE3).unwrap();
        let puzzle_state =
            apply_moves(&cube3_def, &cube3_def.new_solved_state(), "R U F").unwrap();
        let solver = Solver::new(&cube3_def, ZeroTable);
        let solution = solver.solve(&puzzle_state).unwrap();
        assert_eq!(names(&solution), ["F'", "U'", "R'"]);

        // commuting faces come out in ascending order
        let puzzle_state = apply_moves(&cube3_def, &cube3_def.new_solved_state(), "D U").unwrap();
        let solution = solver.solve(&puzzle_state).unwrap();
        assert_eq!(names(&solution), ["U'", "D'"]);
    }

    #[test]
    fn test_kilominx() {
        let kilominx_def = KilominxDef::new(&KILOMINX).unwrap();
        let puzzle_state =
            apply_moves(&kilominx_def, &kilominx_def.new_solved_state(), "R F2' U").unwrap();
        let solver = Solver::new(&kilominx_def, ZeroTable);
        let solution = solver.solve(&puzzle_state).unwrap();
        assert_eq!(solution.len(), 3);
        assert!(replay(&puzzle_state, &solution).is_solved());
    }

    #[test]
    fn test_with_pattern_databases() {
        let cube3_def = Cube3Def::new(&CUBE3).unwrap();
        let pattern_databases = vec![
            PatternDatabase::build(
                &cube3_def,
                Subset::new(&cube3_def, 1, &[12, 13, 14, 15]).unwrap(),
                BuildStrategy::LevelOrder,
            )
            .unwrap(),
        ];
        let scramble = "R U2 F' L D";
        let puzzle_state =
            apply_moves(&cube3_def, &cube3_def.new_solved_state(), scramble).unwrap();
        let solver = Solver::new(&cube3_def, &pattern_databases);
        let solution = solver.solve(&puzzle_state).unwrap();
        assert!(solution.len() <= 5);
        assert!(replay(&puzzle_state, &solution).is_solved());
    }

    #[test]
    fn test_unbuilt_table() {
        let cube3_def = Cube3Def::new(&CUBE3).unwrap();
        let subset = Subset::new(&cube3_def, 0, &[4, 8, 9]).unwrap();
        let cardinality = subset.cardinality() as usize;
        let pattern_databases =
            vec![PatternDatabase::from_bytes(subset, vec![UNREACHED; cardinality]).unwrap()];
        let puzzle_state = apply_moves(&cube3_def, &cube3_def.new_solved_state(), "R").unwrap();
        let solver = Solver::new(&cube3_def, pattern_databases);
        assert_eq!(
            solver.solve(&puzzle_state).unwrap_err(),
            SolverError::UnbuiltTable
        );
    }

    #[test]
    fn test_unbuilt_entry_mid_search() {
        let cube3_def = Cube3Def::new(&CUBE3).unwrap();
        let subset = Subset::new(&cube3_def, 0, &[0]).unwrap();
        // only the solved arrangement is known
        let mut table = vec![UNREACHED; 24];
        table[0] = 0;
        let pattern_databases = vec![PatternDatabase::from_bytes(subset, table).unwrap()];
        let puzzle_state = apply_moves(&cube3_def, &cube3_def.new_solved_state(), "D").unwrap();
        let solver = Solver::new(&cube3_def, pattern_databases);
        assert_eq!(
            solver.solve(&puzzle_state).unwrap_err(),
            SolverError::UnbuiltTable
        );
    }

    #[test]
    fn test_max_solution_length() {
        let cube3_def = Cube3Def::new(&CUBE3).unwrap();
        let puzzle_state =
            apply_moves(&cube3_def, &cube3_def.new_solved_state(), "R U F").unwrap();
        let solver = Solver::new(&cube3_def, ZeroTable).with_max_solution_length(2);
        assert_eq!(
            solver.solve(&puzzle_state).unwrap_err(),
            SolverError::MaxSolutionLengthExceeded
        );
        let solver = Solver::new(&cube3_def, ZeroTable).with_max_solution_length(3);
        assert_eq!(solver.solve(&puzzle_state).unwrap().len(), 3);
    }
}
