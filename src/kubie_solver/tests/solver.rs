use itertools::Itertools;
use kubie_solver::{
    pruning::{BuildStrategy, PatternDatabase, PruningTables, Subset, ZeroTable},
    puzzle::{
        CUBE3, KILOMINX, Move, PuzzleDef, PuzzleState, apply_moves, apply_random_moves, cube3,
        kilominx,
    },
    solver::Solver,
};
use log::info;

type Cube3Def = PuzzleDef<{ cube3::PIECE_COUNT }>;
type KilominxDef = PuzzleDef<{ kilominx::PIECE_COUNT }>;

fn small_tables<const N: usize>(
    puzzle_def: &PuzzleDef<N>,
    subsets: &[(usize, &[u8])],
) -> Vec<PatternDatabase<N>> {
    subsets
        .iter()
        .map(|&(orbit, pieces)| {
            let subset = Subset::new(puzzle_def, orbit, pieces).unwrap();
            PatternDatabase::build(puzzle_def, subset, BuildStrategy::LevelOrder).unwrap()
        })
        .collect()
}

fn cube3_tables(cube3_def: &Cube3Def) -> Vec<PatternDatabase<{ cube3::PIECE_COUNT }>> {
    small_tables(
        cube3_def,
        &[
            (1, &[12, 13, 14, 15]),
            (1, &[16, 17, 18, 19]),
            (0, &[0, 1, 2, 3]),
            (0, &[4, 5, 6, 7]),
            (0, &[8, 9, 10, 11]),
        ],
    )
}

fn replay<const N: usize>(puzzle_state: &PuzzleState<N>, solution: &[&Move]) -> PuzzleState<N> {
    let mut result = *puzzle_state;
    for move_ in solution {
        result.apply(move_);
    }
    result
}

#[test_log::test]
fn test_single_quarter_turn() {
    let cube3_def = Cube3Def::new(&CUBE3).unwrap();
    let pattern_databases = cube3_tables(&cube3_def);
    let solver = Solver::new(&cube3_def, pattern_databases);
    for &move_class in &cube3_def.move_classes {
        let mut puzzle_state = cube3_def.new_solved_state();
        cube3_def.apply(&mut puzzle_state, move_class);
        let solution = solver.solve(&puzzle_state).unwrap();
        assert_eq!(solution.len(), 1);
        assert_eq!(
            solution[0].name,
            cube3_def.moves[cube3_def.invert(move_class)].name
        );
    }
}

#[test_log::test]
fn test_cube3_random_scrambles() {
    let mut rng = fastrand::Rng::with_seed(2025);
    let cube3_def = Cube3Def::new(&CUBE3).unwrap();
    let pattern_databases = cube3_tables(&cube3_def);
    let solver = Solver::new(&cube3_def, &pattern_databases);
    let zero_solver = Solver::new(&cube3_def, ZeroTable);

    for scramble_length in 1..=6 {
        for _ in 0..5 {
            let (puzzle_state, scramble) = apply_random_moves(
                &cube3_def,
                &cube3_def.new_solved_state(),
                scramble_length,
                &mut rng,
            );
            info!("Scramble: {}", cube3_def.format_moves(&scramble));
            assert!(
                usize::from(pattern_databases.admissible_heuristic(&puzzle_state))
                    <= scramble_length
            );

            let solution = solver.solve(&puzzle_state).unwrap();
            assert!(solution.len() <= scramble_length);
            assert!(replay(&puzzle_state, &solution).is_solved());

            if scramble_length <= 4 {
                let zero_solution = zero_solver.solve(&puzzle_state).unwrap();
                assert_eq!(zero_solution.len(), solution.len());
            }
        }
    }
}

#[test_log::test]
fn test_kilominx_random_scrambles() {
    let mut rng = fastrand::Rng::with_seed(5);
    let kilominx_def = KilominxDef::new(&KILOMINX).unwrap();
    let pattern_databases = small_tables(
        &kilominx_def,
        &[
            (0, &[0, 1, 2]),
            (0, &[3, 4, 5]),
            (0, &[6, 7, 8]),
            (0, &[9, 10, 11]),
            (0, &[12, 13, 14]),
            (0, &[15, 16, 17]),
            (0, &[18]),
        ],
    );
    let solver = Solver::new(&kilominx_def, pattern_databases);

    for scramble_length in 1..=5 {
        for _ in 0..3 {
            let (puzzle_state, scramble) = apply_random_moves(
                &kilominx_def,
                &kilominx_def.new_solved_state(),
                scramble_length,
                &mut rng,
            );
            info!("Scramble: {}", kilominx_def.format_moves(&scramble));
            let solution = solver.solve(&puzzle_state).unwrap();
            assert!(solution.len() <= scramble_length);
            assert!(replay(&puzzle_state, &solution).is_solved());
            assert!(solution.iter().all(|move_| move_.name != "D"));
        }
    }
}

#[test_log::test]
fn test_solve_from_coloring() {
    let cube3_def = Cube3Def::new(&CUBE3).unwrap();
    let scrambled =
        apply_moves(&cube3_def, &cube3_def.new_solved_state(), "R U R' F2 D").unwrap();
    let coloring = cube3_def.to_coloring(&scrambled);

    let puzzle_state = cube3_def.try_from_coloring(&coloring).unwrap();
    assert_eq!(puzzle_state, scrambled);

    let pattern_databases = cube3_tables(&cube3_def);
    let solver = Solver::new(&cube3_def, &pattern_databases);
    let solution = solver.solve(&puzzle_state).unwrap();
    assert!(solution.len() <= 5);
    assert!(replay(&puzzle_state, &solution).is_solved());
    info!(
        "Solution: {}",
        solution.iter().map(|move_| &move_.name).join(" ")
    );
}
