use kubie_solver::{
    pruning::{BuildStrategy, PatternDatabase, PatternDatabaseError, PruningTables, Subset},
    puzzle::{CUBE3, KILOMINX, PuzzleDef, apply_random_moves, cube3, kilominx},
    solver::Solver,
};
use std::path::PathBuf;

fn init_logger() {
    let _ = pretty_env_logger::formatted_builder()
        .is_test(true)
        .parse_default_env()
        .try_init();
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{name}_{}.pdb", std::process::id()))
}

#[test]
fn test_saved_tables_solve() {
    init_logger();
    let mut rng = fastrand::Rng::with_seed(9);
    let kilominx_def = PuzzleDef::<{ kilominx::PIECE_COUNT }>::new(&KILOMINX).unwrap();

    let subsets = [
        (&[0, 4, 5][..], BuildStrategy::LevelOrder),
        (&[1, 6][..], BuildStrategy::IterativeDeepening),
    ];
    let mut pattern_databases = vec![];
    for (i, (pieces, strategy)) in subsets.into_iter().enumerate() {
        let subset = Subset::new(&kilominx_def, 0, pieces).unwrap();
        let built = PatternDatabase::build(&kilominx_def, subset.clone(), strategy).unwrap();
        assert!(built.is_saturated());

        let path = temp_path(&format!("kilominx_table_{i}"));
        built.save(&path).unwrap();
        let loaded = PatternDatabase::load(subset, &path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.as_bytes(), built.as_bytes());
        pattern_databases.push(loaded);
    }

    let solver = Solver::new(&kilominx_def, &pattern_databases);
    for _ in 0..5 {
        let (puzzle_state, _) =
            apply_random_moves(&kilominx_def, &kilominx_def.new_solved_state(), 4, &mut rng);
        assert!(pattern_databases.admissible_heuristic(&puzzle_state) <= 4);
        let solution = solver.solve(&puzzle_state).unwrap();
        assert!(solution.len() <= 4);
    }
}

#[test]
fn test_truncated_file_is_rejected() {
    init_logger();
    let cube3_def = PuzzleDef::<{ cube3::PIECE_COUNT }>::new(&CUBE3).unwrap();
    let subset = Subset::new(&cube3_def, 1, &[12, 13]).unwrap();
    let pattern_database =
        PatternDatabase::build(&cube3_def, subset.clone(), BuildStrategy::LevelOrder).unwrap();

    let path = temp_path("truncated_table");
    std::fs::write(&path, &pattern_database.as_bytes()[..100]).unwrap();
    let result = PatternDatabase::load(subset, &path);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
        result,
        Err(PatternDatabaseError::LengthMismatch {
            expected: 504,
            actual: 100
        })
    ));
}
