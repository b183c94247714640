//! The pattern databases worth building for each puzzle.

use crate::{
    pruning::{BuildStrategy, PatternDatabase, PatternDatabaseError, Subset, SubsetError},
    puzzle::{CUBE3, KILOMINX, PuzzleDef, PuzzleDescription},
};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleKind {
    Cube3,
    Kilominx,
}

/// A subset with a stable name, used for its file name on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedSubset {
    pub name: &'static str,
    pub kind: PuzzleKind,
    pub orbit: usize,
    pub pieces: &'static [u8],
}

pub const CATALOG: &[NamedSubset] = &[
    NamedSubset {
        name: "cube3-corners",
        kind: PuzzleKind::Cube3,
        orbit: 1,
        pieces: &[12, 13, 14, 15, 16, 17, 18, 19],
    },
    NamedSubset {
        name: "cube3-edges-a",
        kind: PuzzleKind::Cube3,
        orbit: 0,
        pieces: &[0, 1, 2, 3, 4, 5],
    },
    NamedSubset {
        name: "cube3-edges-b",
        kind: PuzzleKind::Cube3,
        orbit: 0,
        pieces: &[6, 7, 8, 9, 10, 11],
    },
    NamedSubset {
        name: "kilominx-a",
        kind: PuzzleKind::Kilominx,
        orbit: 0,
        pieces: &[0, 1, 2, 3],
    },
    NamedSubset {
        name: "kilominx-b",
        kind: PuzzleKind::Kilominx,
        orbit: 0,
        pieces: &[4, 5, 6, 7],
    },
    NamedSubset {
        name: "kilominx-c",
        kind: PuzzleKind::Kilominx,
        orbit: 0,
        pieces: &[8, 9, 10, 11],
    },
    NamedSubset {
        name: "kilominx-d",
        kind: PuzzleKind::Kilominx,
        orbit: 0,
        pieces: &[12, 13, 14, 15],
    },
    NamedSubset {
        name: "kilominx-e",
        kind: PuzzleKind::Kilominx,
        orbit: 0,
        pieces: &[16, 17, 18],
    },
];

impl PuzzleKind {
    #[must_use]
    pub fn description(self) -> &'static PuzzleDescription {
        match self {
            PuzzleKind::Cube3 => &CUBE3,
            PuzzleKind::Kilominx => &KILOMINX,
        }
    }

    /// Every catalog entry for this puzzle.
    pub fn subsets(self) -> impl Iterator<Item = &'static NamedSubset> {
        CATALOG
            .iter()
            .filter(move |named_subset| named_subset.kind == self)
    }
}

impl NamedSubset {
    /// # Errors
    ///
    /// If `puzzle_def` is not the puzzle this entry belongs to.
    pub fn subset<const N: usize>(&self, puzzle_def: &PuzzleDef<N>) -> Result<Subset<N>, SubsetError> {
        let expected = self.kind.description().name;
        if puzzle_def.name != expected {
            return Err(SubsetError::PuzzleMismatch {
                expected,
                actual: puzzle_def.name,
            });
        }
        Subset::new(puzzle_def, self.orbit, self.pieces)
    }

    /// Build this entry's table, picking a strategy from its size unless one
    /// is given.
    ///
    /// # Errors
    ///
    /// If the subset is invalid or the table does not fit in memory.
    pub fn build<const N: usize>(
        &self,
        puzzle_def: &PuzzleDef<N>,
        strategy: Option<BuildStrategy>,
    ) -> Result<PatternDatabase<N>, PatternDatabaseError> {
        let subset = self.subset(puzzle_def)?;
        let strategy = strategy.unwrap_or_else(|| BuildStrategy::for_size(subset.cardinality()));
        PatternDatabase::build(puzzle_def, subset, strategy)
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.pdb", self.name)
    }
}

#[must_use]
pub fn find(name: &str) -> Option<&'static NamedSubset> {
    CATALOG.iter().find(|named_subset| named_subset.name == name)
}

/// Load every catalog table of the puzzle from `dir`.
///
/// # Errors
///
/// If any table is missing or malformed.
pub fn load_all<const N: usize>(
    puzzle_def: &PuzzleDef<N>,
    kind: PuzzleKind,
    dir: impl AsRef<Path>,
) -> Result<Vec<PatternDatabase<N>>, PatternDatabaseError> {
    kind.subsets()
        .map(|named_subset| {
            PatternDatabase::load(
                named_subset.subset(puzzle_def)?,
                dir.as_ref().join(named_subset.file_name()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{cube3, kilominx};
    use itertools::Itertools;

    #[test]
    fn test_catalog_subsets_are_valid() {
        let cube3_def = PuzzleDef::<{ cube3::PIECE_COUNT }>::new(&CUBE3).unwrap();
        let kilominx_def = PuzzleDef::<{ kilominx::PIECE_COUNT }>::new(&KILOMINX).unwrap();
        for named_subset in CATALOG {
            let cardinality = match named_subset.kind {
                PuzzleKind::Cube3 => named_subset.subset(&cube3_def).unwrap().cardinality(),
                PuzzleKind::Kilominx => named_subset.subset(&kilominx_def).unwrap().cardinality(),
            };
            assert!(cardinality > 0);
        }
        assert!(CATALOG.iter().map(|named_subset| named_subset.name).all_unique());
    }

    #[test]
    fn test_cardinalities() {
        let cube3_def = PuzzleDef::<{ cube3::PIECE_COUNT }>::new(&CUBE3).unwrap();
        let corners = find("cube3-corners").unwrap().subset(&cube3_def).unwrap();
        assert_eq!(corners.cardinality(), 88_179_840);
        let edges = find("cube3-edges-b").unwrap().subset(&cube3_def).unwrap();
        assert_eq!(edges.cardinality(), 42_577_920);

        let kilominx_def = PuzzleDef::<{ kilominx::PIECE_COUNT }>::new(&KILOMINX).unwrap();
        let kilominx_a = find("kilominx-a").unwrap().subset(&kilominx_def).unwrap();
        assert_eq!(kilominx_a.cardinality(), 93_024 * 81);
        assert_eq!(
            BuildStrategy::for_size(kilominx_a.cardinality()),
            BuildStrategy::LevelOrder
        );
    }

    #[test]
    fn test_wrong_puzzle() {
        let cube3_def = PuzzleDef::<{ cube3::PIECE_COUNT }>::new(&CUBE3).unwrap();
        assert_eq!(
            find("kilominx-e").unwrap().subset(&cube3_def).unwrap_err(),
            SubsetError::PuzzleMismatch {
                expected: KILOMINX.name,
                actual: CUBE3.name,
            }
        );
        assert!(find("kilominx-f").is_none());
        assert_eq!(PuzzleKind::Kilominx.subsets().count(), 5);
    }

    #[test]
    fn test_load_all_missing() {
        let cube3_def = PuzzleDef::<{ cube3::PIECE_COUNT }>::new(&CUBE3).unwrap();
        let dir = std::env::temp_dir().join("kubie_solver_missing_tables");
        assert!(matches!(
            load_all(&cube3_def, PuzzleKind::Cube3, dir),
            Err(PatternDatabaseError::Io(_))
        ));
    }
}
