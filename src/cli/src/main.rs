#![warn(clippy::pedantic)]

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum, builder::PossibleValuesParser};
use color_eyre::eyre::{OptionExt, WrapErr, eyre};
use env_logger::TimestampPrecision;
use kubie_solver::{
    catalog::{self, NamedSubset, PuzzleKind},
    pruning::BuildStrategy,
    puzzle::{PuzzleDef, cube3, kilominx},
};
use log::{LevelFilter, info, warn};

/// Builds the pattern databases used by the optimal solver
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Which database to build
    #[arg(value_parser = PossibleValuesParser::new(
        catalog::CATALOG.iter().map(|named_subset| named_subset.name)
    ))]
    database: String,

    /// The directory to write the database to
    #[arg(long, short, default_value = ".")]
    out_dir: PathBuf,

    /// How to search; picked from the table size by default
    #[arg(long, short)]
    strategy: Option<Strategy>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    LevelOrder,
    IterativeDeepening,
}

impl From<Strategy> for BuildStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::LevelOrder => BuildStrategy::LevelOrder,
            Strategy::IterativeDeepening => BuildStrategy::IterativeDeepening,
        }
    }
}

fn build_and_save<const N: usize>(
    puzzle_def: &PuzzleDef<N>,
    named_subset: &NamedSubset,
    strategy: Option<BuildStrategy>,
    out_dir: &Path,
) -> color_eyre::Result<()> {
    let pattern_database = named_subset.build(puzzle_def, strategy)?;

    let distribution = pattern_database.distribution();
    for (distance, count) in distribution.iter().enumerate() {
        info!("{distance:>3} moves: {count}");
    }
    if !pattern_database.is_saturated() {
        warn!(
            "{} entries were never reached",
            pattern_database.len() - distribution.iter().sum::<u64>()
        );
    }

    let path = out_dir.join(named_subset.file_name());
    pattern_database
        .save(&path)
        .wrap_err_with(|| format!("Could not write {}", path.display()))?;
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .parse_default_env()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let named_subset = catalog::find(&cli.database).ok_or_eyre("Unknown database")?;
    if !cli.out_dir.is_dir() {
        return Err(eyre!("{} is not a directory", cli.out_dir.display()));
    }
    let strategy = cli.strategy.map(BuildStrategy::from);

    match named_subset.kind {
        PuzzleKind::Cube3 => {
            let puzzle_def =
                PuzzleDef::<{ cube3::PIECE_COUNT }>::new(named_subset.kind.description())?;
            build_and_save(&puzzle_def, named_subset, strategy, &cli.out_dir)
        }
        PuzzleKind::Kilominx => {
            let puzzle_def =
                PuzzleDef::<{ kilominx::PIECE_COUNT }>::new(named_subset.kind.description())?;
            build_and_save(&puzzle_def, named_subset, strategy, &cli.out_dir)
        }
    }
}
