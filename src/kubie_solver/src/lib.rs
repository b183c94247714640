#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::cast_possible_truncation,
    clippy::module_name_repetitions
)]

//! Optimal solving of twisty permutation puzzles with pattern databases.
//!
//! The crate is organised bottom-up: [`puzzle`] holds the slot array and the
//! move model, [`encoder`] ranks partial permutations, [`pruning`] builds and
//! queries pattern databases, and [`solver`] runs IDA* on top of them.

pub mod catalog;
pub mod coloring;
pub mod encoder;
pub mod pruning;
pub mod puzzle;
pub mod solver;

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

// 20! still fits in a u64 but every place value we need divides (n - 1)!, and
// no orbit has more than 20 movable pieces
const FACT_UNTIL_19: [u64; 20] = {
    let mut arr = [0; 20];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u64;
        i += 1;
    }
    arr
};
