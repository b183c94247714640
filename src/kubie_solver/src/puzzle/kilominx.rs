//! The kilominx: the twenty corners of a dodecahedron turned by its twelve
//! faces. Corner 19 (between `D`, `DB` and `DBL`) is held fixed so that whole
//! puzzle rotations are factored out, leaving nine turnable faces.
//!
//! Slots run around the `U` face first, then the upper and lower belts, then
//! the `D` face.

use super::{OrbitDescription, PuzzleDescription};

pub const PIECE_COUNT: usize = 20;

const U: u8 = 0;
const F: u8 = 1;
const R: u8 = 2;
const BR: u8 = 3;
const BL: u8 = 4;
const L: u8 = 5;
const D: u8 = 6;
const DB: u8 = 7;
const DBL: u8 = 8;
const DBR: u8 = 9;
const DL: u8 = 10;
const DR: u8 = 11;

pub static KILOMINX: PuzzleDescription = PuzzleDescription {
    name: "kilominx",
    faces: &[
        "U", "F", "R", "BR", "BL", "L", "D", "DB", "DBL", "DBR", "DL", "DR",
    ],
    orbits: &[OrbitDescription {
        name: "corners",
        start: 0,
        len: 20,
        orientation_count: 3,
    }],
    piece_faces: &[
        &[U, R, F],
        &[U, BR, R],
        &[U, BL, BR],
        &[U, L, BL],
        &[U, F, L],
        &[F, R, DR],
        &[R, BR, DBR],
        &[BR, BL, DB],
        &[BL, L, DBL],
        &[F, DL, L],
        &[F, DR, DL],
        &[R, DBR, DR],
        &[BR, DB, DBR],
        &[BL, DBL, DB],
        &[L, DL, DBL],
        &[D, DL, DR],
        &[D, DR, DBR],
        &[D, DBR, DB],
        &[D, DBL, DL],
        &[D, DB, DBL],
    ],
    turns: &[
        &[&[0, 4, 3, 2, 1]],
        &[&[0, 5, 10, 9, 4]],
        &[&[0, 1, 6, 11, 5]],
        &[&[1, 2, 7, 12, 6]],
        &[&[2, 3, 8, 13, 7]],
        &[&[3, 4, 9, 14, 8]],
        &[&[15, 16, 17, 19, 18]],
        &[&[7, 13, 19, 17, 12]],
        &[&[8, 14, 18, 19, 13]],
        &[&[6, 12, 17, 16, 11]],
        &[&[9, 10, 15, 18, 14]],
        &[&[5, 11, 16, 15, 10]],
    ],
    turn_order: 5,
    fixed_slots: &[19],
};
