//! The 3x3x3 cube: 12 edges and 8 corners turned by six faces.
//!
//! Slots follow the usual cubie numbering (`UR UF UL UB DR DF DL DB FR FL BL
//! BR` for edges, then `URF UFL ULB UBR DFR DLF DBL DRB` for corners). Each
//! piece lists its faces clockwise starting from the U/D face, or from the F/B
//! face for the middle layer edges.

use super::{OrbitDescription, PuzzleDescription};

pub const PIECE_COUNT: usize = 20;

pub const U: u8 = 0;
pub const R: u8 = 1;
pub const F: u8 = 2;
pub const D: u8 = 3;
pub const L: u8 = 4;
pub const B: u8 = 5;

pub static CUBE3: PuzzleDescription = PuzzleDescription {
    name: "3x3x3",
    faces: &["U", "R", "F", "D", "L", "B"],
    orbits: &[
        OrbitDescription {
            name: "edges",
            start: 0,
            len: 12,
            orientation_count: 2,
        },
        OrbitDescription {
            name: "corners",
            start: 12,
            len: 8,
            orientation_count: 3,
        },
    ],
    piece_faces: &[
        &[U, R],
        &[U, F],
        &[U, L],
        &[U, B],
        &[D, R],
        &[D, F],
        &[D, L],
        &[D, B],
        &[F, R],
        &[F, L],
        &[B, L],
        &[B, R],
        &[U, R, F],
        &[U, F, L],
        &[U, L, B],
        &[U, B, R],
        &[D, F, R],
        &[D, L, F],
        &[D, B, L],
        &[D, R, B],
    ],
    turns: &[
        &[&[0, 1, 2, 3], &[12, 13, 14, 15]],
        &[&[0, 11, 4, 8], &[12, 15, 19, 16]],
        &[&[1, 8, 5, 9], &[12, 16, 17, 13]],
        &[&[4, 7, 6, 5], &[16, 19, 18, 17]],
        &[&[2, 9, 6, 10], &[13, 17, 18, 14]],
        &[&[3, 10, 7, 11], &[14, 18, 19, 15]],
    ],
    turn_order: 4,
    fixed_slots: &[],
};
