//! # Module: `geometry`
//!
//! Precomputed board geometry shared by the position engine: the line joining
//! two squares, the outward rays of every square, leaper move sets, pawn
//! source tables and the castling rights each square guards.
//!
//! All tables are built once behind `LazyLock` and only read afterwards, so
//! they can be shared freely between threads parsing different games.

mod init;
mod lookup;

use arrayvec::ArrayVec;

use crate::core::{Bitboard, Direction, Square};

pub use lookup::*;

/******************************************\
|==========================================|
|                 Line Kind                |
|==========================================|
\******************************************/

/// The four lines running through a square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    File,
    Rank,
    /// a1-h8 direction
    Diagonal,
    /// a8-h1 direction
    AntiDiagonal,
}

impl LineKind {
    /// The line a direction runs along
    pub const fn of(dir: Direction) -> Self {
        match dir {
            Direction::N | Direction::S => LineKind::File,
            Direction::E | Direction::W => LineKind::Rank,
            Direction::NE | Direction::SW => LineKind::Diagonal,
            Direction::NW | Direction::SE => LineKind::AntiDiagonal,
        }
    }

    /// Whether rooks (and queens) move along this line
    pub const fn is_orthogonal(&self) -> bool {
        matches!(self, LineKind::File | LineKind::Rank)
    }
}

/******************************************\
|==========================================|
|                   Ray                    |
|==========================================|
\******************************************/

/// # Ray
///
/// Two distinct squares sharing a file, rank or diagonal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ray {
    pub kind: LineKind,
    pub direction: Direction,
    pub from: Square,
    pub to: Square,
    /// Squares strictly between `from` and `to`, nearest to `from` first
    pub between: ArrayVec<Square, 6>,
    /// The same squares as a bitboard, for path-clear tests
    pub between_bb: Bitboard,
}

impl Ray {
    /// The `(from, to)` index pair of the ray
    pub const fn indices(&self) -> (usize, usize) {
        (self.from as usize, self.to as usize)
    }

    /// Whether no square in `occupied` stands strictly between the ends
    #[inline]
    pub fn is_clear(&self, occupied: Bitboard) -> bool {
        (self.between_bb & occupied).is_empty()
    }
}
