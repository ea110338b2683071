use super::{Rank, Square};
use thiserror::Error;

/******************************************\
|==========================================|
|                 Colours                  |
|==========================================|
\******************************************/

/// # Colour Representation
///
/// Represents the two colours in chess: White and Black.

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    White,
    Black
}

impl Colour {
    /// Number of elements in the Colour enum
    pub const NUM: usize = 2;
}

crate::impl_from_to_primitive!(Colour);
crate::impl_enum_iter!(Colour);

/******************************************\
|==========================================|
|                 Direction                |
|==========================================|
\******************************************/

/// # Direction Representation
///
/// The eight sliding directions, as (file, rank) steps

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N, S, E, W,
    NE, NW, SE, SW,
}

impl Direction {
    /// Number of elements in the Direction enum
    pub const NUM: usize = 8;
}

crate::impl_from_to_primitive!(Direction);
crate::impl_enum_iter!(Direction);

/******************************************\
|==========================================|
|                 Castling                 |
|==========================================|
\******************************************/

/// # Castling Representation
///
/// Castling availability as a 4 bit set, `WK | WQ | BK | BQ`

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Castling(pub u8);

impl Default for Castling {
    fn default() -> Self {
        Castling::ALL
    }
}

crate::impl_bit_ops!(Castling);

/// The wing a king castles towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

/******************************************\
|==========================================|
|              Implementation              |
|==========================================|
\******************************************/

impl Colour {
    /// Rank step of a pawn push for this colour
    pub const fn forward(&self) -> i8 {
        match self {
            Colour::White => 1,
            Colour::Black => -1,
        }
    }

    /// Rank pawns of this colour start on
    pub const fn pawn_rank(&self) -> Rank {
        Rank::Rank2.relative(*self)
    }

    /// Rank pawns of this colour promote on
    pub const fn promotion_rank(&self) -> Rank {
        Rank::Rank8.relative(*self)
    }

    /// FEN letter of the colour (`w` or `b`)
    pub const fn fen_char(&self) -> char {
        match self {
            Colour::White => 'w',
            Colour::Black => 'b',
        }
    }
}

impl std::ops::Not for Colour {
    type Output = Self;

    /// Returns the opposite colour
    fn not(self) -> Self::Output {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }
}

impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colour::White => write!(f, "White"),
            Colour::Black => write!(f, "Black"),
        }
    }
}

impl Direction {
    /// The (file, rank) step of the direction
    pub const fn delta(&self) -> (i8, i8) {
        match self {
            Direction::N => (0, 1),
            Direction::S => (0, -1),
            Direction::E => (1, 0),
            Direction::W => (-1, 0),
            Direction::NE => (1, 1),
            Direction::NW => (-1, 1),
            Direction::SE => (1, -1),
            Direction::SW => (-1, -1),
        }
    }

    /// Whether the direction runs along a rank or file (rook line)
    pub const fn is_orthogonal(&self) -> bool {
        matches!(self, Direction::N | Direction::S | Direction::E | Direction::W)
    }

    /// Try to get the direction from one square towards another on a shared line
    pub const fn try_from(from: Square, to: Square) -> Option<Self> {
        if from as u8 == to as u8 {
            return None;
        }

        let rank_dist = (to.rank() as i8) - (from.rank() as i8);
        let file_dist = (to.file() as i8) - (from.file() as i8);

        match (rank_dist, file_dist) {
            (0, i) if i < 0 => Some(Direction::W),
            (0, _) => Some(Direction::E),
            (i, 0) if i > 0 => Some(Direction::N),
            (_, 0) => Some(Direction::S),

            (i, j) if i == j && i < 0 => Some(Direction::SW),
            (i, j) if i == j => Some(Direction::NE),
            (i, j) if i == -j && i > 0 => Some(Direction::NW),
            (i, j) if i == -j => Some(Direction::SE),

            _ => None,
        }
    }
}

impl std::ops::Neg for Direction {
    type Output = Self;

    /// Negate the direction (N => S, etc...)
    fn neg(self) -> Self::Output {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::E => Direction::W,
            Direction::W => Direction::E,
            Direction::NE => Direction::SW,
            Direction::SW => Direction::NE,
            Direction::NW => Direction::SE,
            Direction::SE => Direction::NW,
        }
    }
}

impl Square {
    /// Try to step one square in a direction
    #[inline]
    pub const fn add(self, rhs: Direction) -> Result<Self, SquareAddError> {
        let (df, dr) = rhs.delta();
        match self.offset(df, dr) {
            Some(sq) => Ok(sq),
            None => Err(SquareAddError::OutOfBounds),
        }
    }
}

impl Castling {
    // Atomic castling rights
    pub const WK: Castling = Castling(1);
    pub const WQ: Castling = Castling(2);
    pub const BK: Castling = Castling(4);
    pub const BQ: Castling = Castling(8);
    // Board colour castling rights
    pub const WHITE_CASTLING: Castling = Castling(3);
    pub const BLACK_CASTLING: Castling = Castling(12);
    // All or nothing castling rights
    pub const ALL: Castling = Castling(15);
    pub const NONE: Castling = Castling(0);

    /// Whether any of the rights in `right` are held
    pub fn has(self, right: Castling) -> bool {
        self & right != Castling::NONE
    }

    /// Add castling rights
    pub fn set(&mut self, right: Castling) {
        *self |= right;
    }

    /// Remove castling rights
    pub fn remove(&mut self, right: Castling) {
        *self &= !right;
    }

    /// Keep only the rights in `mask`
    #[inline]
    pub fn mask(&mut self, mask: Castling) {
        self.0 &= mask.0;
    }

    /// The single right for a colour castling towards `side`
    #[inline]
    pub const fn right(colour: Colour, side: CastleSide) -> Self {
        match (colour, side) {
            (Colour::White, CastleSide::King) => Castling::WK,
            (Colour::White, CastleSide::Queen) => Castling::WQ,
            (Colour::Black, CastleSide::King) => Castling::BK,
            (Colour::Black, CastleSide::Queen) => Castling::BQ,
        }
    }

    /// Both rights of a colour
    #[inline]
    pub const fn colour(colour: Colour) -> Self {
        match colour {
            Colour::White => Castling::WHITE_CASTLING,
            Colour::Black => Castling::BLACK_CASTLING,
        }
    }
}

impl std::ops::Not for Castling {
    type Output = Self;

    /// Invert the bits to give the opposite castling rights
    #[inline]
    fn not(self) -> Self::Output {
        Castling(!self.0 & 0x0F)
    }
}

impl std::fmt::Display for Castling {
    /// Displays castling rights as the FEN field (`KQkq` subset or `-`)
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }

        for (right, c) in [
            (Castling::WK, 'K'),
            (Castling::WQ, 'Q'),
            (Castling::BK, 'k'),
            (Castling::BQ, 'q'),
        ] {
            if self.has(right) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

impl CastleSide {
    /// File the king lands on
    pub const fn king_to_file(&self) -> super::File {
        match self {
            CastleSide::King => super::File::FileG,
            CastleSide::Queen => super::File::FileC,
        }
    }

    /// File the rook starts on
    pub const fn rook_from_file(&self) -> super::File {
        match self {
            CastleSide::King => super::File::FileH,
            CastleSide::Queen => super::File::FileA,
        }
    }

    /// File the rook lands on
    pub const fn rook_to_file(&self) -> super::File {
        match self {
            CastleSide::King => super::File::FileF,
            CastleSide::Queen => super::File::FileD,
        }
    }
}

impl std::fmt::Display for CastleSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CastleSide::King => write!(f, "O-O"),
            CastleSide::Queen => write!(f, "O-O-O"),
        }
    }
}

/******************************************\
|==========================================|
|             Square Add Errors            |
|==========================================|
\******************************************/

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareAddError {
    #[error("Square operation resulted in an out-of-bounds position")]
    OutOfBounds,
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_directions() {
        assert_eq!(Direction::try_from(Square::E4, Square::E5), Some(Direction::N));
        assert_eq!(Direction::try_from(Square::E4, Square::E3), Some(Direction::S));
        assert_eq!(Direction::try_from(Square::E4, Square::F4), Some(Direction::E));
        assert_eq!(Direction::try_from(Square::E4, Square::D4), Some(Direction::W));
        assert_eq!(Direction::try_from(Square::E4, Square::F5), Some(Direction::NE));
        assert_eq!(Direction::try_from(Square::E4, Square::D5), Some(Direction::NW));
        assert_eq!(Direction::try_from(Square::E4, Square::F3), Some(Direction::SE));
        assert_eq!(Direction::try_from(Square::E4, Square::D3), Some(Direction::SW));
    }

    #[test]
    fn test_distant_and_missing_directions() {
        assert_eq!(Direction::try_from(Square::A1, Square::H8), Some(Direction::NE));
        assert_eq!(Direction::try_from(Square::A8, Square::H1), Some(Direction::SE));
        assert_eq!(Direction::try_from(Square::G8, Square::C8), Some(Direction::W));
        assert_eq!(Direction::try_from(Square::E4, Square::F6), None);
        assert_eq!(Direction::try_from(Square::E4, Square::E4), None);
    }

    #[test]
    fn test_neg_and_add() {
        for dir in Direction::iter() {
            let (df, dr) = dir.delta();
            let (nf, nr) = (-dir).delta();
            assert_eq!((df, dr), (-nf, -nr));
        }
        assert_eq!(Square::E4.add(Direction::NE), Ok(Square::F5));
        assert_eq!(Square::H4.add(Direction::E), Err(SquareAddError::OutOfBounds));
    }

    #[test]
    fn test_castling_display() {
        assert_eq!(Castling::ALL.to_string(), "KQkq");
        assert_eq!(Castling::NONE.to_string(), "-");
        assert_eq!((Castling::WQ | Castling::BK).to_string(), "Qk");
    }

    #[test]
    fn test_castling_set_remove() {
        let mut rights = Castling::ALL;
        rights.remove(Castling::colour(Colour::White));
        assert_eq!(rights, Castling::BLACK_CASTLING);
        rights.set(Castling::right(Colour::White, CastleSide::Queen));
        assert!(rights.has(Castling::WQ));
        assert!(!rights.has(Castling::WK));
        rights.mask(Castling::WQ | Castling::BQ);
        assert_eq!(rights.to_string(), "Qq");
    }

    #[test]
    fn test_colour_helpers() {
        assert_eq!(!Colour::White, Colour::Black);
        assert_eq!(Colour::Black.pawn_rank(), Rank::Rank7);
        assert_eq!(Colour::Black.promotion_rank(), Rank::Rank1);
        assert_eq!(Colour::White.forward(), 1);
    }
}
