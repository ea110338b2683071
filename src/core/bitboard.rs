use std::fmt;

use super::{File, Rank, Square};

/******************************************\
|==========================================|
|                 Bitboard                 |
|==========================================|
\******************************************/

/// A set of squares packed into 64 bits, A1 (LSB) to H8 (MSB).
///
/// The position engine keeps one per colour for occupancy, and the geometry
/// tables store move sets and between-masks in this form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

crate::impl_bit_ops!(Bitboard);

/******************************************\
|==========================================|
|           Bitboard Constants             |
|==========================================|
\******************************************/

impl Bitboard {
    /// An empty bitboard, with no bits set.
    pub const EMPTY: Bitboard = Bitboard(0);

    /// A full bitboard, with all 64 bits set.
    pub const FULL: Bitboard = Bitboard(!0);

    /// All squares on the 1st rank.
    pub const RANK_1: Bitboard = Bitboard(0x00000000000000ff);

    /// All squares on the 8th rank.
    pub const RANK_8: Bitboard = Bitboard(0xff00000000000000);

    /// All squares on the A file.
    pub const FILE_A: Bitboard = Bitboard(0x0101010101010101);
}

/******************************************\
|==========================================|
|                Conversions               |
|==========================================|
\******************************************/

impl Square {
    /// Converts a `Square` into a `Bitboard` with only that square's bit set.
    pub const fn bb(&self) -> Bitboard {
        Bitboard(1u64 << *self as u8)
    }
}

impl Rank {
    /// All squares on the rank.
    pub const fn bb(&self) -> Bitboard {
        Bitboard(Bitboard::RANK_1.0 << (8 * *self as u8))
    }
}

impl File {
    /// All squares on the file.
    pub const fn bb(&self) -> Bitboard {
        Bitboard(Bitboard::FILE_A.0 << *self as u8)
    }
}

impl<const N: usize> From<[Square; N]> for Bitboard {
    fn from(squares: [Square; N]) -> Bitboard {
        squares.into_iter().collect()
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        let mut bb = Bitboard::EMPTY;
        for square in iter {
            bb.set(square);
        }
        bb
    }
}

/******************************************\
|==========================================|
|         Bitboard Implementation          |
|==========================================|
\******************************************/

impl Bitboard {
    /// The lowest set square, or `None` if empty
    ///
    /// ## Examples
    /// ```rust
    /// use pgn::core::{Square, Bitboard};
    /// assert_eq!((Square::A1.bb() | Square::H8.bb()).lsb(), Some(Square::A1));
    /// assert_eq!(Bitboard::EMPTY.lsb(), None);
    /// ```
    #[inline]
    pub const fn lsb(&self) -> Option<Square> {
        match self.0 {
            0 => None,
            bits => Some(unsafe { Square::from_unchecked(bits.trailing_zeros() as u8) }),
        }
    }

    /// Removes the lowest set square and returns it
    #[inline]
    pub const fn pop_lsb(&mut self) -> Option<Square> {
        let lsb = self.lsb();
        if self.0 != 0 {
            self.0 &= self.0 - 1;
        }
        lsb
    }

    /// Population count
    #[inline]
    pub const fn count_bits(&self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// More than one square set
    #[inline]
    pub const fn more_than_one(&self) -> bool {
        self.0 & (self.0.wrapping_sub(1)) != 0
    }

    #[inline]
    pub const fn contains(&self, square: Square) -> bool {
        (self.0 & (1u64 << square as u8)) != 0
    }

    #[inline]
    pub const fn set(&mut self, square: Square) {
        self.0 |= 1u64 << square as u8;
    }

    #[inline]
    pub const fn clear(&mut self, square: Square) {
        self.0 &= !(1u64 << square as u8);
    }
}

impl std::ops::Not for Bitboard {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl Iterator for Bitboard {
    type Item = Square;

    /// Drains squares lowest first; iterate a copy to keep the original
    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.pop_lsb()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count_bits() as usize;
        (n, Some(n))
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SEPARATOR: &str = "\n     +---+---+---+---+---+---+---+---+";

        writeln!(f, "{}", SEPARATOR)?;

        for rank in Rank::iter().rev() {
            write!(f, " {}   |", rank)?;

            for file in File::iter() {
                let cell = if self.contains(Square::from_parts(file, rank)) { " 1 " } else { "   " };
                write!(f, "{}|", cell)?;
            }

            writeln!(f, "{}", SEPARATOR)?;
        }

        writeln!(f)?;
        writeln!(f, "       A   B   C   D   E   F   G   H")?;
        writeln!(f)?;
        writeln!(f, "Bitboard: {:#x}", self.0)
    }
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
    fn test_lsb_and_pop() {
        let mut bb = Square::E4.bb() | Square::A1.bb();
        assert_eq!(bb.lsb(), Some(Square::A1));
        assert_eq!(bb.pop_lsb(), Some(Square::A1));
        assert_eq!(bb.pop_lsb(), Some(Square::E4));
        assert_eq!(bb.pop_lsb(), None);
        assert!(bb.is_empty());
    }

    #[test]
    fn test_count_and_more_than_one() {
        assert_eq!(Bitboard::EMPTY.count_bits(), 0);
        assert_eq!(Bitboard::FULL.count_bits(), 64);
        assert!(!Square::E4.bb().more_than_one());
        assert!((Square::E4.bb() | Square::D5.bb()).more_than_one());
    }

    #[test]
    fn test_set_clear_contains() {
        let mut bb = Bitboard::EMPTY;
        bb.set(Square::E4);
        assert!(bb.contains(Square::E4));
        assert!(!bb.contains(Square::A1));
        bb.clear(Square::E4);
        assert!(bb.is_empty());
    }

    #[test]
    fn test_iteration_order() {
        let bb = Bitboard::from([Square::H8, Square::D5, Square::B1]);
        let squares: Vec<Square> = bb.collect();
        assert_eq!(squares, vec![Square::B1, Square::D5, Square::H8]);

        let mut seen = Vec::new();
        for sq in bb {
            seen.push(sq);
        }
        assert_eq!(seen, squares);
        assert_eq!(bb.count_bits(), 3);
    }

    #[test]
    fn test_rank_and_file_masks() {
        assert_eq!(Rank::Rank1.bb(), Bitboard::RANK_1);
        assert_eq!(Rank::Rank8.bb(), Bitboard::RANK_8);
        assert_eq!(File::FileA.bb(), Bitboard::FILE_A);
        assert_eq!(File::FileC.bb().count_bits(), 8);
        assert!(File::FileC.bb().contains(Square::C7));
        assert_eq!(Rank::Rank4.bb() & File::FileE.bb(), Square::E4.bb());
        assert_eq!(!Bitboard::EMPTY, Bitboard::FULL);
    }
}
