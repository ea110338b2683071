use thiserror::Error;

use crate::core::{Colour, Square};

/******************************************\
|==========================================|
|                  Piece                   |
|==========================================|
\******************************************/

/// # Piece representation
///
/// - A coloured piece kind, laid out so that `index >> 1` is the type and `index & 1` the colour

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    WhitePawn, BlackPawn, WhiteKnight, BlackKnight, WhiteBishop, BlackBishop, WhiteRook, BlackRook, WhiteQueen, BlackQueen, WhiteKing, BlackKing
}

impl Piece {
    /// Number of elements in the Piece enum
    pub const NUM: usize = 12;
}

crate::impl_from_to_primitive!(Piece);
crate::impl_enum_iter!(Piece);

/******************************************\
|==========================================|
|                Piece Type                |
|==========================================|
\******************************************/

/// # Piece Type representation

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
   Pawn, Knight, Bishop, Rook, Queen, King,
}

impl PieceType {
    /// Number of elements in the PieceType enum
    pub const NUM: usize = 6;

    /// Piece types a pawn may promote to
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];
}

crate::impl_from_to_primitive!(PieceType);
crate::impl_enum_iter!(PieceType);

/******************************************\
|==========================================|
|                   Man                    |
|==========================================|
\******************************************/

/// # Man
///
/// One piece standing on the board. `identity` is the square the man stood on
/// when the game started (or when it was set up), and survives promotion so a
/// queened pawn can still be traced back to its starting file.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Man {
    pub piece: Piece,
    pub identity: Square,
}

/******************************************\
|==========================================|
|              Implementation              |
|==========================================|
\******************************************/

impl Piece {
    /// Returns the piece type of the piece
    pub const fn pt(self) -> PieceType {
        unsafe { PieceType::from_unchecked(self as u8 >> 1) }
    }

    /// Returns the colour of the piece
    pub const fn colour(self) -> Colour {
        unsafe { Colour::from_unchecked(self as u8 & 1) }
    }

    /// Combines a colour and piece type pair to create a piece
    pub const fn from_parts(colour: Colour, piece_type: PieceType) -> Self {
        unsafe { Piece::from_unchecked(colour as u8 | (piece_type as u8) << 1) }
    }
}

impl PieceType {
    /// Parses an uppercase SAN piece letter (`N`, `B`, `R`, `Q`, `K`); pawns have no letter
    #[inline]
    pub const fn from_san_byte(b: u8) -> Option<Self> {
        match b {
            b'N' => Some(PieceType::Knight),
            b'B' => Some(PieceType::Bishop),
            b'R' => Some(PieceType::Rook),
            b'Q' => Some(PieceType::Queen),
            b'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Uppercase letter of the piece type (`P` for pawns)
    pub const fn to_char(self) -> char {
        PIECE_STR.as_bytes()[(self as usize) << 1] as char
    }

    /// Whether the piece slides along lines
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }
}

impl Man {
    pub const fn new(piece: Piece, identity: Square) -> Self {
        Self { piece, identity }
    }

    /// The man after promotion: new piece, same identity
    pub const fn promoted(self, to: PieceType) -> Self {
        Self {
            piece: Piece::from_parts(self.piece.colour(), to),
            identity: self.identity,
        }
    }

    #[inline]
    pub const fn colour(&self) -> Colour {
        self.piece.colour()
    }

    #[inline]
    pub const fn pt(&self) -> PieceType {
        self.piece.pt()
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

/// Letters of the pieces in `Piece` index order
const PIECE_STR: &str = "PpNnBbRrQqKk";

impl std::fmt::Display for Piece {
    /// FEN letter: uppercase for White, lowercase for Black
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", PIECE_STR.as_bytes()[self.index()] as char)
    }
}

impl std::fmt::Display for PieceType {
    /// SAN letter of the piece type
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/******************************************\
|==========================================|
|                Parse Piece               |
|==========================================|
\******************************************/

impl std::str::FromStr for Piece {
    type Err = ParsePieceError;

    /// Parse a FEN piece letter
    ///
    /// ## Examples
    ///
    /// ```
    /// use pgn::core::Piece;
    ///
    /// assert_eq!("k".parse::<Piece>().unwrap(), Piece::BlackKing);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(piece_char), None) = (chars.next(), chars.next()) else {
            return Err(ParsePieceError::InvalidLength(s.len()));
        };
        Piece::from_fen_char(piece_char).ok_or(ParsePieceError::InvalidChar(piece_char))
    }
}

impl Piece {
    /// Parse a FEN piece letter without allocating
    pub fn from_fen_char(c: char) -> Option<Self> {
        PIECE_STR
            .chars()
            .position(|p| p == c)
            .and_then(|index| Piece::from_index(index as u8))
    }
}

/******************************************\
|==========================================|
|            Piece Parse Error             |
|==========================================|
\******************************************/

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePieceError {
    #[error("Invalid length for piece string: {0}, expected 1")]
    InvalidLength(usize),
    #[error("Invalid character for piece string: '{0}', expected one of PNBRQK or pnbrqk")]
    InvalidChar(char),
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
