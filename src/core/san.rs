use super::{File, PieceType, Rank, Square};

/******************************************\
|==========================================|
|                 San Move                 |
|==========================================|
\******************************************/

/// # San Move
///
/// A move as written in the movetext, matched structurally but not yet
/// checked against a board: the piece kind, any source file or rank given,
/// whether a capture was marked, the destination and the promotion piece.
///
/// Long algebraic moves such as `Ng1f3` fill in both `file` and `rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SanMove {
    pub piece: PieceType,
    pub file: Option<File>,
    pub rank: Option<Rank>,
    pub capture: bool,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl SanMove {
    /// A move with no source hint, capture mark or promotion
    pub const fn new(piece: PieceType, to: Square) -> Self {
        Self {
            piece,
            file: None,
            rank: None,
            capture: false,
            to,
            promotion: None,
        }
    }

    /// Whether `sq` agrees with the file and rank given as source hint
    #[inline]
    pub fn hint_matches(&self, sq: Square) -> bool {
        self.file.is_none_or(|f| f == sq.file()) && self.rank.is_none_or(|r| r == sq.rank())
    }

    /// Whether the move names a source square on another file than its destination
    #[inline]
    pub fn changes_file(&self) -> bool {
        self.file.is_some_and(|f| f != self.to.file())
    }
}

impl std::fmt::Display for SanMove {
    /// Standard algebraic form of the move, without check marks
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.piece != PieceType::Pawn {
            write!(f, "{}", self.piece)?;
        }
        if let Some(file) = self.file {
            write!(f, "{}", file)?;
        }
        if let Some(rank) = self.rank {
            write!(f, "{}", rank)?;
        }
        if self.capture {
            write!(f, "x")?;
        }
        write!(f, "{}", self.to)?;
        if let Some(pt) = self.promotion {
            write!(f, "={}", pt)?;
        }
        Ok(())
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
