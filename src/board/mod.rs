pub mod annotate;
pub mod attacks;
pub mod fen;
pub mod mover;
pub mod movement;

pub use annotate::CheckMark;
pub use fen::{FenParseError, START_FEN, SetupError};
pub use mover::MoveError;
pub use movement::{MoveSpec, PositionDelta};

use arrayvec::ArrayVec;

use crate::core::*;

/******************************************\
|==========================================|
|                Constants                 |
|==========================================|
\******************************************/

/// Number of man index lists: 10 non-pawn kinds plus 8 files of pawns per colour
pub const NUM_INDEXES: usize = 26;

/// Most men one index list can hold (two originals plus eight promotions)
pub const MAX_PER_INDEX: usize = 10;

/// Squares of the men in one index list, kept in ascending square order
pub type IndexList = ArrayVec<Square, MAX_PER_INDEX>;

/// The index list a man on `sq` belongs to.
///
/// Knights to kings are keyed by type and colour; pawns by colour and the
/// file they currently stand on, so a pawn capture moves the pawn between lists.
#[inline]
pub const fn index_key(piece: Piece, sq: Square) -> usize {
    match piece.pt() {
        PieceType::Pawn => 10 + piece.colour() as usize * File::NUM + sq.file() as usize,
        pt => (pt as usize - 1) * Colour::NUM + piece.colour() as usize,
    }
}

/******************************************\
|==========================================|
|                Game State                |
|==========================================|
\******************************************/

/// The five FEN fields that are not piece placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    pub active: Colour,
    pub castling: Castling,
    pub en_passant: Option<Square>,
    pub halfmove: u16,
    pub fullmove: u16,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            active: Colour::White,
            castling: Castling::ALL,
            en_passant: None,
            halfmove: 0,
            fullmove: 1,
        }
    }
}

/******************************************\
|==========================================|
|                 Position                 |
|==========================================|
\******************************************/

/// # Position
///
/// Occupancy map, colour bitboards and man index lists for one board, plus
/// its `GameState` and the stack of states replaced by applied moves.
///
/// Every occupied square appears in exactly one index list and every index
/// list entry is occupied by a man of that list's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: [Option<Man>; Square::NUM],

    occupied: [Bitboard; Colour::NUM],

    indexes: [IndexList; NUM_INDEXES],

    state: GameState,

    history: Vec<GameState>,
}

/******************************************\
|==========================================|
|           Basic Implementation           |
|==========================================|
\******************************************/

impl Default for Position {
    fn default() -> Position {
        Position::standard()
    }
}

impl Position {
    /// An empty board with White to move and no castling rights
    pub(crate) fn empty() -> Position {
        Position {
            board: [None; Square::NUM],
            occupied: [Bitboard::EMPTY; Colour::NUM],
            indexes: std::array::from_fn(|_| IndexList::new()),
            state: GameState {
                castling: Castling::NONE,
                ..GameState::default()
            },
            history: Vec::new(),
        }
    }

    /// The standard starting position
    pub fn standard() -> Position {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut pos = Position::empty();
        for colour in Colour::iter() {
            for (file, pt) in File::iter().zip(BACK_RANK) {
                let back = Square::from_parts(file, Rank::Rank1.relative(colour));
                let pawn = Square::from_parts(file, colour.pawn_rank());
                pos.add_man(back, Man::new(Piece::from_parts(colour, pt), back));
                pos.add_man(pawn, Man::new(Piece::from_parts(colour, PieceType::Pawn), pawn));
            }
        }
        pos.state.castling = Castling::ALL;
        pos
    }

    /// Rebuilds a position from an occupancy snapshot and state
    pub fn from_parts(board: &[Option<Man>; Square::NUM], state: GameState) -> Position {
        let mut pos = Position::empty();
        for sq in Square::iter() {
            if let Some(man) = board[sq.index()] {
                pos.add_man(sq, man);
            }
        }
        pos.state = state;
        pos
    }

    #[inline]
    pub fn on(&self, square: Square) -> Option<Man> {
        self.board[square.index()]
    }

    #[inline]
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.on(square).map(|man| man.piece)
    }

    /// The occupancy map, indexed by square
    #[inline]
    pub fn board(&self) -> &[Option<Man>; Square::NUM] {
        &self.board
    }

    #[inline]
    pub fn occupied_bb(&self, colour: Colour) -> Bitboard {
        self.occupied[colour.index()]
    }

    #[inline]
    pub fn all_occupied_bb(&self) -> Bitboard {
        self.occupied_bb(Colour::White) | self.occupied_bb(Colour::Black)
    }

    /// Squares of the men of one kind; pawns are gathered across their eight file lists
    pub fn squares_of(&self, colour: Colour, pt: PieceType) -> Bitboard {
        match pt {
            PieceType::Pawn => File::iter()
                .flat_map(|file| self.pawns_on_file(colour, file).iter().copied())
                .collect(),
            _ => self.index(index_key(Piece::from_parts(colour, pt), Square::A1))
                .iter()
                .copied()
                .collect(),
        }
    }

    /// Squares of `colour` pawns currently on `file`
    #[inline]
    pub fn pawns_on_file(&self, colour: Colour, file: File) -> &[Square] {
        let key = index_key(Piece::from_parts(colour, PieceType::Pawn), Square::from_parts(file, Rank::Rank1));
        self.index(key)
    }

    /// Squares of the men of one non-pawn kind
    #[inline]
    pub fn pieces_of(&self, colour: Colour, pt: PieceType) -> &[Square] {
        debug_assert!(pt != PieceType::Pawn, "pawns are indexed per file");
        self.index(index_key(Piece::from_parts(colour, pt), Square::A1))
    }

    /// One raw index list
    #[inline]
    pub fn index(&self, key: usize) -> &[Square] {
        &self.indexes[key]
    }

    /// Square of the king of `colour`, if there is one
    #[inline]
    pub fn king_square(&self, colour: Colour) -> Option<Square> {
        self.pieces_of(colour, PieceType::King).first().copied()
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn active(&self) -> Colour {
        self.state.active
    }

    #[inline]
    pub fn castling(&self) -> Castling {
        self.state.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.state.en_passant
    }

    /// Number of moves applied and not yet undone
    #[inline]
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Places a man on an empty square, updating bitboards and index lists.
    ///
    /// Low-level helper: the game state is untouched.
    #[inline]
    pub(crate) fn add_man(&mut self, sq: Square, man: Man) {
        debug_assert!(self.on(sq).is_none(), "add_man: {sq} is occupied");
        self.board[sq.index()] = Some(man);
        self.occupied[man.colour().index()].set(sq);

        let list = &mut self.indexes[index_key(man.piece, sq)];
        let at = list.partition_point(|&s| s < sq);
        list.insert(at, sq);
    }

    /// Lifts the man off a square, updating bitboards and index lists.
    ///
    /// Low-level helper: the game state is untouched.
    #[inline]
    pub(crate) fn remove_man(&mut self, sq: Square) -> Option<Man> {
        let man = self.board[sq.index()].take()?;
        self.occupied[man.colour().index()].clear(sq);

        let list = &mut self.indexes[index_key(man.piece, sq)];
        if let Some(at) = list.iter().position(|&s| s == sq) {
            list.remove(at);
        }
        Some(man)
    }

    /// Checks that the occupancy map, colour bitboards and index lists agree.
    ///
    /// Returns a description of the first disagreement found.
    pub fn debug_check_indexes(&self) -> Result<(), String> {
        let mut seen = 0usize;

        for (key, list) in self.indexes.iter().enumerate() {
            if list.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("index list {key} is not sorted: {list:?}"));
            }
            for &sq in list {
                let Some(man) = self.on(sq) else {
                    return Err(format!("index list {key} names empty square {sq}"));
                };
                if index_key(man.piece, sq) != key {
                    return Err(format!("{} on {sq} filed under list {key}", man.piece));
                }
                seen += 1;
            }
        }

        let mut occupied = 0usize;
        for sq in Square::iter() {
            match self.on(sq) {
                Some(man) => {
                    occupied += 1;
                    if !self.occupied_bb(man.colour()).contains(sq) || self.occupied_bb(!man.colour()).contains(sq) {
                        return Err(format!("colour bitboards disagree on {sq}"));
                    }
                }
                None if self.all_occupied_bb().contains(sq) => {
                    return Err(format!("bitboard marks empty square {sq}"));
                }
                None => {}
            }
        }

        match seen == occupied {
            true => Ok(()),
            false => Err(format!("{occupied} men on the board but {seen} indexed")),
        }
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SEPARATOR: &str = "\n     +---+---+---+---+---+---+---+---+";

        writeln!(f, "{}", SEPARATOR)?;

        for rank in Rank::iter().rev() {
            write!(f, " {}   |", rank)?;

            for file in File::iter() {
                match self.piece_on(Square::from_parts(file, rank)) {
                    Some(piece) => write!(f, " {} |", piece)?,
                    None => write!(f, "   |")?,
                }
            }

            writeln!(f, "{}", SEPARATOR)?;
        }

        writeln!(f)?;
        writeln!(f, "       A   B   C   D   E   F   G   H")?;
        writeln!(f)?;
        writeln!(f, "Current Side: {}", self.state.active)?;
        writeln!(f, "Castling: {}", self.state.castling)?;
        writeln!(
            f,
            "En Passant Square: {}",
            match self.state.en_passant {
                Some(square) => square.to_string(),
                None => "None".to_string(),
            }
        )?;
        writeln!(f, "Half Move Clock: {}", self.state.halfmove)?;
        writeln!(f, "Full Move: {}", self.state.fullmove)?;
        writeln!(f, "Fen: {}", self.fen())
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
    fn test_standard_position_indexes() {
        let pos = Position::standard();
        assert_eq!(pos.debug_check_indexes(), Ok(()));
        assert_eq!(pos.all_occupied_bb().count_bits(), 32);
        assert_eq!(pos.king_square(Colour::White), Some(Square::E1));
        assert_eq!(pos.king_square(Colour::Black), Some(Square::E8));
        assert_eq!(pos.pieces_of(Colour::White, PieceType::Knight), &[Square::B1, Square::G1]);
        assert_eq!(pos.pawns_on_file(Colour::Black, File::FileD), &[Square::D7]);
        assert_eq!(pos.squares_of(Colour::White, PieceType::Pawn), Rank::Rank2.bb());
        assert_eq!(pos.state(), &GameState::default());
    }

    #[test]
    fn test_identity_is_starting_square() {
        let pos = Position::standard();
        for sq in pos.all_occupied_bb() {
            assert_eq!(pos.on(sq).map(|m| m.identity), Some(sq));
        }
    }

    #[test]
    fn test_index_keys_are_distinct() {
        let mut keys = std::collections::HashSet::new();
        for piece in Piece::iter() {
            match piece.pt() {
                PieceType::Pawn => {
                    for file in File::iter() {
                        keys.insert(index_key(piece, Square::from_parts(file, Rank::Rank4)));
                    }
                }
                _ => {
                    keys.insert(index_key(piece, Square::E4));
                }
            }
        }
        assert_eq!(keys.len(), NUM_INDEXES);
        assert!(keys.iter().all(|&k| k < NUM_INDEXES));
    }

    #[test]
    fn test_add_remove_keep_lists_sorted() {
        let mut pos = Position::empty();
        let rook = Man::new(Piece::BlackRook, Square::H8);
        pos.add_man(Square::H8, rook);
        pos.add_man(Square::A8, Man::new(Piece::BlackRook, Square::A8));
        pos.add_man(Square::D4, Man::new(Piece::BlackRook, Square::D4));
        assert_eq!(pos.pieces_of(Colour::Black, PieceType::Rook), &[Square::D4, Square::A8, Square::H8]);

        assert_eq!(pos.remove_man(Square::H8), Some(rook));
        assert_eq!(pos.remove_man(Square::H8), None);
        assert_eq!(pos.pieces_of(Colour::Black, PieceType::Rook), &[Square::D4, Square::A8]);
        assert_eq!(pos.debug_check_indexes(), Ok(()));
    }

    #[test]
    fn test_from_parts_round_trip() {
        let pos = Position::standard();
        let rebuilt = Position::from_parts(pos.board(), *pos.state());
        assert_eq!(rebuilt, pos);
    }

    #[test]
    fn test_display_mentions_fen() {
        let text = Position::standard().to_string();
        assert!(text.contains("Fen: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert!(text.contains("Current Side: White"));
    }
}
