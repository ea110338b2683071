use thiserror::Error;

use super::{GameState, Position};
use crate::core::*;

/******************************************\
|==========================================|
|            Useful fen strings            |
|==========================================|
\******************************************/

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Tag carrying the set-up position of a game
pub const FEN_TAG: &str = "FEN";

/******************************************\
|==========================================|
|               Parse Fen                  |
|==========================================|
\******************************************/

impl Position {
    pub const FEN_SECTIONS: usize = 6;

    /// Parses and validates a FEN string
    ///
    /// ## Examples
    ///
    /// ```
    /// use pgn::board::{Position, SetupError};
    ///
    /// assert!(Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").is_ok());
    /// assert!(matches!(
    ///     Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1"),
    ///     Err(SetupError::CastlingRights(_))
    /// ));
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self, SetupError> {
        let pos = Position::parse_fen(fen)?;
        pos.validate()?;
        Ok(pos)
    }

    /// The starting position of a game with these tags.
    ///
    /// A `FEN` tag gives the set-up position, which must validate; without one
    /// the game starts from the standard position.
    pub fn setup<K, V>(tags: &[(K, V)]) -> Result<Self, SetupError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match tags.iter().find(|(name, _)| name.as_ref() == FEN_TAG) {
            Some((_, fen)) => Position::from_fen(fen.as_ref()),
            None => Ok(Position::standard()),
        }
    }

    /// Parses the six FEN fields without checking the position makes sense
    pub fn parse_fen(fen: &str) -> Result<Self, FenParseError> {
        let mut pos = Position::empty();
        let mut parts = fen.split_whitespace();

        let piece_placement = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        pos.parse_piece_placement(piece_placement)?;

        let side_to_move = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        pos.state.active = Self::parse_side_to_move(side_to_move)?;

        let castling = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        pos.state.castling = Self::parse_castling(castling)?;

        let enpassant = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        pos.state.en_passant = Self::parse_enpassant(enpassant)?;

        let halfmove = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        pos.state.halfmove = halfmove
            .parse::<u16>()
            .map_err(|_| FenParseError::InvalidHalfmoveClock(halfmove.to_string()))?;

        let fullmove = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        pos.state.fullmove = match fullmove.parse::<u16>() {
            Ok(n) if n > 0 => n,
            _ => return Err(FenParseError::InvalidFullmoveNumber(fullmove.to_string())),
        };

        if parts.next().is_some() {
            return Err(FenParseError::InvalidNumberOfFields);
        }

        Ok(pos)
    }

    /// Regenerates the FEN string of the position
    pub fn fen(&self) -> String {
        let mut fen = String::new();

        for rank in Rank::iter().rev() {
            let mut empty_count = 0;
            for file in File::iter() {
                match self.piece_on(Square::from_parts(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push_str(&piece.to_string());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank != Rank::Rank1 {
                fen.push('/');
            }
        }

        let GameState { active, castling, en_passant, halfmove, fullmove } = self.state;
        let en_passant = en_passant.map_or("-".to_string(), |sq| sq.to_string());

        format!("{fen} {} {castling} {en_passant} {halfmove} {fullmove}", active.fen_char())
    }

    fn parse_piece_placement(&mut self, piece_placement: &str) -> Result<(), FenParseError> {
        let ranks: Vec<&str> = piece_placement.split('/').collect();
        if ranks.len() != Rank::NUM {
            return Err(FenParseError::InvalidRankFormat(format!(
                "expected 8 ranks, found {}",
                ranks.len()
            )));
        }

        let mut placed = Vec::with_capacity(32);

        for (text, rank) in ranks.iter().zip(Rank::iter().rev()) {
            let mut file: u8 = 0;
            for c in text.chars() {
                match c {
                    '1'..='8' => file += c as u8 - b'0',
                    _ => {
                        let piece = Piece::from_fen_char(c)
                            .ok_or(FenParseError::InvalidPiecePlacementChar(c))?;
                        let sq = File::from_index(file)
                            .map(|f| Square::from_parts(f, rank))
                            .ok_or_else(|| {
                                FenParseError::InvalidRankFormat(format!("rank {rank} is longer than 8 squares"))
                            })?;
                        placed.push((sq, piece));
                        file += 1;
                    }
                }
                if file > 8 {
                    return Err(FenParseError::InvalidRankFormat(format!(
                        "rank {rank} is longer than 8 squares"
                    )));
                }
            }
            if file != 8 {
                return Err(FenParseError::InvalidRankFormat(format!(
                    "rank {rank} covers {file} squares, expected 8"
                )));
            }
        }

        // Index lists have a fixed capacity; absurd material is rejected here
        // and reported with the counts by `validate`.
        let mut counts = [0usize; super::NUM_INDEXES];
        for &(sq, piece) in &placed {
            let key = super::index_key(piece, sq);
            counts[key] += 1;
            if counts[key] > super::MAX_PER_INDEX {
                return Err(FenParseError::TooManyMen(piece));
            }
        }

        for (sq, piece) in placed {
            self.add_man(sq, Man::new(piece, sq));
        }

        Ok(())
    }

    fn parse_side_to_move(side_to_move: &str) -> Result<Colour, FenParseError> {
        match side_to_move {
            "w" => Ok(Colour::White),
            "b" => Ok(Colour::Black),
            _ => Err(FenParseError::InvalidSideToMove(side_to_move.to_string())),
        }
    }

    fn parse_castling(castling: &str) -> Result<Castling, FenParseError> {
        if castling == "-" {
            return Ok(Castling::NONE);
        }

        let mut rights = Castling::NONE;
        for c in castling.chars() {
            rights.set(match c {
                'K' => Castling::WK,
                'Q' => Castling::WQ,
                'k' => Castling::BK,
                'q' => Castling::BQ,
                _ => return Err(FenParseError::InvalidCastlingChar(c)),
            });
        }
        Ok(rights)
    }

    fn parse_enpassant(enpassant: &str) -> Result<Option<Square>, FenParseError> {
        match enpassant {
            "-" => Ok(None),
            _ => {
                let square = enpassant
                    .parse::<Square>()
                    .map_err(|_| FenParseError::InvalidEnPassantSquare(enpassant.to_string()))?;

                if ![Rank::Rank3, Rank::Rank6].contains(&square.rank()) {
                    return Err(FenParseError::InvalidEnPassantSquare(enpassant.to_string()));
                }
                Ok(Some(square))
            }
        }
    }
}

/******************************************\
|==========================================|
|             Validate Setup               |
|==========================================|
\******************************************/

impl Position {
    /// Checks a set-up position could arise in a game.
    ///
    /// - exactly one king per side
    /// - at most eight pawns per side, none on the first or last rank
    /// - pieces beyond the starting set are paid for by missing pawns
    /// - castling rights only where king and rook stand at home
    /// - an en passant target only behind a pawn that just advanced two squares
    /// - the side not to move is not in check
    pub fn validate(&self) -> Result<(), SetupError> {
        for colour in Colour::iter() {
            let kings = self.pieces_of(colour, PieceType::King).len();
            if kings != 1 {
                return Err(SetupError::KingCount { colour, count: kings });
            }

            let pawns = self.squares_of(colour, PieceType::Pawn).count_bits() as usize;
            if pawns > 8 {
                return Err(SetupError::TooManyPawns { colour, count: pawns });
            }

            let promoted: usize = [
                (PieceType::Queen, 1),
                (PieceType::Rook, 2),
                (PieceType::Bishop, 2),
                (PieceType::Knight, 2),
            ]
            .into_iter()
            .map(|(pt, start)| self.pieces_of(colour, pt).len().saturating_sub(start))
            .sum();
            if pawns + promoted > 8 {
                return Err(SetupError::TooManyPieces { colour });
            }
        }

        let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
        let pawns = self.squares_of(Colour::White, PieceType::Pawn) | self.squares_of(Colour::Black, PieceType::Pawn);
        if let Some(sq) = (pawns & back_ranks).lsb() {
            return Err(SetupError::PawnOnBackRank(sq));
        }

        self.validate_castling()?;
        self.validate_en_passant()?;

        let them = !self.state.active;
        if self.is_king_in_check(them) {
            return Err(SetupError::OpponentInCheck(them));
        }

        Ok(())
    }

    fn validate_castling(&self) -> Result<(), SetupError> {
        for colour in Colour::iter() {
            let home = Rank::Rank1.relative(colour);
            let king = Piece::from_parts(colour, PieceType::King);
            let rook = Piece::from_parts(colour, PieceType::Rook);

            for side in [CastleSide::King, CastleSide::Queen] {
                let right = Castling::right(colour, side);
                if !self.state.castling.has(right) {
                    continue;
                }
                let king_home = self.piece_on(Square::from_parts(File::FileE, home)) == Some(king);
                let rook_home = self.piece_on(Square::from_parts(side.rook_from_file(), home)) == Some(rook);
                if !king_home || !rook_home {
                    return Err(SetupError::CastlingRights(right));
                }
            }
        }
        Ok(())
    }

    fn validate_en_passant(&self) -> Result<(), SetupError> {
        let Some(target) = self.state.en_passant else {
            return Ok(());
        };

        let us = self.state.active;
        let them = !us;
        let file = target.file();

        let consistent = target.rank() == Rank::Rank6.relative(us)
            && self.on(target).is_none()
            && self.on(Square::from_parts(file, Rank::Rank7.relative(us))).is_none()
            && self.piece_on(Square::from_parts(file, Rank::Rank5.relative(us)))
                == Some(Piece::from_parts(them, PieceType::Pawn));

        match consistent {
            true => Ok(()),
            false => Err(SetupError::EnPassant(target)),
        }
    }
}

/******************************************\
|==========================================|
|             Fen Parse Errors             |
|==========================================|
\******************************************/

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum FenParseError {
    #[error("FEN string must have 6 fields separated by spaces")]
    InvalidNumberOfFields,

    #[error("Invalid character in FEN piece placement: '{0}'")]
    InvalidPiecePlacementChar(char),

    #[error("Invalid rank format in FEN piece placement: {0}")]
    InvalidRankFormat(String),

    #[error("Too many men of kind '{0}' in FEN piece placement")]
    TooManyMen(Piece),

    #[error("Invalid side to move in FEN: '{0}', expected 'w' or 'b'")]
    InvalidSideToMove(String),

    #[error("Invalid character in FEN castling availability: '{0}'")]
    InvalidCastlingChar(char),

    #[error("Invalid en passant target square in FEN: '{0}'")]
    InvalidEnPassantSquare(String),

    #[error("Invalid halfmove clock value in FEN: '{0}'")]
    InvalidHalfmoveClock(String),

    #[error("Invalid fullmove number value in FEN: '{0}'")]
    InvalidFullmoveNumber(String),
}

/******************************************\
|==========================================|
|               Setup Errors               |
|==========================================|
\******************************************/

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum SetupError {
    #[error(transparent)]
    Fen(#[from] FenParseError),

    #[error("{colour} has {count} kings, expected exactly one")]
    KingCount { colour: Colour, count: usize },

    #[error("{colour} has {count} pawns, at most 8 allowed")]
    TooManyPawns { colour: Colour, count: usize },

    #[error("{colour} has more promoted pieces than missing pawns")]
    TooManyPieces { colour: Colour },

    #[error("Pawn on back rank at {0}")]
    PawnOnBackRank(Square),

    #[error("Castling right '{0}' without king and rook on their home squares")]
    CastlingRights(Castling),

    #[error("En passant target {0} does not follow a two-square pawn advance")]
    EnPassant(Square),

    #[error("{0} is in check but it is not their move")]
    OpponentInCheck(Colour),
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
